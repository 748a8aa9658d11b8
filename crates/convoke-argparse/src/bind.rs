//! Parameter binding: match classified tokens to an action's parameters.
//!
//! Named tokens are matched first (long name, then alias). Whatever is left,
//! including named-looking tokens that matched nothing, is handed out in
//! order to the positional-eligible parameters.

use crate::catalog::Parameter;
use crate::convention::NamingConvention;
use crate::error::ResolveError;
use crate::invocation::BoundValue;
use crate::token::{Token, classify_with};
use crate::value::{Value, ValueParsers};
use std::sync::Arc;
use tracing::{trace, warn};

#[derive(Debug)]
pub(crate) struct Binding {
    /// One entry per input parameter, same order.
    pub values: Vec<BoundValue>,
    /// Positional tokens no parameter accepted.
    pub rest: Vec<String>,
}

pub(crate) fn bind(
    tokens: &[String],
    parameters: &[&Parameter],
    conventions: &[Arc<dyn NamingConvention>],
    parsers: &ValueParsers,
) -> Result<Binding, ResolveError> {
    let mut slots: Vec<Option<BoundValue>> = vec![None; parameters.len()];
    let mut positional: Vec<&str> = Vec::new();

    for raw in tokens {
        match classify_with(raw, conventions) {
            Token::Positional(value) => positional.push(value),
            Token::NamedValue { name, value, raw } => {
                match lookup(name, parameters, conventions) {
                    Some(idx) => {
                        let parameter = parameters[idx];
                        trace!(token = raw, parameter = parameter.name(), "bound by name");
                        slots[idx] = Some(BoundValue::Explicit(coerce(parameter, value, parsers)?));
                    }
                    None => positional.push(raw),
                }
            }
            Token::Switch {
                name,
                negated,
                body,
                raw,
            } => {
                let hit = negated
                    .then(|| lookup_switch(name, parameters, conventions).map(|idx| (idx, false)))
                    .flatten()
                    .or_else(|| lookup_switch(body, parameters, conventions).map(|idx| (idx, true)));
                match hit {
                    Some((idx, on)) => {
                        trace!(token = raw, parameter = parameters[idx].name(), on, "bound switch");
                        slots[idx] = Some(BoundValue::Explicit(Value::Bool(on)));
                    }
                    None => positional.push(raw),
                }
            }
        }
    }

    let mut stream = positional.into_iter();
    for (idx, parameter) in parameters.iter().enumerate() {
        if slots[idx].is_some() || !parameter.is_positional() {
            continue;
        }
        let Some(raw) = stream.next() else {
            break;
        };
        trace!(token = raw, parameter = parameter.name(), "bound by position");
        slots[idx] = Some(BoundValue::Explicit(coerce(parameter, raw, parsers)?));
    }

    let rest: Vec<String> = stream.map(str::to_string).collect();
    if !rest.is_empty() {
        warn!(tokens = ?rest, "ignoring extra positional arguments");
    }

    let values = slots
        .into_iter()
        .zip(parameters)
        .map(|(slot, parameter)| {
            slot.unwrap_or_else(|| match parameter.default_value() {
                Some(default) => BoundValue::Default(default.clone()),
                None => BoundValue::NotSupplied,
            })
        })
        .collect();

    Ok(Binding { values, rest })
}

/// Exact long name across every convention first, then aliases.
fn lookup(
    name: &str,
    parameters: &[&Parameter],
    conventions: &[Arc<dyn NamingConvention>],
) -> Option<usize> {
    parameters
        .iter()
        .position(|p| {
            conventions
                .iter()
                .any(|c| c.derive_parameter_long_name(p.name()) == name)
        })
        .or_else(|| {
            parameters.iter().position(|p| {
                conventions
                    .iter()
                    .any(|c| c.parameter_name_matches(name, p))
            })
        })
}

fn lookup_switch(
    name: &str,
    parameters: &[&Parameter],
    conventions: &[Arc<dyn NamingConvention>],
) -> Option<usize> {
    lookup(name, parameters, conventions).filter(|&idx| parameters[idx].is_switch())
}

fn coerce(parameter: &Parameter, raw: &str, parsers: &ValueParsers) -> Result<Value, ResolveError> {
    parsers
        .parse(raw, parameter.value_type())
        .map_err(|reason| ResolveError::Coercion {
            parameter: parameter.name().to_string(),
            literal: raw.to_string(),
            reason,
        })
}
