//! The invocation descriptor produced by one resolution pass.

use crate::bind::bind;
use crate::catalog::{Action, Catalog, Command, Parameter};
use crate::error::ResolveError;
use crate::resolve::resolve_action;
use crate::value::Value;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionStatus {
    /// The first token named an action.
    Resolved,
    /// The command's default action was used.
    ResolvedAsDefault,
    /// No tokens and no default action.
    UnresolvedNoAction,
    /// The leading token matched nothing and there is no default action.
    UnresolvedUnknownToken,
}

impl ResolutionStatus {
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Resolved | Self::ResolvedAsDefault)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolved => "resolved",
            Self::ResolvedAsDefault => "resolved-as-default",
            Self::UnresolvedNoAction => "unresolved-no-action",
            Self::UnresolvedUnknownToken => "unresolved-unknown-token",
        }
    }
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value bound to one parameter.
///
/// `NotSupplied` is distinct from every real value, `Bool(false)` included.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "kebab-case")]
pub enum BoundValue {
    Explicit(Value),
    Default(Value),
    NotSupplied,
}

impl BoundValue {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Explicit(v) | Self::Default(v) => Some(v),
            Self::NotSupplied => None,
        }
    }

    pub fn is_supplied(&self) -> bool {
        !matches!(self, Self::NotSupplied)
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value().and_then(Value::as_str)
    }

    /// Switch reading; anything not bound to `true` is `false`.
    pub fn flag(&self) -> bool {
        self.value().and_then(Value::as_bool).unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter<'c> {
    parameter: &'c Parameter,
    value: BoundValue,
}

impl<'c> BoundParameter<'c> {
    pub fn parameter(&self) -> &'c Parameter {
        self.parameter
    }

    pub fn name(&self) -> &'c str {
        self.parameter.name()
    }

    pub fn value(&self) -> &BoundValue {
        &self.value
    }
}

/// Immutable result of resolving one token list against a catalog.
///
/// When the status is unresolved there is no action, no bound parameters,
/// and `rest` holds the tokens that could not be placed.
#[derive(Debug, Clone)]
pub struct Invocation<'c> {
    catalog: &'c Catalog,
    command: &'c Command,
    action: Option<&'c Action>,
    status: ResolutionStatus,
    parameters: Vec<BoundParameter<'c>>,
    shared: Vec<BoundParameter<'c>>,
    rest: Vec<String>,
}

impl<'c> Invocation<'c> {
    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    pub fn command(&self) -> &'c Command {
        self.command
    }

    /// Sub-command names leading to the resolved command.
    pub fn command_path(&self) -> Vec<&'c str> {
        self.catalog.path_of(self.command.id())
    }

    pub fn action(&self) -> Option<&'c Action> {
        self.action
    }

    pub fn status(&self) -> ResolutionStatus {
        self.status
    }

    pub fn is_resolved(&self) -> bool {
        self.status.is_resolved()
    }

    /// Bindings for the action's declared parameters, in declared order.
    pub fn parameters(&self) -> &[BoundParameter<'c>] {
        self.parameters.as_slice()
    }

    /// Bindings for the command's shared parameters.
    pub fn shared(&self) -> &[BoundParameter<'c>] {
        self.shared.as_slice()
    }

    pub fn rest(&self) -> &[String] {
        self.rest.as_slice()
    }

    /// Bound value by declared parameter name (action parameters, then shared).
    pub fn get(&self, name: &str) -> Option<&BoundValue> {
        self.parameters
            .iter()
            .chain(self.shared.iter())
            .find(|b| b.parameter.name() == name)
            .map(|b| &b.value)
    }

    /// Required parameters that ended up `NotSupplied`.
    pub fn missing_required(&self) -> Vec<&'c Parameter> {
        self.parameters
            .iter()
            .chain(self.shared.iter())
            .filter(|b| b.parameter.is_required() && !b.value.is_supplied())
            .map(|b| b.parameter)
            .collect()
    }
}

impl PartialEq for Invocation<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.catalog, other.catalog)
            && self.command.id() == other.command.id()
            && self.action.map(Action::name) == other.action.map(Action::name)
            && self.status == other.status
            && self.parameters == other.parameters
            && self.shared == other.shared
            && self.rest == other.rest
    }
}

impl Catalog {
    /// Resolve `tokens` to a command, an action and bound parameter values.
    ///
    /// "No match" outcomes come back as an unresolved descriptor; only a
    /// value that fails coercion is an error.
    pub fn resolve(&self, tokens: &[String]) -> Result<Invocation<'_>, ResolveError> {
        let resolution = resolve_action(self, tokens);
        let command = resolution.command;

        let Some(action) = resolution.action else {
            return Ok(Invocation {
                catalog: self,
                command,
                action: None,
                status: resolution.status,
                parameters: Vec::new(),
                shared: Vec::new(),
                rest: resolution.remaining.to_vec(),
            });
        };

        let effective: Vec<&Parameter> = action
            .parameters()
            .iter()
            .chain(command.shared_parameters())
            .collect();
        let binding = bind(
            resolution.remaining,
            &effective,
            command.conventions(),
            self.value_parsers(),
        )?;

        let mut values = binding.values.into_iter();
        let parameters = action
            .parameters()
            .iter()
            .zip(values.by_ref())
            .map(|(parameter, value)| BoundParameter { parameter, value })
            .collect();
        let shared = command
            .shared_parameters()
            .iter()
            .zip(values)
            .map(|(parameter, value)| BoundParameter { parameter, value })
            .collect();

        Ok(Invocation {
            catalog: self,
            command,
            action: Some(action),
            status: resolution.status,
            parameters,
            shared,
            rest: binding.rest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoke_metadata::{action, command, param};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> Catalog {
        Catalog::from_decl(
            &command("")
                .shared(param("verbose").switch())
                .action(
                    action("Greet")
                        .default_action()
                        .param(param("name").required(true))
                        .param(param("loud").switch()),
                ),
        )
        .unwrap()
    }

    #[test]
    fn not_supplied_differs_from_false() {
        let catalog = catalog();
        let inv = catalog.resolve(&tokens(&["/no-loud"])).unwrap();
        assert_eq!(inv.get("loud"), Some(&BoundValue::Explicit(Value::Bool(false))));
        assert_ne!(inv.get("loud"), Some(&BoundValue::NotSupplied));
        assert_eq!(inv.get("verbose"), Some(&BoundValue::NotSupplied));
        assert!(!inv.get("verbose").unwrap().flag());
        assert!(inv.get("nope").is_none());
    }

    #[test]
    fn splits_action_and_shared_bindings() {
        let catalog = catalog();
        let inv = catalog.resolve(&tokens(&["bob", "/verbose"])).unwrap();
        assert_eq!(inv.status(), ResolutionStatus::ResolvedAsDefault);
        let names: Vec<&str> = inv.parameters().iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["name", "loud"]);
        assert_eq!(inv.shared().len(), 1);
        assert!(inv.shared()[0].value().flag());
        assert_eq!(inv.get("name").and_then(BoundValue::as_str), Some("bob"));
        assert!(inv.missing_required().is_empty());
    }

    #[test]
    fn reports_missing_required() {
        let catalog = catalog();
        let inv = catalog.resolve(&[]).unwrap();
        let missing: Vec<&str> = inv.missing_required().iter().map(|p| p.name()).collect();
        assert_eq!(missing, vec!["name"]);
    }

    #[test]
    fn resolution_is_idempotent() {
        let catalog = catalog();
        let toks = tokens(&["bob", "/loud", "extra"]);
        let a = catalog.resolve(&toks).unwrap();
        let b = catalog.resolve(&toks).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.rest(), &["extra".to_string()]);
    }

    #[test]
    fn nan_is_a_coercion_error_not_an_unequal_binding() {
        let catalog = Catalog::from_decl(
            &command("").action(action("Go").param(param("ratio").value_type("float"))),
        )
        .unwrap();
        let err = catalog.resolve(&tokens(&["Go", "NaN"])).unwrap_err();
        let ResolveError::Coercion { parameter, literal, .. } = err;
        assert_eq!(parameter, "ratio");
        assert_eq!(literal, "NaN");

        let toks = tokens(&["Go", "0.25"]);
        assert_eq!(catalog.resolve(&toks).unwrap(), catalog.resolve(&toks).unwrap());
    }

    #[test]
    fn bound_value_serializes_with_source_tag() {
        let json = serde_json::to_value(BoundValue::Explicit(Value::Integer(3))).unwrap();
        assert_eq!(json, serde_json::json!({ "source": "explicit", "value": 3 }));
        let json = serde_json::to_value(BoundValue::NotSupplied).unwrap();
        assert_eq!(json, serde_json::json!({ "source": "not-supplied" }));
        let json = serde_json::to_value(ResolutionStatus::ResolvedAsDefault).unwrap();
        assert_eq!(json, serde_json::json!("resolved-as-default"));
    }
}
