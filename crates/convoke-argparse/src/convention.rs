//! Naming conventions: token syntax and name derivation.
//!
//! A convention decides three things:
//! - which marker turns a token into a named form (`/name`, `--name`)
//! - how a value is attached (`/name:value`, `--name=value`) and how a switch
//!   is negated (`/no-name`)
//! - how declared action/parameter names are spelled on the command line
//!
//! Several conventions may be attached to one command. They are consulted in
//! attachment order and the first one that matches wins.

use crate::catalog::{Action, Parameter};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

pub const SLASH_COLON: &str = "slash-colon";
pub const HYPHEN_CASE: &str = "hyphen-case";

pub trait NamingConvention: Send + Sync + fmt::Debug {
    /// Registry key (`slash-colon`, `hyphen-case`, ...).
    fn name(&self) -> &str;

    /// Prefix that marks a named token.
    fn named_marker(&self) -> &str;

    /// Separator between a parameter name and its inline value.
    fn value_separator(&self) -> char;

    fn negation_prefix(&self) -> &str {
        "no-"
    }

    fn derive_action_name(&self, declared: &str) -> String;

    fn derive_parameter_long_name(&self, declared: &str) -> String;

    /// Full command-line spelling of a parameter, marker included.
    fn long_option_name(&self, parameter: &Parameter) -> String {
        format!(
            "{}{}",
            self.named_marker(),
            self.derive_parameter_long_name(parameter.name())
        )
    }

    /// Full command-line spelling of a negated switch, marker included.
    fn negated_long_option_name(&self, parameter: &Parameter) -> String {
        format!(
            "{}{}{}",
            self.named_marker(),
            self.negation_prefix(),
            self.derive_parameter_long_name(parameter.name())
        )
    }

    fn action_name_matches(&self, token: &str, action: &Action) -> bool {
        self.derive_action_name(action.name()) == token
            || action.aliases().iter().any(|a| a == token)
    }

    fn parameter_name_matches(&self, token: &str, parameter: &Parameter) -> bool {
        self.derive_parameter_long_name(parameter.name()) == token
            || parameter.aliases().iter().any(|a| a == token)
    }
}

/// `/name:value`, `/name`, `/no-name`; names used exactly as declared.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlashColonConvention;

impl NamingConvention for SlashColonConvention {
    fn name(&self) -> &str {
        SLASH_COLON
    }

    fn named_marker(&self) -> &str {
        "/"
    }

    fn value_separator(&self) -> char {
        ':'
    }

    fn derive_action_name(&self, declared: &str) -> String {
        declared.to_string()
    }

    fn derive_parameter_long_name(&self, declared: &str) -> String {
        declared.to_string()
    }
}

/// `--name=value`, `--name`, `--no-name`; names converted to kebab-case.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyphenCaseConvention;

impl NamingConvention for HyphenCaseConvention {
    fn name(&self) -> &str {
        HYPHEN_CASE
    }

    fn named_marker(&self) -> &str {
        "--"
    }

    fn value_separator(&self) -> char {
        '='
    }

    fn derive_action_name(&self, declared: &str) -> String {
        to_kebab_case(declared)
    }

    fn derive_parameter_long_name(&self, declared: &str) -> String {
        to_kebab_case(declared)
    }
}

/// Convert `DoSomething`, `doSomething`, `do_something` or `HTTPServer` into
/// `do-something` / `http-server`.
pub fn to_kebab_case(raw: &str) -> String {
    let chars: Vec<char> = raw.trim().chars().collect();
    let mut out = String::with_capacity(chars.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }

        if c.is_uppercase() {
            let prev = if i > 0 { chars.get(i - 1).copied() } else { None };
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Conventions available to catalog construction, looked up by name.
#[derive(Clone)]
pub struct ConventionRegistry {
    by_name: IndexMap<String, Arc<dyn NamingConvention>>,
}

impl ConventionRegistry {
    /// Registry holding the built-in conventions.
    pub fn builtin() -> Self {
        Self {
            by_name: IndexMap::new(),
        }
        .register(SlashColonConvention)
        .register(HyphenCaseConvention)
    }

    /// Register (or replace) a convention under its own name.
    pub fn register(mut self, convention: impl NamingConvention + 'static) -> Self {
        self.by_name
            .insert(convention.name().to_string(), Arc::new(convention));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn NamingConvention>> {
        self.by_name.get(name.trim()).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(|k| k.as_str())
    }
}

impl Default for ConventionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for ConventionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_case_handles_common_shapes() {
        assert_eq!(to_kebab_case("DoSomething"), "do-something");
        assert_eq!(to_kebab_case("argumentOne"), "argument-one");
        assert_eq!(to_kebab_case("argument1"), "argument1");
        assert_eq!(to_kebab_case("dry_run"), "dry-run");
        assert_eq!(to_kebab_case("HTTPServer"), "http-server");
        assert_eq!(to_kebab_case("WithRequiredStringArgs"), "with-required-string-args");
        assert_eq!(to_kebab_case("already-kebab"), "already-kebab");
    }

    #[test]
    fn slash_colon_keeps_declared_names() {
        let c = SlashColonConvention;
        assert_eq!(c.derive_action_name("DoSomething"), "DoSomething");
        assert_eq!(c.derive_parameter_long_name("argument1"), "argument1");
        assert_eq!(c.named_marker(), "/");
        assert_eq!(c.value_separator(), ':');
    }

    #[test]
    fn registry_resolves_builtins_and_custom() {
        #[derive(Debug)]
        struct Plus;
        impl NamingConvention for Plus {
            fn name(&self) -> &str {
                "plus"
            }
            fn named_marker(&self) -> &str {
                "+"
            }
            fn value_separator(&self) -> char {
                '='
            }
            fn derive_action_name(&self, declared: &str) -> String {
                declared.to_ascii_lowercase()
            }
            fn derive_parameter_long_name(&self, declared: &str) -> String {
                declared.to_ascii_lowercase()
            }
        }

        let registry = ConventionRegistry::builtin().register(Plus);
        assert!(registry.get(SLASH_COLON).is_some());
        assert!(registry.get(HYPHEN_CASE).is_some());
        assert_eq!(registry.get("plus").map(|c| c.named_marker().to_string()), Some("+".to_string()));
        assert!(registry.get("dos").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec![SLASH_COLON, HYPHEN_CASE, "plus"]);
    }
}
