//! Syntactic classification of a single raw token.
//!
//! Classification only looks at the convention markers. Whether `/verbose` is
//! a declared switch or just a path-looking positional is decided later by the
//! binder, which knows the parameter catalog.

use crate::convention::NamingConvention;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `<marker><name><sep><value>`; the value may contain further separators.
    NamedValue {
        name: &'a str,
        value: &'a str,
        raw: &'a str,
    },
    /// `<marker><name>` or `<marker><negation><name>`.
    ///
    /// `body` is the text after the marker, negation prefix included.
    Switch {
        name: &'a str,
        negated: bool,
        body: &'a str,
        raw: &'a str,
    },
    Positional(&'a str),
}

impl<'a> Token<'a> {
    /// The token exactly as it appeared in argv.
    pub fn raw(&self) -> &'a str {
        match self {
            Self::NamedValue { raw, .. } | Self::Switch { raw, .. } => raw,
            Self::Positional(raw) => raw,
        }
    }
}

/// Classify `raw` using a single convention.
pub fn classify<'a>(raw: &'a str, convention: &dyn NamingConvention) -> Token<'a> {
    let Some(body) = raw.strip_prefix(convention.named_marker()) else {
        return Token::Positional(raw);
    };
    if body.is_empty() {
        return Token::Positional(raw);
    }

    if let Some((name, value)) = body.split_once(convention.value_separator()) {
        if name.is_empty() {
            return Token::Positional(raw);
        }
        return Token::NamedValue { name, value, raw };
    }

    if let Some(name) = body.strip_prefix(convention.negation_prefix()) {
        if !name.is_empty() {
            return Token::Switch {
                name,
                negated: true,
                body,
                raw,
            };
        }
    }

    Token::Switch {
        name: body,
        negated: false,
        body,
        raw,
    }
}

/// Classify `raw` against every attached convention, in precedence order.
///
/// The first convention that recognizes a named form wins; a token no
/// convention recognizes is positional.
pub fn classify_with<'a>(raw: &'a str, conventions: &[Arc<dyn NamingConvention>]) -> Token<'a> {
    conventions
        .iter()
        .map(|c| classify(raw, c.as_ref()))
        .find(|t| !matches!(t, Token::Positional(_)))
        .unwrap_or(Token::Positional(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convention::{HyphenCaseConvention, SlashColonConvention};

    #[test]
    fn named_value_splits_on_first_separator() {
        let t = classify("/url:http://example.com:8080", &SlashColonConvention);
        assert_eq!(
            t,
            Token::NamedValue {
                name: "url",
                value: "http://example.com:8080",
                raw: "/url:http://example.com:8080",
            }
        );
    }

    #[test]
    fn empty_value_is_still_named() {
        let t = classify("/name:", &SlashColonConvention);
        assert!(matches!(t, Token::NamedValue { name: "name", value: "", .. }));
    }

    #[test]
    fn switches_and_negation() {
        assert!(matches!(
            classify("/verbose", &SlashColonConvention),
            Token::Switch { name: "verbose", negated: false, .. }
        ));
        assert!(matches!(
            classify("/no-verbose", &SlashColonConvention),
            Token::Switch { name: "verbose", negated: true, body: "no-verbose", .. }
        ));
        // A bare negation prefix is a plain switch name.
        assert!(matches!(
            classify("/no-", &SlashColonConvention),
            Token::Switch { name: "no-", negated: false, .. }
        ));
    }

    #[test]
    fn unmarked_tokens_are_positional() {
        assert_eq!(classify("value", &SlashColonConvention), Token::Positional("value"));
        assert_eq!(classify("a:b", &SlashColonConvention), Token::Positional("a:b"));
        assert_eq!(classify("/", &SlashColonConvention), Token::Positional("/"));
        assert_eq!(classify("/:x", &SlashColonConvention), Token::Positional("/:x"));
        assert_eq!(classify("-5", &HyphenCaseConvention), Token::Positional("-5"));
        assert_eq!(classify("--", &HyphenCaseConvention), Token::Positional("--"));
    }

    #[test]
    fn first_matching_convention_wins() {
        let conventions: Vec<Arc<dyn NamingConvention>> =
            vec![Arc::new(SlashColonConvention), Arc::new(HyphenCaseConvention)];
        assert!(matches!(
            classify_with("--dry-run=yes", &conventions),
            Token::NamedValue { name: "dry-run", value: "yes", .. }
        ));
        assert!(matches!(
            classify_with("/dry-run", &conventions),
            Token::Switch { name: "dry-run", .. }
        ));
        assert_eq!(classify_with("plain", &conventions).raw(), "plain");
    }
}
