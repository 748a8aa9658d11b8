//! Parameter value categories and the type-indexed value parsers.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Value category of a declared parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean switch: bound by bare name, negated name, or `name:bool`.
    Switch,
    String,
    Integer,
    Float,
    /// ISO calendar date (`YYYY-MM-DD`).
    Date,
    /// One of a fixed set of spellings.
    Enum(Vec<String>),
    /// Category handled by a registered parser.
    Custom(String),
}

impl ValueType {
    /// Map a declared category string onto a value type.
    ///
    /// Empty means `string`; unrecognized categories become `Custom`.
    pub fn from_category(category: &str, possible_values: &[String]) -> Self {
        let trimmed = category.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "" | "string" | "str" | "text" => Self::String,
            "switch" | "bool" | "boolean" | "flag" => Self::Switch,
            "integer" | "int" | "i64" => Self::Integer,
            "float" | "number" | "f64" | "double" => Self::Float,
            "date" => Self::Date,
            "enum" => Self::Enum(possible_values.to_vec()),
            _ => Self::Custom(trimmed.to_string()),
        }
    }

    /// Registry key for this category.
    pub fn category(&self) -> &str {
        match self {
            Self::Switch => "switch",
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Date => "date",
            Self::Enum(_) => "enum",
            Self::Custom(name) => name.as_str(),
        }
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, Self::Switch)
    }
}

/// A coerced parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Enum(String),
    Custom { category: String, raw: String },
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the textual payload of string-like values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Enum(s) => Some(s.as_str()),
            Self::Custom { raw, .. } => Some(raw.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::String(s) | Self::Enum(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Custom { raw, .. } => f.write_str(raw),
        }
    }
}

/// Converts raw token text into a value of the requested category.
///
/// The error string is the reason shown to the user; the caller attaches the
/// parameter name and the offending literal.
pub trait ValueParser: Send + Sync {
    fn parse(&self, raw: &str, ty: &ValueType) -> Result<Value, String>;
}

impl<F> ValueParser for F
where
    F: Fn(&str, &ValueType) -> Result<Value, String> + Send + Sync,
{
    fn parse(&self, raw: &str, ty: &ValueType) -> Result<Value, String> {
        self(raw, ty)
    }
}

/// Parse a boolean literal (`true/false`, `yes/no`, `on/off`, `1/0`).
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parser for every built-in category.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinValueParser;

impl ValueParser for BuiltinValueParser {
    fn parse(&self, raw: &str, ty: &ValueType) -> Result<Value, String> {
        match ty {
            ValueType::Switch => parse_bool(raw)
                .map(Value::Bool)
                .ok_or_else(|| "expected a boolean (true/false)".to_string()),
            ValueType::String => Ok(Value::String(raw.to_string())),
            ValueType::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| format!("expected an integer: {e}")),
            ValueType::Float => raw
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("expected a number: {e}"))
                .and_then(|n| {
                    if n.is_finite() {
                        Ok(Value::Float(n))
                    } else {
                        Err("expected a finite number".to_string())
                    }
                }),
            ValueType::Date => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| format!("expected a date (YYYY-MM-DD): {e}")),
            ValueType::Enum(values) => values
                .iter()
                .find(|v| v.eq_ignore_ascii_case(raw.trim()))
                .map(|v| Value::Enum(v.clone()))
                .ok_or_else(|| format!("possible values: {}", values.join(", "))),
            ValueType::Custom(category) => Ok(Value::Custom {
                category: category.clone(),
                raw: raw.to_string(),
            }),
        }
    }
}

/// Value parsers keyed by category.
///
/// Categories without a registration fall back to `BuiltinValueParser`.
#[derive(Clone, Default)]
pub struct ValueParsers {
    by_category: HashMap<String, Arc<dyn ValueParser>>,
}

impl ValueParsers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the parser for `category`.
    pub fn register(mut self, category: impl Into<String>, parser: impl ValueParser + 'static) -> Self {
        self.by_category.insert(category.into(), Arc::new(parser));
        self
    }

    pub fn parse(&self, raw: &str, ty: &ValueType) -> Result<Value, String> {
        match self.by_category.get(ty.category()) {
            Some(parser) => parser.parse(raw, ty),
            None => BuiltinValueParser.parse(raw, ty),
        }
    }
}

impl fmt::Debug for ValueParsers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.by_category.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        f.debug_struct("ValueParsers")
            .field("registered", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_map_to_value_types() {
        assert_eq!(ValueType::from_category("", &[]), ValueType::String);
        assert_eq!(ValueType::from_category("Boolean", &[]), ValueType::Switch);
        assert_eq!(ValueType::from_category("int", &[]), ValueType::Integer);
        assert_eq!(
            ValueType::from_category("enum", &["a".to_string()]),
            ValueType::Enum(vec!["a".to_string()])
        );
        assert_eq!(
            ValueType::from_category("semver", &[]),
            ValueType::Custom("semver".to_string())
        );
        assert_eq!(ValueType::Custom("semver".to_string()).category(), "semver");
    }

    #[test]
    fn builtin_parser_coerces_scalars() {
        let p = ValueParsers::new();
        assert_eq!(p.parse("42", &ValueType::Integer), Ok(Value::Integer(42)));
        assert_eq!(p.parse("2.5", &ValueType::Float), Ok(Value::Float(2.5)));
        assert_eq!(p.parse("Off", &ValueType::Switch), Ok(Value::Bool(false)));
        assert_eq!(
            p.parse("2024-02-29", &ValueType::Date),
            Ok(Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()))
        );
        assert!(p.parse("forty", &ValueType::Integer).is_err());
        assert!(p.parse("2023-02-29", &ValueType::Date).is_err());
    }

    #[test]
    fn float_rejects_non_finite_literals() {
        let p = ValueParsers::new();
        for raw in ["NaN", "inf", "-infinity", "1e400"] {
            let err = p.parse(raw, &ValueType::Float).unwrap_err();
            assert_eq!(err, "expected a finite number", "{raw}");
        }
        assert_eq!(p.parse("-0.5", &ValueType::Float), Ok(Value::Float(-0.5)));
    }

    #[test]
    fn enum_binds_canonical_spelling() {
        let ty = ValueType::Enum(vec!["Fast".to_string(), "Safe".to_string()]);
        let p = ValueParsers::new();
        assert_eq!(p.parse("safe", &ty), Ok(Value::Enum("Safe".to_string())));
        let err = p.parse("slow", &ty).unwrap_err();
        assert!(err.contains("Fast, Safe"));
    }

    #[test]
    fn registered_parser_overrides_category() {
        let p = ValueParsers::new().register("integer", |raw: &str, _: &ValueType| {
            raw.trim_start_matches('#')
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| e.to_string())
        });
        assert_eq!(p.parse("#7", &ValueType::Integer), Ok(Value::Integer(7)));
        // Other categories keep the builtin behavior.
        assert_eq!(p.parse("1.5", &ValueType::Float), Ok(Value::Float(1.5)));
    }

    #[test]
    fn custom_category_passes_raw_text_through() {
        let ty = ValueType::Custom("semver".to_string());
        let v = ValueParsers::new().parse("1.2.3", &ty).unwrap();
        assert_eq!(v.as_str(), Some("1.2.3"));
        assert_eq!(v.to_string(), "1.2.3");
    }
}
