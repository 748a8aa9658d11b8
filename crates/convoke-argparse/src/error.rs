//! Error types for catalog construction, binding and execution.

use crate::invocation::ResolutionStatus;
use thiserror::Error;

/// The declarations could not be turned into a consistent catalog.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{kind} name must not be empty (in command '{command}')")]
    EmptyName { kind: &'static str, command: String },

    #[error("command '{command}' declares sub-command '{name}' more than once")]
    DuplicateCommand { command: String, name: String },

    #[error("name conflict on command '{command}': '{name}' refers to both action '{first}' and '{second}'")]
    DuplicateAction {
        command: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("command '{command}' declares more than one default action ('{first}' and '{second}')")]
    MultipleDefaults {
        command: String,
        first: String,
        second: String,
    },

    #[error("name conflict in '{scope}': '{name}' refers to both parameter '{first}' and '{second}'")]
    DuplicateParameter {
        scope: String,
        name: String,
        first: String,
        second: String,
    },

    #[error("unknown naming convention '{name}' on command '{command}'")]
    UnknownConvention { command: String, name: String },

    #[error("invalid default value '{literal}' for parameter '{parameter}': {reason}")]
    InvalidDefault {
        parameter: String,
        literal: String,
        reason: String,
    },

    #[error("enum parameter '{parameter}' declares no possible values")]
    EmptyEnum { parameter: String },
}

/// A bound literal could not be converted to its parameter's type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("invalid value '{literal}' for parameter '{parameter}': {reason}")]
    Coercion {
        parameter: String,
        literal: String,
        reason: String,
    },
}

/// Failures of the execution step that follows resolution.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("no action matched ({status}) on command '{command}'{}", format_rest(.rest))]
    Unresolved {
        status: ResolutionStatus,
        command: String,
        rest: Vec<String>,
    },

    #[error("missing required parameter(s) for '{action}': {}", .parameters.join(", "))]
    MissingRequired {
        action: String,
        parameters: Vec<String>,
    },

    #[error("unknown command path: '{0}'")]
    UnknownCommand(String),

    #[error("command '{command}' has no action named '{action}'")]
    UnknownAction { command: String, action: String },

    #[error("no handler registered for '{command}' action '{action}'")]
    NoHandler { command: String, action: String },

    #[error("action '{action}' failed: {error:#}")]
    Handler { action: String, error: anyhow::Error },
}

fn format_rest(rest: &[String]) -> String {
    match rest.first() {
        Some(token) => format!(": unknown token '{token}'"),
        None => String::new(),
    }
}
