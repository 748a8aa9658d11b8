use convoke_argparse::{BoundParameter, BoundValue, Invocation, ResolutionStatus};
use serde::Serialize;
use std::fmt::Write as _;

/// Serializable view of an invocation descriptor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct InvocationReport {
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub status: ResolutionStatus,
    pub parameters: Vec<ParameterReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shared: Vec<ParameterReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rest: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ParameterReport {
    pub name: String,
    #[serde(flatten)]
    pub value: BoundValue,
}

impl From<&BoundParameter<'_>> for ParameterReport {
    fn from(bound: &BoundParameter<'_>) -> Self {
        Self {
            name: bound.name().to_string(),
            value: bound.value().clone(),
        }
    }
}

impl From<&Invocation<'_>> for InvocationReport {
    fn from(inv: &Invocation<'_>) -> Self {
        Self {
            command: inv.command_path().into_iter().map(str::to_string).collect(),
            action: inv.action().map(|a| a.name().to_string()),
            status: inv.status(),
            parameters: inv.parameters().iter().map(ParameterReport::from).collect(),
            shared: inv.shared().iter().map(ParameterReport::from).collect(),
            rest: inv.rest().to_vec(),
        }
    }
}

impl InvocationReport {
    /// Plain-text rendering for terminals.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let command = if self.command.is_empty() {
            "<root>".to_string()
        } else {
            self.command.join(" ")
        };
        let _ = writeln!(out, "command: {command}");
        let _ = writeln!(
            out,
            "action:  {} ({})",
            self.action.as_deref().unwrap_or("-"),
            self.status
        );
        for p in self.parameters.iter().chain(self.shared.iter()) {
            let _ = writeln!(out, "  {} = {}", p.name, describe(&p.value));
        }
        if !self.rest.is_empty() {
            let _ = writeln!(out, "rest:    {}", self.rest.join(" "));
        }
        out
    }
}

fn describe(value: &BoundValue) -> String {
    match value {
        BoundValue::Explicit(v) => v.to_string(),
        BoundValue::Default(v) => format!("{v} (default)"),
        BoundValue::NotSupplied => "<not supplied>".to_string(),
    }
}
