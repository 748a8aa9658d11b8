//! Declaration model for convoke command catalogs.
//!
//! The types here describe commands, actions and parameters as plain data and
//! carry no matching logic. They are used for:
//! - loading a catalog manifest (`convoke.json`) from disk
//! - declaring a catalog in code through the `command`/`action`/`param` builders
//!
//! `convoke-argparse` turns a `CommandDecl` tree into its immutable catalog
//! before any argv is resolved against it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no catalog is given.
pub const DEFAULT_CATALOG_NAME: &str = "convoke.json";

/// Current manifest layout version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported catalog format-version {0} (expected 1)")]
    UnsupportedVersion(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ParameterDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Value category (`switch`, `string`, `integer`, `float`, `date`, `enum`
    /// or a custom key). Empty means `string`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub value_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub possible_values: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ActionDecl {
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDecl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CommandDecl {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Names of the conventions attached to this command, in precedence order.
    ///
    /// Empty inherits the parent's conventions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conventions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_parameters: Vec<ParameterDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandDecl>,
}

/// JSON payload stored in a catalog manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CatalogManifest {
    pub format_version: u32,
    pub root: CommandDecl,
}

impl CatalogManifest {
    pub fn new(root: CommandDecl) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            root,
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, MetadataError> {
        let manifest: Self = serde_json::from_str(raw)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(MetadataError::UnsupportedVersion(manifest.format_version));
        }
        Ok(manifest)
    }

    pub fn from_file(path: &Path) -> Result<Self, MetadataError> {
        let raw = fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn to_json_pretty(&self) -> Result<String, MetadataError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Start declaring a command.
///
/// # Example
///
/// ```
/// use convoke_metadata::{action, command, param};
///
/// let root = command("")
///     .action(
///         action("Greet")
///             .default_action()
///             .param(param("name").required(true))
///             .param(param("loud").switch()),
///     )
///     .subcommand(command("Sub").action(action("Run").default_action()));
/// assert_eq!(root.actions[0].parameters.len(), 2);
/// ```
pub fn command(name: impl Into<String>) -> CommandDecl {
    CommandDecl {
        name: name.into(),
        ..Default::default()
    }
}

/// Start declaring an action.
pub fn action(name: impl Into<String>) -> ActionDecl {
    ActionDecl {
        name: name.into(),
        ..Default::default()
    }
}

/// Start declaring a parameter. The value type defaults to `string`.
pub fn param(name: impl Into<String>) -> ParameterDecl {
    ParameterDecl {
        name: name.into(),
        ..Default::default()
    }
}

impl CommandDecl {
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn convention(mut self, name: impl Into<String>) -> Self {
        self.conventions.push(name.into());
        self
    }

    pub fn action(mut self, action: ActionDecl) -> Self {
        self.actions.push(action);
        self
    }

    pub fn shared(mut self, parameter: ParameterDecl) -> Self {
        self.shared_parameters.push(parameter);
        self
    }

    pub fn subcommand(mut self, command: CommandDecl) -> Self {
        self.subcommands.push(command);
        self
    }
}

impl ActionDecl {
    pub fn default_action(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn param(mut self, parameter: ParameterDecl) -> Self {
        self.parameters.push(parameter);
        self
    }
}

impl ParameterDecl {
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = value_type.into();
        self
    }

    /// Shorthand for `value_type("switch")`.
    pub fn switch(self) -> Self {
        self.value_type("switch")
    }

    pub fn possible_value(mut self, value: impl Into<String>) -> Self {
        self.possible_values.push(value.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_kebab_case_fields() {
        let raw = r#"{
            "format-version": 1,
            "root": {
                "conventions": ["slash-colon"],
                "actions": [{
                    "name": "Copy",
                    "default": true,
                    "parameters": [
                        {"name": "source", "required": true},
                        {"name": "force", "value-type": "switch", "aliases": ["f"]},
                        {"name": "mode", "value-type": "enum", "possible-values": ["fast", "safe"], "default-value": "safe"}
                    ]
                }],
                "subcommands": [{"name": "Remote"}]
            }
        }"#;
        let manifest = CatalogManifest::from_json_str(raw).unwrap();
        let copy = &manifest.root.actions[0];
        assert!(copy.default);
        assert_eq!(copy.parameters[1].aliases, vec!["f".to_string()]);
        assert_eq!(copy.parameters[2].default_value.as_deref(), Some("safe"));
        assert_eq!(manifest.root.subcommands[0].name, "Remote");
    }

    #[test]
    fn manifest_rejects_unknown_version() {
        let raw = r#"{"format-version": 7, "root": {}}"#;
        let err = CatalogManifest::from_json_str(raw).unwrap_err();
        assert!(matches!(err, MetadataError::UnsupportedVersion(7)));
    }

    #[test]
    fn serialization_skips_empty_fields() {
        let manifest = CatalogManifest::new(command("").action(action("Run").param(param("x"))));
        let json = manifest.to_json_pretty().unwrap();
        assert!(json.contains("\"format-version\": 1"));
        assert!(!json.contains("aliases"));
        assert!(!json.contains("subcommands"));
        assert!(!json.contains("default-value"));

        let back = CatalogManifest::from_json_str(&json).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn from_file_reports_missing_path() {
        let err = CatalogManifest::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        match err {
            MetadataError::Io { path, .. } => assert!(path.contains("here.json")),
            other => panic!("expected Io, got: {other:?}"),
        }
    }
}
