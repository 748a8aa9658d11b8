use convoke_argparse::{Catalog, Command};
use serde::Serialize;

use crate::manifest::LoadedCatalog;

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub catalog: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub commands: Vec<CommandSummary>,
}

#[derive(Debug, Serialize)]
pub struct CommandSummary {
    pub path: String,
    pub conventions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_action: Option<String>,
    pub actions: Vec<String>,
    pub shared_parameters: Vec<String>,
}

/// Build the catalog and summarize it; a build failure is reported, not raised.
pub fn check_catalog(loaded: &LoadedCatalog) -> CheckReport {
    let catalog = loaded.path.display().to_string();

    match Catalog::from_decl(&loaded.manifest.root) {
        Ok(built) => CheckReport {
            catalog,
            valid: true,
            error: None,
            commands: built.commands().map(|c| summarize(&built, c)).collect(),
        },
        Err(err) => CheckReport {
            catalog,
            valid: false,
            error: Some(err.to_string()),
            commands: Vec::new(),
        },
    }
}

fn summarize(catalog: &Catalog, command: &Command) -> CommandSummary {
    CommandSummary {
        path: catalog.display_path(command.id()),
        conventions: command
            .conventions()
            .iter()
            .map(|c| c.name().to_string())
            .collect(),
        default_action: command.default_action().map(|a| a.name().to_string()),
        actions: command
            .actions()
            .iter()
            .map(|a| {
                let params: Vec<String> = a
                    .parameters()
                    .iter()
                    .map(|p| {
                        let spelling = command
                            .conventions()
                            .first()
                            .map(|c| c.long_option_name(p))
                            .unwrap_or_else(|| p.name().to_string());
                        if p.is_required() {
                            spelling
                        } else {
                            format!("[{spelling}]")
                        }
                    })
                    .collect();
                if params.is_empty() {
                    a.name().to_string()
                } else {
                    format!("{} {}", a.name(), params.join(" "))
                }
            })
            .collect(),
        shared_parameters: command
            .shared_parameters()
            .iter()
            .map(|p| p.name().to_string())
            .collect(),
    }
}
