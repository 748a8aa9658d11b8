//! Immutable command/action/parameter catalog.
//!
//! Commands are stored in an arena owned by `Catalog`. A parent owns its
//! children through `subcommands`; a child points back with a plain
//! `CommandId`, never an owning reference.

use crate::convention::{ConventionRegistry, NamingConvention, SLASH_COLON};
use crate::error::CatalogError;
use crate::value::{Value, ValueParser, ValueParsers, ValueType};
use convoke_metadata::{ActionDecl, CommandDecl, ParameterDecl};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

const ROOT_LABEL: &str = "<root>";

/// Index of a command inside its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(usize);

impl CommandId {
    pub const ROOT: Self = Self(0);

    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    aliases: Vec<String>,
    value_type: ValueType,
    position: Option<usize>,
    required: bool,
    default: Option<Value>,
    description: String,
    shared: bool,
}

impl Parameter {
    /// Canonical declared name (conventions derive the long name from it).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        self.aliases.as_slice()
    }

    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// Declaration index within the owning action; `None` for shared parameters.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_switch(&self) -> bool {
        self.value_type.is_switch()
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// Whether a bare positional token may fill this parameter.
    ///
    /// Switches and shared parameters are only reachable by name.
    pub fn is_positional(&self) -> bool {
        self.position.is_some() && !self.is_switch()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    name: String,
    is_default: bool,
    aliases: Vec<String>,
    description: String,
    parameters: Vec<Parameter>,
}

impl Action {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn aliases(&self) -> &[String] {
        self.aliases.as_slice()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared parameters, in position order.
    pub fn parameters(&self) -> &[Parameter] {
        self.parameters.as_slice()
    }
}

#[derive(Debug)]
pub struct Command {
    id: CommandId,
    name: String,
    description: String,
    parent: Option<CommandId>,
    actions: Vec<Action>,
    subcommands: IndexMap<String, CommandId>,
    shared: Vec<Parameter>,
    conventions: Vec<Arc<dyn NamingConvention>>,
}

impl Command {
    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Non-owning back-reference to the parent command.
    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn actions(&self) -> &[Action] {
        self.actions.as_slice()
    }

    pub fn shared_parameters(&self) -> &[Parameter] {
        self.shared.as_slice()
    }

    pub fn subcommands(&self) -> impl Iterator<Item = (&str, CommandId)> {
        self.subcommands.iter().map(|(name, id)| (name.as_str(), *id))
    }

    pub fn conventions(&self) -> &[Arc<dyn NamingConvention>] {
        self.conventions.as_slice()
    }

    pub fn default_action(&self) -> Option<&Action> {
        self.actions.iter().find(|a| a.is_default)
    }

    /// Action by exact declared name.
    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Action whose convention-derived name, then alias, equals `token`.
    pub fn action_by_token(&self, token: &str) -> Option<&Action> {
        self.actions
            .iter()
            .find(|a| {
                self.conventions
                    .iter()
                    .any(|c| c.derive_action_name(a.name()) == token)
            })
            .or_else(|| {
                self.actions.iter().find(|a| {
                    self.conventions
                        .iter()
                        .any(|c| c.action_name_matches(token, a))
                })
            })
    }

    /// Sub-command by exact name.
    pub fn subcommand(&self, name: &str) -> Option<CommandId> {
        self.subcommands.get(name).copied()
    }
}

/// Read-only command tree plus the value parsers used while binding.
#[derive(Debug)]
pub struct Catalog {
    commands: Vec<Command>,
    parsers: ValueParsers,
}

impl Catalog {
    /// Build with the built-in conventions and value parsers.
    pub fn from_decl(decl: &CommandDecl) -> Result<Self, CatalogError> {
        CatalogBuilder::new().build(decl)
    }

    /// Build with the built-in conventions and the given value parsers.
    pub fn build(decl: &CommandDecl, parsers: &ValueParsers) -> Result<Self, CatalogError> {
        CatalogBuilder::new().value_parsers(parsers.clone()).build(decl)
    }

    pub fn root(&self) -> &Command {
        self.node(CommandId::ROOT)
    }

    pub fn command(&self, id: CommandId) -> Option<&Command> {
        self.commands.get(id.0)
    }

    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.iter()
    }

    pub fn value_parsers(&self) -> &ValueParsers {
        &self.parsers
    }

    /// Walk sub-command names from the root.
    pub fn find(&self, path: &[&str]) -> Option<&Command> {
        let mut current = self.root();
        for name in path {
            current = self.command(current.subcommand(name)?)?;
        }
        Some(current)
    }

    pub fn parent_of(&self, id: CommandId) -> Option<&Command> {
        self.command(id)?.parent.and_then(|p| self.command(p))
    }

    /// Sub-command names from the root down to `id` (root excluded).
    pub fn path_of(&self, id: CommandId) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self.command(id);
        while let Some(cmd) = current {
            if cmd.is_root() {
                break;
            }
            names.push(cmd.name());
            current = cmd.parent.and_then(|p| self.command(p));
        }
        names.reverse();
        names
    }

    /// Human-readable command path used in messages and logs.
    pub fn display_path(&self, id: CommandId) -> String {
        let path = self.path_of(id);
        if path.is_empty() {
            ROOT_LABEL.to_string()
        } else {
            path.join(" ")
        }
    }

    // Ids handed out by this catalog always index into `commands`.
    pub(crate) fn node(&self, id: CommandId) -> &Command {
        &self.commands[id.0]
    }
}

/// Catalog construction step: declarations in, validated immutable tree out.
#[derive(Debug)]
pub struct CatalogBuilder {
    parsers: ValueParsers,
    conventions: ConventionRegistry,
    default_conventions: Vec<String>,
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self {
            parsers: ValueParsers::new(),
            conventions: ConventionRegistry::builtin(),
            default_conventions: vec![SLASH_COLON.to_string()],
        }
    }

    pub fn value_parser(
        mut self,
        category: impl Into<String>,
        parser: impl ValueParser + 'static,
    ) -> Self {
        self.parsers = self.parsers.register(category, parser);
        self
    }

    /// Replace the whole parser registry.
    pub fn value_parsers(mut self, parsers: ValueParsers) -> Self {
        self.parsers = parsers;
        self
    }

    /// Make a custom convention available to declarations by name.
    pub fn convention(mut self, convention: impl NamingConvention + 'static) -> Self {
        self.conventions = self.conventions.register(convention);
        self
    }

    /// Conventions used when the root declares none.
    pub fn default_conventions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_conventions = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(&self, decl: &CommandDecl) -> Result<Catalog, CatalogError> {
        let mut catalog = Catalog {
            commands: Vec::new(),
            parsers: self.parsers.clone(),
        };
        let defaults = self.lookup_conventions(ROOT_LABEL, &self.default_conventions)?;
        self.add_command(&mut catalog, decl, None, &defaults, "")?;
        tracing::debug!(commands = catalog.commands.len(), "catalog built");
        Ok(catalog)
    }

    fn lookup_conventions(
        &self,
        label: &str,
        names: &[String],
    ) -> Result<Vec<Arc<dyn NamingConvention>>, CatalogError> {
        names
            .iter()
            .map(|name| {
                self.conventions
                    .get(name)
                    .ok_or_else(|| CatalogError::UnknownConvention {
                        command: label.to_string(),
                        name: name.clone(),
                    })
            })
            .collect()
    }

    fn add_command(
        &self,
        catalog: &mut Catalog,
        decl: &CommandDecl,
        parent: Option<CommandId>,
        inherited: &[Arc<dyn NamingConvention>],
        parent_path: &str,
    ) -> Result<CommandId, CatalogError> {
        let id = CommandId(catalog.commands.len());
        // The root is addressed by position, never by name.
        let name = match parent {
            None => String::new(),
            Some(_) => decl.name.trim().to_string(),
        };
        let label = match (parent, parent_path.is_empty()) {
            (None, _) => ROOT_LABEL.to_string(),
            (Some(_), true) => name.clone(),
            (Some(_), false) => format!("{parent_path} {name}"),
        };

        let conventions = if decl.conventions.is_empty() {
            inherited.to_vec()
        } else {
            self.lookup_conventions(&label, &decl.conventions)?
        };

        let shared = decl
            .shared_parameters
            .iter()
            .map(|p| self.build_parameter(p, None, &label))
            .collect::<Result<Vec<_>, _>>()?;
        check_parameter_names(&label, shared.iter(), &conventions)?;

        let actions = decl
            .actions
            .iter()
            .map(|a| self.build_action(a, &label))
            .collect::<Result<Vec<_>, _>>()?;
        check_actions(&label, &actions, &conventions)?;
        for action in &actions {
            let scope = format!("{label} {}", action.name);
            check_parameter_names(
                &scope,
                action.parameters.iter().chain(shared.iter()),
                &conventions,
            )?;
        }

        catalog.commands.push(Command {
            id,
            name,
            description: decl.description.clone(),
            parent,
            actions,
            subcommands: IndexMap::new(),
            shared,
            conventions: conventions.clone(),
        });

        // Children are added after the parent so ids stay in pre-order.
        let child_path = if parent.is_none() { "" } else { label.as_str() };
        let mut subcommands: IndexMap<String, CommandId> = IndexMap::new();
        for sub in &decl.subcommands {
            let sub_name = sub.name.trim();
            if sub_name.is_empty() {
                return Err(CatalogError::EmptyName {
                    kind: "sub-command",
                    command: label.clone(),
                });
            }
            if subcommands.contains_key(sub_name) {
                return Err(CatalogError::DuplicateCommand {
                    command: label.clone(),
                    name: sub_name.to_string(),
                });
            }
            let child = self.add_command(catalog, sub, Some(id), &conventions, child_path)?;
            subcommands.insert(sub_name.to_string(), child);
        }
        catalog.commands[id.0].subcommands = subcommands;

        Ok(id)
    }

    fn build_action(&self, decl: &ActionDecl, label: &str) -> Result<Action, CatalogError> {
        let name = decl.name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName {
                kind: "action",
                command: label.to_string(),
            });
        }

        let parameters = decl
            .parameters
            .iter()
            .enumerate()
            .map(|(position, p)| self.build_parameter(p, Some(position), label))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Action {
            name: name.to_string(),
            is_default: decl.default,
            aliases: trimmed(&decl.aliases),
            description: decl.description.clone(),
            parameters,
        })
    }

    fn build_parameter(
        &self,
        decl: &ParameterDecl,
        position: Option<usize>,
        label: &str,
    ) -> Result<Parameter, CatalogError> {
        let name = decl.name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName {
                kind: "parameter",
                command: label.to_string(),
            });
        }

        let value_type = ValueType::from_category(&decl.value_type, &decl.possible_values);
        if let ValueType::Enum(values) = &value_type {
            if values.is_empty() {
                return Err(CatalogError::EmptyEnum {
                    parameter: name.to_string(),
                });
            }
        }

        let default = decl
            .default_value
            .as_deref()
            .map(|raw| {
                self.parsers
                    .parse(raw, &value_type)
                    .map_err(|reason| CatalogError::InvalidDefault {
                        parameter: name.to_string(),
                        literal: raw.to_string(),
                        reason,
                    })
            })
            .transpose()?;

        Ok(Parameter {
            name: name.to_string(),
            aliases: trimmed(&decl.aliases),
            value_type,
            position,
            required: decl.required,
            default,
            description: decl.description.clone(),
            shared: position.is_none(),
        })
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every spelling that selects an item: declared name, each convention's
/// derived name, then aliases.
fn spellings(
    name: &str,
    aliases: &[String],
    conventions: &[Arc<dyn NamingConvention>],
    derive: impl Fn(&dyn NamingConvention, &str) -> String,
) -> Vec<String> {
    let mut out = vec![name.to_string()];
    out.extend(conventions.iter().map(|c| derive(&**c, name)));
    out.extend(aliases.iter().cloned());
    out.dedup();
    out
}

fn check_actions(
    label: &str,
    actions: &[Action],
    conventions: &[Arc<dyn NamingConvention>],
) -> Result<(), CatalogError> {
    let mut names: HashMap<String, usize> = HashMap::new();
    let mut default: Option<&str> = None;

    for (idx, action) in actions.iter().enumerate() {
        let spellings = spellings(&action.name, &action.aliases, conventions, |c, n| {
            c.derive_action_name(n)
        });
        for spelling in spellings {
            if let Some(prev) = names.insert(spelling.clone(), idx) {
                if prev != idx {
                    return Err(CatalogError::DuplicateAction {
                        command: label.to_string(),
                        name: spelling,
                        first: actions[prev].name.clone(),
                        second: action.name.clone(),
                    });
                }
            }
        }

        if action.is_default {
            if let Some(first) = default {
                return Err(CatalogError::MultipleDefaults {
                    command: label.to_string(),
                    first: first.to_string(),
                    second: action.name.clone(),
                });
            }
            default = Some(action.name.as_str());
        }
    }
    Ok(())
}

fn check_parameter_names<'p>(
    scope: &str,
    parameters: impl Iterator<Item = &'p Parameter>,
    conventions: &[Arc<dyn NamingConvention>],
) -> Result<(), CatalogError> {
    let mut names: HashMap<String, &str> = HashMap::new();
    let mut seen: Vec<&str> = Vec::new();

    for parameter in parameters {
        if seen.contains(&parameter.name.as_str()) {
            return Err(CatalogError::DuplicateParameter {
                scope: scope.to_string(),
                name: parameter.name.clone(),
                first: parameter.name.clone(),
                second: parameter.name.clone(),
            });
        }
        seen.push(parameter.name.as_str());

        let spellings = spellings(&parameter.name, &parameter.aliases, conventions, |c, n| {
            c.derive_parameter_long_name(n)
        });
        for spelling in spellings {
            if let Some(prev) = names.insert(spelling.clone(), parameter.name.as_str()) {
                if prev != parameter.name {
                    return Err(CatalogError::DuplicateParameter {
                        scope: scope.to_string(),
                        name: spelling,
                        first: prev.to_string(),
                        second: parameter.name.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}
