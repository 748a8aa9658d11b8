//! Execution step: run the handler registered for a resolved action.

use crate::catalog::{Catalog, CommandId};
use crate::error::ExecError;
use crate::invocation::Invocation;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Callbacks around every handler call.
///
/// `before` hooks run in attach order before the handler; `after` hooks run
/// in attach order after it, each receiving the exit code returned by the
/// previous step. Hooks are not called when resolution or the handler fails.
pub trait LifecycleHooks: Send + Sync {
    fn before(&self, _invocation: &Invocation<'_>) {}

    fn after(&self, _invocation: &Invocation<'_>, exit_code: i32) -> i32 {
        exit_code
    }
}

type Handler = Box<dyn Fn(&Invocation<'_>) -> anyhow::Result<i32> + Send + Sync>;

pub struct Executor {
    catalog: Arc<Catalog>,
    handlers: HashMap<(CommandId, String), Handler>,
    fallback: Option<Handler>,
    hooks: Vec<Box<dyn LifecycleHooks>>,
}

impl Executor {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            handlers: HashMap::new(),
            fallback: None,
            hooks: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Register the handler for `action` on the command at `path`.
    pub fn handle<F>(mut self, path: &[&str], action: &str, handler: F) -> Result<Self, ExecError>
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<i32> + Send + Sync + 'static,
    {
        let command = self
            .catalog
            .find(path)
            .ok_or_else(|| ExecError::UnknownCommand(path.join(" ")))?;
        let action = command
            .action(action)
            .ok_or_else(|| ExecError::UnknownAction {
                command: self.catalog.display_path(command.id()),
                action: action.to_string(),
            })?
            .name()
            .to_string();
        let key = (command.id(), action);
        self.handlers.insert(key, Box::new(handler));
        Ok(self)
    }

    /// Handler for every action without a dedicated one.
    pub fn fallback<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<i32> + Send + Sync + 'static,
    {
        self.fallback = Some(Box::new(handler));
        self
    }

    pub fn hook(mut self, hook: impl LifecycleHooks + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    /// Resolve `tokens` and run the matching handler through the hooks.
    pub fn execute(&self, tokens: &[String]) -> Result<i32, ExecError> {
        let invocation = self.catalog.resolve(tokens)?;
        let command = self.catalog.display_path(invocation.command().id());

        let Some(action) = invocation.action() else {
            return Err(ExecError::Unresolved {
                status: invocation.status(),
                command,
                rest: invocation.rest().to_vec(),
            });
        };

        let missing: Vec<String> = invocation
            .missing_required()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ExecError::MissingRequired {
                action: action.name().to_string(),
                parameters: missing,
            });
        }

        let key = (invocation.command().id(), action.name().to_string());
        let handler = self
            .handlers
            .get(&key)
            .or(self.fallback.as_ref())
            .ok_or_else(|| ExecError::NoHandler {
                command: command.clone(),
                action: action.name().to_string(),
            })?;

        for hook in &self.hooks {
            hook.before(&invocation);
        }
        let exit_code = handler(&invocation).map_err(|error| ExecError::Handler {
            action: action.name().to_string(),
            error,
        })?;
        let exit_code = self
            .hooks
            .iter()
            .fold(exit_code, |code, hook| hook.after(&invocation, code));

        debug!(command = %command, action = action.name(), exit_code, "action finished");
        Ok(exit_code)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("handlers", &self.handlers.len())
            .field("fallback", &self.fallback.is_some())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::ResolutionStatus;
    use convoke_metadata::{action, command, param};
    use std::sync::Mutex;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> Arc<Catalog> {
        let decl = command("")
            .action(action("Run").default_action().param(param("target").required(true)))
            .action(action("Fail"))
            .action(action("Orphan"))
            .subcommand(command("Empty"));
        Arc::new(Catalog::from_decl(&decl).unwrap())
    }

    struct Recorder {
        tag: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        bump: i32,
    }

    impl LifecycleHooks for Recorder {
        fn before(&self, invocation: &Invocation<'_>) {
            let action = invocation.action().map(|a| a.name()).unwrap_or("-");
            self.log.lock().unwrap().push(format!("{}:before:{action}", self.tag));
        }

        fn after(&self, _invocation: &Invocation<'_>, exit_code: i32) -> i32 {
            self.log.lock().unwrap().push(format!("{}:after:{exit_code}", self.tag));
            exit_code + self.bump
        }
    }

    fn executor(log: Arc<Mutex<Vec<String>>>) -> Executor {
        let handler_log = log.clone();
        Executor::new(catalog())
            .handle(&[], "Run", move |inv| {
                let target = inv.get("target").and_then(|v| v.as_str()).unwrap_or("");
                handler_log.lock().unwrap().push(format!("run:{target}"));
                Ok(3)
            })
            .unwrap()
            .handle(&[], "Fail", |_| anyhow::bail!("boom"))
            .unwrap()
            .hook(Recorder {
                tag: "a",
                log: log.clone(),
                bump: 10,
            })
            .hook(Recorder { tag: "b", log, bump: 100 })
    }

    #[test]
    fn hooks_wrap_handler_in_attach_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let code = executor(log.clone()).execute(&tokens(&["Run", "x"])).unwrap();
        assert_eq!(code, 113);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:before:Run", "b:before:Run", "run:x", "a:after:3", "b:after:13"]
        );
    }

    #[test]
    fn missing_required_is_reported_before_handler() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let err = executor(log.clone()).execute(&tokens(&["Run"])).unwrap_err();
        assert!(matches!(err, ExecError::MissingRequired { ref parameters, .. } if parameters == &["target"]));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn unresolved_and_unhandled() {
        let exec = executor(Arc::new(Mutex::new(Vec::new())));

        let err = exec.execute(&tokens(&["Empty"])).unwrap_err();
        assert!(matches!(
            err,
            ExecError::Unresolved { status: ResolutionStatus::UnresolvedNoAction, .. }
        ));

        let err = exec.execute(&tokens(&["Orphan"])).unwrap_err();
        assert!(matches!(err, ExecError::NoHandler { .. }));

        let err = exec.execute(&tokens(&["Fail"])).unwrap_err();
        assert_eq!(err.to_string(), "action 'Fail' failed: boom");
    }

    #[test]
    fn fallback_catches_unregistered_actions() {
        let exec = Executor::new(catalog()).fallback(|inv| {
            Ok(inv.action().map(|a| a.parameters().len() as i32).unwrap_or(-1))
        });
        assert_eq!(exec.execute(&tokens(&["Orphan"])).unwrap(), 0);
    }

    #[test]
    fn registration_checks_the_catalog() {
        let err = Executor::new(catalog())
            .handle(&["Nope"], "Run", |_| Ok(0))
            .unwrap_err();
        assert!(matches!(err, ExecError::UnknownCommand(_)));

        let err = Executor::new(catalog())
            .handle(&[], "Missing", |_| Ok(0))
            .unwrap_err();
        assert!(matches!(err, ExecError::UnknownAction { .. }));
    }
}
