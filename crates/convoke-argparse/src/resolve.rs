//! Action resolution: pick the target command and action for a token list.

use crate::catalog::{Action, Catalog, Command};
use crate::invocation::ResolutionStatus;
use tracing::debug;

/// Outcome of walking the command tree.
///
/// `remaining` is what the binder sees: the tokens after the consumed action
/// and sub-command names, or every token when the default action applies.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolution<'c, 't> {
    pub command: &'c Command,
    pub action: Option<&'c Action>,
    pub status: ResolutionStatus,
    pub remaining: &'t [String],
}

/// At every level: action name, then sub-command name, then default action.
pub(crate) fn resolve_action<'c, 't>(
    catalog: &'c Catalog,
    tokens: &'t [String],
) -> Resolution<'c, 't> {
    let mut command = catalog.root();
    let mut remaining = tokens;

    loop {
        let Some((first, tail)) = remaining.split_first() else {
            return match command.default_action() {
                Some(action) => {
                    debug!(
                        command = %catalog.display_path(command.id()),
                        action = action.name(),
                        "no tokens left, using default action"
                    );
                    Resolution {
                        command,
                        action: Some(action),
                        status: ResolutionStatus::ResolvedAsDefault,
                        remaining,
                    }
                }
                None => {
                    debug!(
                        command = %catalog.display_path(command.id()),
                        "no tokens and no default action"
                    );
                    Resolution {
                        command,
                        action: None,
                        status: ResolutionStatus::UnresolvedNoAction,
                        remaining,
                    }
                }
            };
        };

        if let Some(action) = command.action_by_token(first) {
            debug!(
                command = %catalog.display_path(command.id()),
                action = action.name(),
                "matched action"
            );
            return Resolution {
                command,
                action: Some(action),
                status: ResolutionStatus::Resolved,
                remaining: tail,
            };
        }

        if let Some(child) = command.subcommand(first) {
            debug!(subcommand = first.as_str(), "descending into sub-command");
            command = catalog.node(child);
            remaining = tail;
            continue;
        }

        if let Some(action) = command.default_action() {
            debug!(
                command = %catalog.display_path(command.id()),
                action = action.name(),
                token = first.as_str(),
                "token names no action, falling back to default action"
            );
            return Resolution {
                command,
                action: Some(action),
                status: ResolutionStatus::ResolvedAsDefault,
                remaining,
            };
        }

        debug!(
            command = %catalog.display_path(command.id()),
            token = first.as_str(),
            "unknown token"
        );
        return Resolution {
            command,
            action: None,
            status: ResolutionStatus::UnresolvedUnknownToken,
            remaining,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoke_metadata::{action, command};

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn catalog() -> Catalog {
        Catalog::from_decl(
            &command("")
                .action(action("Main").default_action())
                .action(action("X"))
                .subcommand(command("X").action(action("Inner").default_action()))
                .subcommand(
                    command("Deep")
                        .action(action("Go"))
                        .subcommand(command("Er").action(action("Run").default_action())),
                ),
        )
        .unwrap()
    }

    #[test]
    fn action_name_beats_subcommand_name() {
        let catalog = catalog();
        let toks = tokens(&["X"]);
        let r = resolve_action(&catalog, &toks);
        assert!(r.command.is_root());
        assert_eq!(r.action.map(|a| a.name()), Some("X"));
        assert_eq!(r.status, ResolutionStatus::Resolved);
        assert!(r.remaining.is_empty());
    }

    #[test]
    fn unknown_first_token_goes_to_default_action() {
        let catalog = catalog();
        let toks = tokens(&["value", "/flag"]);
        let r = resolve_action(&catalog, &toks);
        assert_eq!(r.action.map(|a| a.name()), Some("Main"));
        assert_eq!(r.status, ResolutionStatus::ResolvedAsDefault);
        assert_eq!(r.remaining, toks.as_slice());
    }

    #[test]
    fn descends_through_nested_subcommands() {
        let catalog = catalog();
        let toks = tokens(&["Deep", "Er", "tail"]);
        let r = resolve_action(&catalog, &toks);
        assert_eq!(catalog.path_of(r.command.id()), vec!["Deep", "Er"]);
        assert_eq!(r.action.map(|a| a.name()), Some("Run"));
        assert_eq!(r.remaining, &toks[2..]);
    }

    #[test]
    fn unresolved_states() {
        let catalog = catalog();

        let toks = tokens(&["Deep"]);
        let r = resolve_action(&catalog, &toks);
        assert_eq!(r.status, ResolutionStatus::UnresolvedNoAction);
        assert!(r.action.is_none());

        let toks = tokens(&["Deep", "bogus"]);
        let r = resolve_action(&catalog, &toks);
        assert_eq!(r.status, ResolutionStatus::UnresolvedUnknownToken);
        assert_eq!(r.remaining, &toks[1..]);
    }
}
