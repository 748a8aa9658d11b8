//! Convention-driven command dispatch.
//!
//! A [`Catalog`] is built once from declarations (see `convoke-metadata`)
//! and then resolves raw argv tokens into an [`Invocation`]: the target
//! command, the chosen action and a value for every declared parameter.
//!
//! ```
//! use convoke_argparse::{BoundValue, Catalog, ResolutionStatus, Value};
//! use convoke_metadata::{action, command, param};
//!
//! let catalog = Catalog::from_decl(
//!     &command("").action(
//!         action("Copy")
//!             .default_action()
//!             .param(param("source"))
//!             .param(param("force").switch()),
//!     ),
//! )
//! .unwrap();
//!
//! let tokens = vec!["a.txt".to_string(), "/force".to_string()];
//! let inv = catalog.resolve(&tokens).unwrap();
//! assert_eq!(inv.status(), ResolutionStatus::ResolvedAsDefault);
//! assert_eq!(inv.get("source").and_then(BoundValue::as_str), Some("a.txt"));
//! assert_eq!(inv.get("force"), Some(&BoundValue::Explicit(Value::Bool(true))));
//! ```

mod bind;
pub mod catalog;
pub mod convention;
pub mod error;
pub mod exec;
pub mod invocation;
mod resolve;
pub mod token;
pub mod value;

pub use catalog::{Action, Catalog, CatalogBuilder, Command, CommandId, Parameter};
pub use convention::{
    ConventionRegistry, HYPHEN_CASE, HyphenCaseConvention, NamingConvention, SLASH_COLON,
    SlashColonConvention,
};
pub use error::{CatalogError, ExecError, ResolveError};
pub use exec::{Executor, LifecycleHooks};
pub use invocation::{BoundParameter, BoundValue, Invocation, ResolutionStatus};
pub use token::{Token, classify, classify_with};
pub use value::{BuiltinValueParser, Value, ValueParser, ValueParsers, ValueType, parse_bool};

/// Resolve `tokens` against `catalog`.
pub fn resolve<'c>(catalog: &'c Catalog, tokens: &[String]) -> Result<Invocation<'c>, ResolveError> {
    catalog.resolve(tokens)
}
