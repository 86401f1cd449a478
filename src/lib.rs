//! Compile-time dependency injection resolution core.
//!
//! This crate re-exports the workspace crates:
//! - `injekt_common`: limits, recursion guards and resolver options
//! - `injekt_solver`: the type model, subtyping and inference
//! - `injekt_resolver`: scopes, candidate lookup and request resolution
//!
//! plus host conveniences for options files (`config`) and tracing setup
//! (`tracing_config`).
//!
//! ```ignore
//! let interner = TypeInterner::with_options(config::load_options(None)?);
//! let ctx = InjektContext::new(&interner, &table);
//! let file = ctx.file_scope(&table, FileId(0));
//! let result = ctx.resolve_call(file, callee);
//! if let Some(message) = result.render(&ctx) {
//!     eprintln!("{message}");
//! }
//! ```

pub use injekt_common as common;
pub use injekt_resolver as resolver;
pub use injekt_solver as solver;

pub use injekt_common::{OptionsError, ResolverOptions};
pub use injekt_resolver::{
    CallableKind, ClassScopeDecl, DeclarationFeed, DeclarationId, DeclarationTable, Failure, FileId,
    FunctionScopeDecl, GlobalDeclarationIndex, Injectable, InjectableId, InjectableRequest,
    InjectionResult, InjektCallable, InjektContext, PropertyScopeDecl, ResolutionResult, ScopeId,
    ScopeInit, Success,
};
pub use injekt_solver::{
    CallContext, ClassifierDecl, ClassifierFlags, ClassifierId, TypeId, TypeInterner, Variance,
};

pub mod config;
pub use config::{load_options, load_options_file};

pub mod tracing_config;
pub use tracing_config::{LogFormat, init_tracing};
