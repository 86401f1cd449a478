//! Injection resolution for the injekt resolution core.
//!
//! This crate provides:
//! - Candidate declarations as typed callables (`callable`)
//! - The closed set of candidates and requests (`injectable`)
//! - Host interfaces for declarations (`declarations`)
//! - The scope chain with candidate lookup, builtins and add-ons (`scope`)
//! - Module and provide-function expansion (`module`)
//! - Scope factories per lexical construct (`scope_factories`)
//! - Candidate specificity (`compare`)
//! - Request resolution with memoization and divergence detection
//!   (`resolution`)
//! - Resolution outcomes and their diagnostics (`result`, `diagnostics`)

pub mod callable;
pub use callable::{CallableKind, DeclarationId, InjektCallable};

pub mod injectable;
pub use injectable::{Injectable, InjectableId, InjectableRequest};

pub mod declarations;
pub use declarations::{DeclarationFeed, DeclarationTable, FileId, GlobalDeclarationIndex};

pub mod context;
pub use context::{InjektContext, ScopeConstruct};

pub mod scope;
pub use scope::{InjectablesScope, ScopeId, ScopeInit};

mod module;

pub mod scope_factories;
pub use scope_factories::{ClassScopeDecl, FunctionScopeDecl, PropertyScopeDecl};

pub mod compare;

pub mod resolution;

pub mod result;
pub use result::{DependencyResults, Failure, InjectionResult, ResolutionResult, Success};

pub mod diagnostics;

#[cfg(test)]
#[path = "../tests/fixture.rs"]
mod fixture;

#[cfg(test)]
#[path = "../tests/scope_tests.rs"]
mod scope_tests;

#[cfg(test)]
#[path = "../tests/module_tests.rs"]
mod module_tests;

#[cfg(test)]
#[path = "../tests/compare_tests.rs"]
mod compare_tests;

#[cfg(test)]
#[path = "../tests/resolution_tests.rs"]
mod resolution_tests;

#[cfg(test)]
#[path = "../tests/diagnostics_tests.rs"]
mod diagnostics_tests;
