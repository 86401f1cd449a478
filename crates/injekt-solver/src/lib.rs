//! Type model and type checker for the injekt resolution core.
//!
//! This crate provides:
//! - `TypeId`/`ClassifierId` handles over a session-wide arena (`intern`)
//! - Substitution over types and type parameter lists (`substitute`)
//! - Tag wrapping and unwrapping
//! - Subtyping and equality with variance, nullability and star projections
//!   (`subtype`)
//! - Constraint-based inference for candidate type parameters (`infer`)
//! - Common supertype and intersection (`common_supertype`)
//! - Type rendering (`format`)

pub mod types;
pub use types::*;

pub mod intern;
pub use intern::{LazySuperTypes, TypeInterner};

pub mod substitute;
pub use substitute::TypeSubstitution;

pub mod subtype;
pub use subtype::{StaticChecker, TypeCheckerContext, is_equal_to, is_subtype_of};

pub mod infer;
pub use infer::{
    Constraint, ConstraintKind, ConstraintPosition, TypeContext, TypeContextError,
    run_add_on_injectable_inference, run_candidate_inference,
};

pub mod common_supertype;
pub use common_supertype::{common_super_type, intersect_types, try_common_super_type};

pub mod format;
pub use format::TypeFormatter;

#[cfg(test)]
#[path = "../tests/test_types.rs"]
mod test_types;

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod intern_tests;

#[cfg(test)]
#[path = "../tests/subtype_tests.rs"]
mod subtype_tests;

#[cfg(test)]
#[path = "../tests/infer_tests.rs"]
mod infer_tests;

#[cfg(test)]
#[path = "../tests/common_supertype_tests.rs"]
mod common_supertype_tests;
