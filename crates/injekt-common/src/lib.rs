//! Common types and utilities shared by the injekt crates.
//!
//! This crate provides:
//! - String interning (`Atom`, `Interner`)
//! - Centralized limits for recursive computations (`limits`)
//! - A reusable recursion guard (`RecursionGuard`, `RecursionProfile`)
//! - Resolver configuration (`ResolverOptions`)

pub mod interner;
pub use interner::{Atom, Interner};

pub mod limits;

pub mod recursion;
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};

pub mod options;
pub use options::{OptionsError, ResolverOptions};

#[cfg(test)]
#[path = "../tests/interner_tests.rs"]
mod interner_tests;

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod options_tests;

#[cfg(test)]
#[path = "../tests/recursion_tests.rs"]
mod recursion_tests;
