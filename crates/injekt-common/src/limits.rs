//! Centralized limits and thresholds for the resolution core.
//!
//! This module provides a single source of truth for the recursion limits and
//! iteration bounds used by the type checker and the resolver. Every limit is a
//! default that `ResolverOptions` may override.

/// Maximum nesting rendered by the type formatter before eliding with `...`.
pub const MAX_RENDER_DEPTH: u32 = 15;

/// Maximum number of constraint-processing rounds per constraint added.
///
/// Propagation normally reaches a fixed point after a handful of rounds. This
/// bound only trips on malformed bound graphs.
pub const MAX_CONSTRAINT_ROUNDS: u32 = 1_000;

/// Maximum recursion depth for the specificity comparator.
///
/// When exceeded the comparator reports an inconsistency and the candidate list
/// keeps its declaration order.
pub const MAX_COMPARE_TYPE_DEPTH: u32 = 64;

/// Maximum total enter attempts for a single comparator run.
pub const MAX_COMPARE_TYPE_ITERATIONS: u32 = 100_000;
