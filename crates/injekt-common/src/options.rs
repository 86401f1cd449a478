//! Resolver configuration.
//!
//! Options are plain data with serde support so hosts can ship them in their
//! own configuration files. Every field falls back to the matching constant in
//! [`crate::limits`].

use crate::limits;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tunables for one resolution session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverOptions {
    /// Nesting depth after which rendered types are elided.
    pub render_depth: u32,
    /// Upper bound on constraint-processing rounds per added constraint.
    pub max_constraint_rounds: u32,
    /// Recursion cap for the candidate specificity comparator.
    pub compare_type_depth: u32,
    /// Emit a debug event for every resolved request.
    pub trace_resolution: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        ResolverOptions {
            render_depth: limits::MAX_RENDER_DEPTH,
            max_constraint_rounds: limits::MAX_CONSTRAINT_ROUNDS,
            compare_type_depth: limits::MAX_COMPARE_TYPE_DEPTH,
            trace_resolution: false,
        }
    }
}

/// Errors produced while loading [`ResolverOptions`].
#[derive(Debug)]
pub enum OptionsError {
    /// The input was not valid JSON for the options schema.
    Parse(serde_json::Error),
    /// A field parsed but holds an unusable value.
    Invalid { field: &'static str, reason: &'static str },
}

impl fmt::Display for OptionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionsError::Parse(err) => write!(f, "invalid resolver options: {err}"),
            OptionsError::Invalid { field, reason } => {
                write!(f, "invalid resolver option `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for OptionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OptionsError::Parse(err) => Some(err),
            OptionsError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for OptionsError {
    fn from(err: serde_json::Error) -> Self {
        OptionsError::Parse(err)
    }
}

impl ResolverOptions {
    /// Parse options from a JSON document. Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, OptionsError> {
        let options: ResolverOptions = serde_json::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject values that would disable a termination bound.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.max_constraint_rounds == 0 {
            return Err(OptionsError::Invalid {
                field: "maxConstraintRounds",
                reason: "must be at least 1",
            });
        }
        if self.compare_type_depth == 0 {
            return Err(OptionsError::Invalid {
                field: "compareTypeDepth",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
