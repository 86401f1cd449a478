//! Loading resolver options from disk.

use anyhow::{Context, Result};
use injekt_common::ResolverOptions;
use std::path::Path;

/// Read a JSON options file. Missing fields take their defaults.
pub fn load_options_file(path: &Path) -> Result<ResolverOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read resolver options {}", path.display()))?;
    let options = ResolverOptions::from_json(&text)
        .with_context(|| format!("failed to load resolver options {}", path.display()))?;
    tracing::debug!(path = %path.display(), ?options, "loaded resolver options");
    Ok(options)
}

/// Options from `path` when given, defaults otherwise.
pub fn load_options(path: Option<&Path>) -> Result<ResolverOptions> {
    match path {
        Some(path) => load_options_file(path),
        None => Ok(ResolverOptions::default()),
    }
}
