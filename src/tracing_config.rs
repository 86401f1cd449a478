//! Subscriber setup for hosts that want to see resolution traces.
//!
//! `INJEKT_LOG` (or `RUST_LOG`) holds an `EnvFilter` directive, and
//! `INJEKT_LOG_FORMAT` picks `text`, `tree` or `json`. Without a filter
//! variable nothing is installed.
//!
//! ```bash
//! INJEKT_LOG="injekt_resolver=debug" INJEKT_LOG_FORMAT=tree my-host
//! ```
//!
//! The per-request `resolved request` events also need `traceResolution`
//! in the resolver options.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    /// Indented spans via `tracing-tree`, one level per nested request.
    Tree,
    Json,
}

impl LogFormat {
    /// Unknown names read as `Text`.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

fn env_filter() -> Option<EnvFilter> {
    match std::env::var("INJEKT_LOG") {
        Ok(directives) => Some(EnvFilter::builder().parse_lossy(directives)),
        Err(_) if std::env::var_os("RUST_LOG").is_some() => Some(EnvFilter::from_default_env()),
        Err(_) => None,
    }
}

/// Install a global subscriber writing to stderr. A subscriber the host
/// already installed is left in place.
pub fn init_tracing() {
    let Some(filter) = env_filter() else {
        return;
    };
    let format = LogFormat::parse(&std::env::var("INJEKT_LOG_FORMAT").unwrap_or_default());
    let registry = Registry::default().with(filter);
    let _ = match format {
        LogFormat::Tree => registry
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_deferred_spans(true),
            )
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
    };
}
