//! ## skarv-telemetry::logging
//! **Structured logging for the allocation service**
//!
//! One global `tracing` subscriber for the whole process. `RUST_LOG`
//! always wins; the configured filter is only the fallback.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct ServiceLogger;

impl ServiceLogger {
    /// Installs the global subscriber with an `info` fallback filter.
    pub fn init() {
        Self::init_with_filter("info")
    }

    /// Installs the global subscriber. `default_directives` applies when
    /// `RUST_LOG` is unset.
    pub fn init_with_filter(default_directives: &str) {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_directives)),
            )
            .with_thread_names(true)
            .with_span_events(FmtSpan::ENTER)
            .init()
    }
}
