//! # Skarv Telemetry
//!
//! Logging and metrics for the allocation service.

pub mod logging;
pub mod metrics;

pub use logging::ServiceLogger;
pub use metrics::AllocMetrics;
