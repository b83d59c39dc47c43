//! Observability: structured logging and metrics.
//!
//! # Design Decisions
//! - `tracing` for structured logs, env-filter configurable
//! - Prometheus exposition is optional and off by default
//! - Credential values never appear in logs or metric labels

pub mod logging;
pub mod metrics;
