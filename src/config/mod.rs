//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (environment overrides, read once)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; secrets come from the environment
//! - All fields have defaults to allow minimal configs
//! - A missing trust configuration is NOT a startup error: the verifier
//!   reports a configuration fault (500) per request instead, so the
//!   operator sees the problem without the process flapping

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::TrustConfig;
pub use schema::UpstreamConfig;
