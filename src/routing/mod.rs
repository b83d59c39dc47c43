//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticated request (method, path, upgrade?)
//!     → table.rs (fixed rule table, first match wins)
//!     → RouteAction: forward / redirect / bridge / not-found
//! ```
//!
//! # Design Decisions
//! - The table is hardcoded: this gateway fronts exactly one backend and a
//!   fixed small set of routes, by design
//! - Resolution is a pure function, deterministic and trivially testable
//! - Only `GET /` is upgrade-aware; upgrades elsewhere fall through

pub mod table;

pub use table::{resolve, ForwardRule, RouteAction};
