//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound connection
//!     → server.rs (Axum setup, credential gate, dispatch)
//!     → routing table resolves the action
//!     → forward.rs (ordinary request/response against the upstream)
//!       or websocket.rs (bidirectional socket bridge)
//!     → response.rs (fixed JSON error bodies)
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;
pub mod websocket;

pub use request::RequestIdLayer;
pub use server::HttpServer;
