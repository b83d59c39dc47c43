//! Edge Authentication Gateway Library
//!
//! An authenticating reverse proxy that sits in front of a backend chat/tool
//! service. Every inbound request is gated by a credential verifier (signed
//! bearer assertion or static service-token pair) before being forwarded to
//! a single fixed upstream origin. `GET /` with a websocket upgrade is
//! bridged to the backend's own websocket endpoint.

pub mod auth;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
