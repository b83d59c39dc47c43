//! Perimeter authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request headers
//!     → credentials.rs (derive exactly one InboundCredential)
//!     → verifier.rs (decision procedure → VerificationResult)
//!         → service-token path: exact match against configured pair
//!         → bearer path: jwks.rs (cached key set) + signature/claims check
//! ```
//!
//! # Design Decisions
//! - Service token takes precedence over a bearer assertion when both are
//!   presented, even if the service-token match fails
//! - Missing team domain or audience is a configuration fault (500), never
//!   an authentication failure
//! - The key-set source is a trait so tests substitute a fixed key set

pub mod credentials;
pub mod jwks;
pub mod verifier;

pub use credentials::InboundCredential;
pub use jwks::{KeySetError, KeySetProvider, RemoteKeySet, StaticKeySet};
pub use verifier::{AccessVerifier, RejectReason, VerificationResult};
