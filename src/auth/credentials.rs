//! Inbound credential extraction.
//!
//! Exactly one credential variant is derived per request. A service-token
//! pair (both headers present) takes precedence over a bearer assertion.

use axum::http::HeaderMap;

/// Header carrying the signed bearer assertion.
pub const JWT_ASSERTION_HEADER: &str = "cf-access-jwt-assertion";

/// Header carrying the service-token client id.
pub const CLIENT_ID_HEADER: &str = "cf-access-client-id";

/// Header carrying the service-token client secret.
pub const CLIENT_SECRET_HEADER: &str = "cf-access-client-secret";

/// The credential presented by an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundCredential {
    /// Static shared-secret pair for service-to-service calls.
    ServiceToken {
        client_id: String,
        client_secret: String,
    },

    /// Signed token asserting a verified interactive identity.
    BearerAssertion { token: String },

    /// No recognized credential headers were present.
    None,
}

impl InboundCredential {
    /// Derive the credential from request headers.
    ///
    /// The service-token pair short-circuits: when both of its headers are
    /// present the bearer assertion is never considered, even if set.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let client_id = header_str(headers, CLIENT_ID_HEADER);
        let client_secret = header_str(headers, CLIENT_SECRET_HEADER);

        if let (Some(client_id), Some(client_secret)) = (client_id, client_secret) {
            return Self::ServiceToken {
                client_id: client_id.to_string(),
                client_secret: client_secret.to_string(),
            };
        }

        match header_str(headers, JWT_ASSERTION_HEADER) {
            Some(token) => Self::BearerAssertion {
                token: token.to_string(),
            },
            None => Self::None,
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
