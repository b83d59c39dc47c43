//! Upstream forwarding.
//!
//! # Responsibilities
//! - Build one outbound request per authenticated inbound request
//! - Apply the resolved path rewrite, preserve the query string
//! - Override the origin (`Host`) and optionally inject the upstream bearer
//! - Return the backend response verbatim (status, headers, streamed body)
//!
//! # Design Decisions
//! - Bodies are streamed through, never buffered
//! - Non-2xx from the backend is NOT an error; it is forwarded as-is
//! - Transport-level failure yields a generic 500; detail is only logged
//! - No retries: retry policy belongs to callers, not this layer

use axum::{
    body::Body,
    http::{
        header,
        uri::{Authority, PathAndQuery, Scheme},
        HeaderValue, Request, StatusCode, Uri,
    },
    response::Response,
};
use tracing::{debug, error};

use crate::http::response::{json_error, MSG_CONFIGURATION, MSG_INTERNAL};
use crate::http::server::AppState;
use crate::routing::ForwardRule;

/// The fixed backend origin, parsed once at startup.
#[derive(Debug, Clone)]
pub struct UpstreamTarget {
    pub scheme: Scheme,
    pub authority: Authority,
    /// Bearer token injected on routes that ask for it.
    pub bearer_token: Option<String>,
    /// ws(s) URL of the backend root, for the socket bridge.
    pub ws_url: String,
}

/// Error building the upstream target from configuration.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamTargetError {
    #[error("invalid upstream origin '{0}'")]
    InvalidOrigin(String),
}

impl UpstreamTarget {
    /// Parse the configured origin into scheme + authority and derive the
    /// websocket URL of the backend root.
    pub fn from_origin(
        origin: &str,
        bearer_token: Option<String>,
    ) -> Result<Self, UpstreamTargetError> {
        let uri: Uri = origin
            .parse()
            .map_err(|_| UpstreamTargetError::InvalidOrigin(origin.to_string()))?;

        let scheme = uri
            .scheme()
            .cloned()
            .ok_or_else(|| UpstreamTargetError::InvalidOrigin(origin.to_string()))?;
        let authority = uri
            .authority()
            .cloned()
            .ok_or_else(|| UpstreamTargetError::InvalidOrigin(origin.to_string()))?;

        let ws_scheme = if scheme == Scheme::HTTPS { "wss" } else { "ws" };
        let ws_url = format!("{}://{}/", ws_scheme, authority);

        Ok(Self {
            scheme,
            authority,
            bearer_token,
            ws_url,
        })
    }
}

/// Forward an authenticated request to the upstream per the resolved rule.
pub async fn forward(state: &AppState, rule: ForwardRule, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let path_and_query = match parts.uri.query() {
        Some(query) => format!("{}?{}", rule.target_path, query),
        None => rule.target_path.clone(),
    };

    let Ok(path_and_query) = path_and_query.parse::<PathAndQuery>() else {
        error!(path = %path_and_query, "Failed to build upstream path");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
    };

    let uri = Uri::builder()
        .scheme(state.upstream.scheme.clone())
        .authority(state.upstream.authority.clone())
        .path_and_query(path_and_query)
        .build();
    let uri = match uri {
        Ok(uri) => uri,
        Err(e) => {
            error!(error = %e, "Failed to build upstream URI");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
        }
    };

    let mut outbound = Request::builder().method(parts.method.clone()).uri(uri);

    if let Some(headers) = outbound.headers_mut() {
        // Append, not insert: repeated header lines must survive verbatim.
        for (name, value) in parts.headers.iter() {
            if name != header::HOST {
                headers.append(name.clone(), value.clone());
            }
        }
        // Origin override: the backend sees itself as the host.
        match HeaderValue::from_str(state.upstream.authority.as_str()) {
            Ok(host) => {
                headers.insert(header::HOST, host);
            }
            Err(e) => {
                error!(error = %e, "Upstream authority is not a valid host header");
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
            }
        }

        if rule.inject_upstream_token {
            let Some(token) = state.upstream.bearer_token.as_deref() else {
                error!("Upstream bearer token not configured for injected route");
                return json_error(StatusCode::INTERNAL_SERVER_ERROR, MSG_CONFIGURATION);
            };
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(header::AUTHORIZATION, value);
                }
                Err(e) => {
                    error!(error = %e, "Upstream bearer token is not a valid header value");
                    return json_error(StatusCode::INTERNAL_SERVER_ERROR, MSG_CONFIGURATION);
                }
            }
        }
    }

    let outbound = match outbound.body(body) {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to build upstream request");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
        }
    };

    debug!(
        method = %parts.method,
        path = %rule.target_path,
        "Forwarding request upstream"
    );

    match state.client.request(outbound).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            error!(error = %e, "Upstream request failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}
