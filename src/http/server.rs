//! HTTP server setup and dispatch.
//!
//! # Responsibilities
//! - Create the Axum router with the gateway handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Gate every route behind the credential verifier
//! - Dispatch authenticated requests to the forwarder or socket bridge
//!
//! # Design Decisions
//! - No route is exempt from the credential gate
//! - Verifier failure short-circuits; the upstream is never contacted
//! - Status codes and bodies follow the fixed error taxonomy

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{FromRequestParts, State, WebSocketUpgrade},
    http::{Request, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::debug;

use crate::auth::{AccessVerifier, VerificationResult};
use crate::config::GatewayConfig;
use crate::http::forward::{self, UpstreamTarget, UpstreamTargetError};
use crate::http::request::{request_id, RequestIdLayer};
use crate::http::response::{json_error, MSG_CONFIGURATION, MSG_NOT_FOUND};
use crate::http::websocket;
use crate::observability::metrics;
use crate::routing::{resolve, RouteAction};

/// Error constructing the server from configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Upstream(#[from] UpstreamTargetError),

    #[error("failed to initialize key-set provider: {0}")]
    KeySet(#[from] crate::auth::KeySetError),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<AccessVerifier>,
    pub client: Client<HttpConnector, Body>,
    pub upstream: Arc<UpstreamTarget>,
}

/// HTTP server for the edge gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ServerError> {
        let verifier = Arc::new(AccessVerifier::from_config(&config.trust, &config.timeouts)?);
        Self::with_verifier(config, verifier)
    }

    /// Create a server with an injected verifier (tests substitute a fixed
    /// key set here).
    pub fn with_verifier(
        config: GatewayConfig,
        verifier: Arc<AccessVerifier>,
    ) -> Result<Self, ServerError> {
        let upstream = Arc::new(UpstreamTarget::from_origin(
            &config.upstream.origin,
            config.upstream.bearer_token.clone(),
        )?);

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            verifier,
            client,
            upstream,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(root_handler))
            .route("/{*path}", any(gateway_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Map a verification result to an early response, or `None` to proceed.
fn gate(result: VerificationResult) -> Option<Response> {
    match result {
        VerificationResult::Authenticated => None,
        VerificationResult::Rejected { reason } => {
            Some(json_error(StatusCode::FORBIDDEN, reason.message()))
        }
        VerificationResult::ConfigurationFault => Some(json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            MSG_CONFIGURATION,
        )),
    }
}

/// Handler for `/`: redirect to the app shell, or bridge an upgrade.
async fn root_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let (mut parts, _body) = request.into_parts();

    let response = match gate(state.verifier.verify(&parts.headers).await) {
        Some(denied) => denied,
        None => {
            // Upgrade extraction fails on an ordinary request; that is the
            // signal for the redirect path, not an error.
            let upgrade = WebSocketUpgrade::from_request_parts(&mut parts, &state)
                .await
                .ok();
            match (resolve(&method, "/", upgrade.is_some()), upgrade) {
                (RouteAction::Bridge, Some(ws)) => websocket::open_bridge(&state, ws).await,
                (RouteAction::RedirectToApp, _) => Redirect::to("/app").into_response(),
                _ => json_error(StatusCode::NOT_FOUND, MSG_NOT_FOUND),
            }
        }
    };

    metrics::record_request(method.as_str(), response.status(), started);
    response
}

/// Handler for every other path: verify, resolve, forward or 404.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    debug!(
        request_id = request_id(&request),
        method = %method,
        path = %path,
        "Gateway request"
    );

    let response = match gate(state.verifier.verify(request.headers()).await) {
        Some(denied) => denied,
        None => match resolve(&method, &path, false) {
            RouteAction::Forward(rule) => forward::forward(&state, rule, request).await,
            _ => json_error(StatusCode::NOT_FOUND, MSG_NOT_FOUND),
        },
    };

    metrics::record_request(method.as_str(), response.status(), started);
    response
}
