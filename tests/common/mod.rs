//! Shared utilities for integration testing: a mock backend and a gateway
//! bound to ephemeral ports.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        FromRequestParts, Request, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};

use edge_gateway::config::{GatewayConfig, TrustConfig};
use edge_gateway::lifecycle::Shutdown;
use edge_gateway::HttpServer;

pub const SVC_ID: &str = "svc-id";
pub const SVC_SECRET: &str = "svc-secret";

/// Keeps the gateway's shutdown channel alive for the test's duration.
pub struct GatewayHandle {
    pub addr: SocketAddr,
    _shutdown: Shutdown,
}

/// Records what the mock backend observed.
#[derive(Clone, Default)]
pub struct BackendProbe {
    close_code: Arc<Mutex<Option<u16>>>,
    messages: Arc<Mutex<Vec<String>>>,
}

impl BackendProbe {
    pub fn close_code(&self) -> Option<u16> {
        *self.close_code.lock().unwrap()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

/// Trust config with a valid service-token pair.
pub fn service_trust() -> TrustConfig {
    TrustConfig {
        team_domain: Some("team.test".into()),
        audience: Some("aud-tag".into()),
        service_client_id: Some(SVC_ID.into()),
        service_client_secret: Some(SVC_SECRET.into()),
    }
}

/// Spawn the gateway against the given backend origin.
pub async fn spawn_gateway(trust: TrustConfig, backend: SocketAddr) -> GatewayHandle {
    spawn_gateway_with(trust, backend, None).await
}

/// Spawn the gateway with an optional upstream bearer token.
pub async fn spawn_gateway_with(
    trust: TrustConfig,
    backend: SocketAddr,
    bearer_token: Option<String>,
) -> GatewayHandle {
    let mut config = GatewayConfig::default();
    config.trust = trust;
    config.upstream.origin = format!("http://{}", backend);
    config.upstream.bearer_token = bearer_token;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    wait_until_ready(addr).await;
    GatewayHandle {
        addr,
        _shutdown: shutdown,
    }
}

/// Spawn the full mock backend (HTTP routes + websocket echo at `/`).
pub async fn spawn_mock_backend() -> (SocketAddr, BackendProbe) {
    let probe = BackendProbe::default();

    let app = Router::new()
        .route("/", any(backend_root))
        .route("/tools/invoke", post(backend_tools_invoke))
        .route("/v1/chat/completions", post(backend_chat))
        .route("/assets/{*path}", get(backend_asset))
        .route("/favicon.ico", get(|| async { "icon" }))
        .with_state(probe.clone());

    let addr = serve(app).await;
    (addr, probe)
}

/// Spawn a backend whose root does not speak websocket at all.
pub async fn spawn_plain_backend() -> SocketAddr {
    let app = Router::new().route("/", get(|| async { "plain" }));
    serve(app).await
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    wait_until_ready(addr).await;
    addr
}

async fn wait_until_ready(addr: SocketAddr) {
    for _ in 0..50 {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server at {} never became ready", addr);
}

async fn backend_root(State(probe): State<BackendProbe>, request: Request) -> Response {
    let (mut parts, _body) = request.into_parts();
    match WebSocketUpgrade::from_request_parts(&mut parts, &probe).await {
        Ok(ws) => ws.on_upgrade(move |socket| backend_ws(socket, probe)),
        Err(_) => "shell".into_response(),
    }
}

async fn backend_ws(socket: WebSocket, probe: BackendProbe) {
    let (mut tx, mut rx) = socket.split();
    let _ = tx.send(Message::Text("backend-hello".into())).await;

    while let Some(Ok(message)) = rx.next().await {
        match message {
            Message::Text(text) => {
                probe.messages.lock().unwrap().push(text.to_string());
                let _ = tx
                    .send(Message::Text(format!("echo:{}", text).into()))
                    .await;
            }
            Message::Close(frame) => {
                *probe.close_code.lock().unwrap() = frame.map(|f| f.code);
                break;
            }
            _ => {}
        }
    }
}

async fn backend_tools_invoke(headers: HeaderMap, body: Bytes) -> Response {
    if body.as_ref() == b"boom" {
        return (StatusCode::SERVICE_UNAVAILABLE, "backend down").into_response();
    }
    let hops = headers
        .get_all("x-hop")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");
    (
        StatusCode::CREATED,
        [
            ("x-backend", "tools".to_string()),
            ("x-hop-seen", hops),
        ],
        body,
    )
        .into_response()
}

async fn backend_chat(headers: HeaderMap) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    ([("x-got-auth", auth)], "chat-ok").into_response()
}

async fn backend_asset(axum::extract::Path(path): axum::extract::Path<String>) -> String {
    format!("asset:{}", path)
}
