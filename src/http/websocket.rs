//! WebSocket bridging.
//!
//! # Responsibilities
//! - Dial the backend's websocket endpoint before accepting the client
//! - Relay frames verbatim in both directions
//! - Propagate close code/reason from either side to the other
//! - Tear the pair down exactly once on close or error
//!
//! # Data Flow
//! ```text
//! Client ←── frames ──→ Gateway ←── frames ──→ Backend
//! ```
//!
//! # Design Decisions
//! - The backend connection is established first; if its upgrade fails the
//!   caller gets 502 and the client-facing socket is never accepted
//! - A failed data-frame send is logged but does not end the session;
//!   only close frames and stream errors do
//! - Stream errors close the peer with 1011 and a short reason
//! - Ping/pong forwarded transparently

use axum::{
    extract::ws::{close_code, CloseFrame, Message as ClientMessage, WebSocket, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        protocol::frame::coding::CloseCode, protocol::CloseFrame as BackendCloseFrame,
        Message as BackendMessage,
    },
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use crate::http::server::AppState;
use crate::observability::metrics;

type BackendSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Open a bridge session for an authenticated upgrade request on `/`.
///
/// Dials the backend root first; only on a successful backend upgrade is
/// the client-facing socket accepted.
pub async fn open_bridge(state: &AppState, ws: WebSocketUpgrade) -> Response {
    let ws_url = state.upstream.ws_url.clone();

    match connect_async(&ws_url).await {
        Ok((backend, _response)) => {
            metrics::record_bridge_session();
            ws.on_upgrade(move |client| async move {
                relay(client, backend).await;
            })
        }
        Err(e) => {
            error!(url = %ws_url, error = %e, "Backend websocket upgrade failed");
            (StatusCode::BAD_GATEWAY, "upstream websocket unavailable").into_response()
        }
    }
}

/// Relay frames between the accepted client socket and the backend socket
/// until either side closes or errors.
async fn relay(client: WebSocket, backend: BackendSocket) {
    debug!("Bridge session relaying");

    let (mut client_tx, mut client_rx) = client.split();
    let (mut backend_tx, mut backend_rx) = backend.split();

    let client_to_backend = async {
        while let Some(event) = client_rx.next().await {
            match event {
                Ok(ClientMessage::Close(frame)) => {
                    // Best-effort propagation of the same code and reason.
                    let _ = backend_tx
                        .send(BackendMessage::Close(frame.map(|f| BackendCloseFrame {
                            code: CloseCode::from(f.code),
                            reason: f.reason.as_str().into(),
                        })))
                        .await;
                    break;
                }
                Ok(message) => {
                    if let Err(e) = backend_tx.send(client_to_backend_frame(message)).await {
                        warn!(error = %e, "Failed to forward frame to backend");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Client socket error");
                    let _ = backend_tx
                        .send(BackendMessage::Close(Some(BackendCloseFrame {
                            code: CloseCode::Error,
                            reason: "relay error".into(),
                        })))
                        .await;
                    break;
                }
            }
        }
    };

    let backend_to_client = async {
        while let Some(event) = backend_rx.next().await {
            match event {
                Ok(BackendMessage::Close(frame)) => {
                    let _ = client_tx
                        .send(ClientMessage::Close(frame.map(|f| CloseFrame {
                            code: u16::from(f.code),
                            reason: f.reason.as_str().into(),
                        })))
                        .await;
                    break;
                }
                Ok(BackendMessage::Frame(_)) => continue,
                Ok(message) => {
                    if let Err(e) = client_tx.send(backend_to_client_frame(message)).await {
                        warn!(error = %e, "Failed to forward frame to client");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Backend socket error");
                    let _ = client_tx
                        .send(ClientMessage::Close(Some(CloseFrame {
                            code: close_code::ERROR,
                            reason: "relay error".into(),
                        })))
                        .await;
                    break;
                }
            }
        }
    };

    // Whichever direction terminates first ends the session; the other
    // half is dropped, releasing both sockets. Teardown runs once.
    tokio::select! {
        _ = client_to_backend => {}
        _ = backend_to_client => {}
    }

    info!("Bridge session closed");
}

fn client_to_backend_frame(message: ClientMessage) -> BackendMessage {
    match message {
        ClientMessage::Text(text) => BackendMessage::Text(text.as_str().into()),
        ClientMessage::Binary(data) => BackendMessage::Binary(data),
        ClientMessage::Ping(data) => BackendMessage::Ping(data),
        ClientMessage::Pong(data) => BackendMessage::Pong(data),
        // Close frames are handled before conversion.
        ClientMessage::Close(_) => BackendMessage::Close(None),
    }
}

fn backend_to_client_frame(message: BackendMessage) -> ClientMessage {
    match message {
        BackendMessage::Text(text) => ClientMessage::Text(text.as_str().into()),
        BackendMessage::Binary(data) => ClientMessage::Binary(data),
        BackendMessage::Ping(data) => ClientMessage::Ping(data),
        BackendMessage::Pong(data) => ClientMessage::Pong(data),
        BackendMessage::Close(_) | BackendMessage::Frame(_) => ClientMessage::Close(None),
    }
}
