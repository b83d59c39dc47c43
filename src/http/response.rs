//! Fixed error responses.
//!
//! Every error path produces a JSON body with a single `error` string
//! field. The messages are fixed per result kind: internal error detail is
//! logged server-side and never echoed to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

pub const MSG_NOT_FOUND: &str = "Not found";
pub const MSG_INTERNAL: &str = "Internal server error";
pub const MSG_CONFIGURATION: &str = "Server configuration error";

/// Build a JSON `{"error": ...}` response with the given status.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
