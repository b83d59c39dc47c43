//! End-to-end tests for the HTTP surface: credential gate, route table,
//! pass-through forwarding, redirect and error bodies.

use axum::http::StatusCode;
use serde_json::Value;

mod common;
use common::{service_trust, spawn_gateway, spawn_gateway_with, spawn_mock_backend, SVC_ID, SVC_SECRET};

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

fn authed(req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    req.header("CF-Access-Client-Id", SVC_ID)
        .header("CF-Access-Client-Secret", SVC_SECRET)
}

async fn error_body(res: reqwest::Response) -> String {
    let body: Value = res.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn tools_invoke_passes_through_verbatim() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    let res = authed(
        client()
            .post(format!("http://{}/tools/invoke", gateway.addr))
            .body(r#"{"tool":"search","args":{"q":"rust"}}"#),
    )
    .send()
    .await
    .unwrap();

    // Status, headers and body exactly as the backend produced them.
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers().get("x-backend").unwrap(), "tools");
    assert_eq!(
        res.text().await.unwrap(),
        r#"{"tool":"search","args":{"q":"rust"}}"#
    );
}

#[tokio::test]
async fn repeated_header_lines_are_forwarded_verbatim() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    let res = authed(
        client()
            .post(format!("http://{}/tools/invoke", gateway.addr))
            .header("x-hop", "edge-a")
            .header("x-hop", "edge-b")
            .body("{}"),
    )
    .send()
    .await
    .unwrap();

    // Both lines reach the backend; nothing collapses to the last value.
    assert_eq!(res.headers().get("x-hop-seen").unwrap(), "edge-a,edge-b");
}

#[tokio::test]
async fn backend_errors_are_forwarded_not_translated() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    let res = authed(
        client()
            .post(format!("http://{}/tools/invoke", gateway.addr))
            .body("boom"),
    )
    .send()
    .await
    .unwrap();

    // Non-2xx passthrough is not an error.
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.text().await.unwrap(), "backend down");
}

#[tokio::test]
async fn chat_completions_injects_upstream_bearer() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway =
        spawn_gateway_with(service_trust(), backend, Some("up-token".into())).await;

    let res = authed(
        client()
            .post(format!("http://{}/v1/chat/completions", gateway.addr))
            .body("{}"),
    )
    .send()
    .await
    .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers().get("x-got-auth").unwrap(), "Bearer up-token");
}

#[tokio::test]
async fn chat_completions_without_upstream_token_is_config_error() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    let res = authed(
        client()
            .post(format!("http://{}/v1/chat/completions", gateway.addr))
            .body("{}"),
    )
    .send()
    .await
    .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error_body(res).await, "Server configuration error");
}

#[tokio::test]
async fn root_redirects_to_app_shell() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    let res = authed(client().get(format!("http://{}/", gateway.addr)))
        .send()
        .await
        .unwrap();

    assert!(res.status().is_redirection());
    assert_eq!(res.headers().get("location").unwrap(), "/app");
}

#[tokio::test]
async fn app_surface_maps_onto_backend_layout() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    // SPA shell for any /app path.
    let res = authed(client().get(format!("http://{}/app/settings", gateway.addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "shell");

    // /app/assets rewrites to /assets on the backend.
    let res = authed(client().get(format!("http://{}/app/assets/main.js", gateway.addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "asset:main.js");

    // Favicon maps to the backend root.
    let res = authed(client().get(format!("http://{}/app/favicon.ico", gateway.addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "icon");

    // Direct asset path is untouched.
    let res = authed(client().get(format!("http://{}/assets/logo.svg", gateway.addr)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "asset:logo.svg");
}

#[tokio::test]
async fn unknown_path_is_404_with_fixed_body() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    let res = authed(client().get(format!("http://{}/unknown/path", gateway.addr)))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_body(res).await, "Not found");
}

#[tokio::test]
async fn missing_credentials_are_rejected() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    let res = client()
        .get(format!("http://{}/assets/logo.svg", gateway.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_body(res).await, "Missing required access credential");
}

#[tokio::test]
async fn bad_service_token_rejects_even_with_bearer_present() {
    let (backend, _) = spawn_mock_backend().await;
    let gateway = spawn_gateway(service_trust(), backend).await;

    let res = client()
        .get(format!("http://{}/assets/logo.svg", gateway.addr))
        .header("CF-Access-Client-Id", SVC_ID)
        .header("CF-Access-Client-Secret", "wrong")
        .header("cf-access-jwt-assertion", "some-token")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(error_body(res).await, "Invalid service token");
}

#[tokio::test]
async fn incomplete_trust_config_fails_every_route() {
    let (backend, _) = spawn_mock_backend().await;
    let mut trust = service_trust();
    trust.team_domain = None;
    trust.audience = None;
    let gateway = spawn_gateway(trust, backend).await;

    // Even a valid service token cannot get through.
    for path in ["/", "/tools/invoke", "/assets/logo.svg", "/nope"] {
        let res = authed(client().get(format!("http://{}{}", gateway.addr, path)))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert_eq!(error_body(res).await, "Server configuration error", "{path}");
    }
}
