//! Integration tests for the identity providers against a local mock of
//! the platforms' code-exchange endpoints.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use playvault_identity::{
    IdentityError, IdentityProvider, ProviderCode, ProviderConfig, TikTokProvider,
    WeChatProvider,
};
use serde_json::{Value, json};

// =========================================================================
// Mock platform
// =========================================================================

/// WeChat: `abc` is the only valid code.
async fn wechat_session(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let valid = params.get("js_code").map(String::as_str) == Some("abc")
        && params.get("appid").map(String::as_str) == Some("wx-app")
        && params.get("grant_type").map(String::as_str) == Some("authorization_code");
    if valid {
        Json(json!({ "openid": "openid-123", "session_key": "sk" }))
    } else {
        Json(json!({ "errcode": 40029, "errmsg": "invalid code" }))
    }
}

/// TikTok: echoes the anonymous code into the openid so tests can see it.
async fn tiktok_session(Json(body): Json<Value>) -> Json<Value> {
    if body["code"] == "abc" {
        let anon = body["anonymous_code"].as_str().unwrap_or_default();
        Json(json!({
            "err_no": 0,
            "err_tips": "success",
            "data": { "openid": format!("tt-openid{anon}"), "session_key": "sk" }
        }))
    } else {
        Json(json!({ "err_no": 40014, "err_tips": "bad code", "data": null }))
    }
}

async fn server_error() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({ "openid": "too-late" }))
}

async fn not_json() -> &'static str {
    "<html>maintenance</html>"
}

async fn empty_openid() -> Json<Value> {
    Json(json!({ "session_key": "sk" }))
}

/// Starts the mock platform on a random port and returns its base URL.
async fn start_platform() -> String {
    let app = Router::new()
        .route("/wechat", get(wechat_session))
        .route("/tiktok", post(tiktok_session))
        .route("/broken", get(server_error).post(server_error))
        .route("/slow", get(slow))
        .route("/html", get(not_json))
        .route("/empty", get(empty_openid));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock platform");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock platform");
    });
    format!("http://{addr}")
}

fn wechat(base: &str, path: &str) -> WeChatProvider {
    WeChatProvider::new(
        ProviderConfig::new("wx-app", "wx-secret").with_endpoint(format!("{base}{path}")),
    )
}

fn tiktok(base: &str, path: &str) -> TikTokProvider {
    TikTokProvider::new(
        ProviderConfig::new("tt-app", "tt-secret").with_endpoint(format!("{base}{path}")),
    )
}

// =========================================================================
// WeChat
// =========================================================================

#[tokio::test]
async fn test_wechat_valid_code_returns_openid() {
    let base = start_platform().await;

    let id = wechat(&base, "/wechat")
        .resolve(&ProviderCode::new("abc"))
        .await
        .expect("valid code should resolve");

    assert_eq!(id.as_str(), "openid-123");
}

#[tokio::test]
async fn test_wechat_rejected_code_returns_provider_error() {
    let base = start_platform().await;

    let result = wechat(&base, "/wechat").resolve(&ProviderCode::new("nope")).await;

    match result {
        Err(IdentityError::Provider {
            provider,
            code,
            message,
        }) => {
            assert_eq!(provider, "wechat");
            assert_eq!(code, 40029);
            assert_eq!(message, "invalid code");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_wechat_http_500_returns_network_error() {
    let base = start_platform().await;

    let result = wechat(&base, "/broken").resolve(&ProviderCode::new("abc")).await;

    assert!(matches!(result, Err(IdentityError::Network { .. })));
}

#[tokio::test]
async fn test_wechat_slow_provider_times_out_as_network_error() {
    let base = start_platform().await;
    let provider = WeChatProvider::new(
        ProviderConfig::new("wx-app", "wx-secret")
            .with_endpoint(format!("{base}/slow"))
            .with_timeout(Duration::from_secs(1)),
    );

    let result = provider.resolve(&ProviderCode::new("abc")).await;

    assert!(
        matches!(result, Err(ref e @ IdentityError::Network { .. }) if e.is_transient()),
        "deadline expiry must surface as a network error, got {result:?}"
    );
}

#[tokio::test]
async fn test_wechat_non_json_body_returns_network_error() {
    let base = start_platform().await;

    let result = wechat(&base, "/html").resolve(&ProviderCode::new("abc")).await;

    assert!(matches!(result, Err(IdentityError::Network { .. })));
}

#[tokio::test]
async fn test_wechat_missing_openid_returns_provider_error() {
    let base = start_platform().await;

    let result = wechat(&base, "/empty").resolve(&ProviderCode::new("abc")).await;

    assert!(matches!(result, Err(IdentityError::Provider { code: 0, .. })));
}

#[tokio::test]
async fn test_unreachable_provider_returns_network_error() {
    // Port 9 (discard) on localhost is not served by anything in tests.
    let provider = wechat("http://127.0.0.1:9", "/wechat");

    let result = provider.resolve(&ProviderCode::new("abc")).await;

    assert!(matches!(result, Err(IdentityError::Network { .. })));
}

// =========================================================================
// TikTok
// =========================================================================

#[tokio::test]
async fn test_tiktok_valid_code_returns_openid() {
    let base = start_platform().await;

    let id = tiktok(&base, "/tiktok")
        .resolve(&ProviderCode::new("abc"))
        .await
        .expect("valid code should resolve");

    assert_eq!(id.as_str(), "tt-openid");
}

#[tokio::test]
async fn test_tiktok_sends_anonymous_code() {
    let base = start_platform().await;

    let id = tiktok(&base, "/tiktok")
        .resolve(&ProviderCode::new("abc").with_anonymous_code("-anon"))
        .await
        .unwrap();

    assert_eq!(id.as_str(), "tt-openid-anon");
}

#[tokio::test]
async fn test_tiktok_err_no_returns_provider_error() {
    let base = start_platform().await;

    let result = tiktok(&base, "/tiktok").resolve(&ProviderCode::new("zzz")).await;

    assert!(matches!(
        result,
        Err(IdentityError::Provider { provider: "tiktok", code: 40014, .. })
    ));
}

#[tokio::test]
async fn test_tiktok_http_500_returns_network_error() {
    let base = start_platform().await;

    let result = tiktok(&base, "/broken").resolve(&ProviderCode::new("abc")).await;

    assert!(matches!(result, Err(IdentityError::Network { provider: "tiktok", .. })));
}
