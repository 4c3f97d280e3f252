//! End-to-end transport tests against a local axum server.

use std::sync::{Arc, Mutex};

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{Html, IntoResponse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use url::Url;

use folio_transport::error::INTERNAL_ERROR_MESSAGE;
use folio_transport::multipart::Form;
use folio_transport::{
    Body, CredentialsMode, Http, MemoryStorage, Payload, RequestOptions, StorageApi, TransportError, UrlParams,
    TOKEN_KEY,
};

// ============================================================================
// Test Server
// ============================================================================

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Value {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map_or(Value::Null, |v| json!(v))
}

async fn echo(headers: HeaderMap, uri: Uri) -> Json<Value> {
    Json(json!({
        "authorization": header_str(&headers, header::AUTHORIZATION),
        "acceptLanguage": header_str(&headers, header::ACCEPT_LANGUAGE),
        "contentType": header_str(&headers, header::CONTENT_TYPE),
        "query": uri.query(),
    }))
}

async fn echo_body(headers: HeaderMap, body: String) -> Json<Value> {
    Json(json!({
        "contentType": header_str(&headers, header::CONTENT_TYPE),
        "body": body,
    }))
}

async fn delete_portfolio(Path(id): Path<String>) -> impl IntoResponse {
    if id == "missing" {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Portfolio not found", "code": "NOT_FOUND"})),
        )
            .into_response()
    } else {
        StatusCode::NO_CONTENT.into_response()
    }
}

fn router() -> Router {
    Router::new()
        .route("/api/echo", get(echo).post(echo_body).put(echo_body))
        .route(
            "/api/no-content",
            get(|| async { (StatusCode::NO_CONTENT, [(header::CONTENT_TYPE, "application/json")]) }),
        )
        .route("/api/no-type", get(|| async { StatusCode::OK }))
        .route("/api/text", get(|| async { "share-url" }))
        .route(
            "/api/file",
            get(|| async { ([(header::CONTENT_TYPE, "application/octet-stream")], vec![1u8, 2, 3]) }),
        )
        .route("/api/html", get(|| async { Html("<p>hello</p>") }))
        .route(
            "/api/bad-json",
            get(|| async { ([(header::CONTENT_TYPE, "application/json")], "{not json") }),
        )
        .route("/api/unauthorized", get(|| async { StatusCode::UNAUTHORIZED }))
        .route(
            "/api/fail-json",
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"message": "X", "code": "E1", "captured": {"id": 7}})),
                )
            }),
        )
        .route(
            "/api/fail-html",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, Html("<h1>boom</h1>")) }),
        )
        .route(
            "/api/fail-unregistered",
            get(|| async { (StatusCode::from_u16(599).unwrap(), Json(json!({"message": "Odd"}))) }),
        )
        .route("/api/portfolio-info/{id}", delete(delete_portfolio))
        .route("/api/upload", post(echo_body))
        .route("/static/version", get(|| async { Json(json!({"version": "1.2.3"})) }))
}

async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    format!("http://{addr}")
}

fn transport(origin: &str, storage: Arc<MemoryStorage>) -> Http {
    Http::builder(origin).storage(storage).build().unwrap()
}

async fn echo_json(http: &Http, params: Option<&UrlParams>) -> Value {
    match http.get("echo", params, None).await.unwrap() {
        Payload::Json(value) => value,
        other => panic!("expected JSON, got {}", other.kind()),
    }
}

// ============================================================================
// Request Building
// ============================================================================

#[tokio::test]
async fn test_default_headers_reach_server() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "t0k3n")));

    let echoed = echo_json(&http, None).await;
    assert_eq!(echoed["authorization"], json!("Bearer t0k3n"));
    assert_eq!(echoed["acceptLanguage"], json!("ru_RU"));
    assert_eq!(echoed["contentType"], json!("application/json;charset=UTF-8"));
    assert_eq!(echoed["query"], Value::Null);
}

#[tokio::test]
async fn test_list_params_repeat_on_the_wire() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let params = UrlParams::new().with("k", vec!["a", "b"]).with("n", 3);
    let echoed = echo_json(&http, Some(&params)).await;

    assert_eq!(echoed["query"], json!("k=a&k=b&n=3"));
    assert_eq!(echoed["authorization"], Value::Null);
}

#[tokio::test]
async fn test_omit_credentials_still_sends_bearer_token() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "t0k3n")));

    let options = RequestOptions::new().credentials(CredentialsMode::Omit);
    let echoed = match http.get("echo", None, Some(options)).await.unwrap() {
        Payload::Json(value) => value,
        other => panic!("expected JSON, got {}", other.kind()),
    };
    assert_eq!(echoed["authorization"], json!("Bearer t0k3n"));
}

#[tokio::test]
async fn test_large_ids_are_exact_on_the_wire() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let params = UrlParams::new().with("portfolioId", 9_007_199_254_740_993_u64);
    let echoed = echo_json(&http, Some(&params)).await;
    assert_eq!(echoed["query"], json!("portfolioId=9007199254740993"));
}

#[tokio::test]
async fn test_json_body_is_stringified() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let payload = http
        .post("/echo", Some(Body::Json(json!({"name": "Main"}))), None, None)
        .await
        .unwrap();
    let echoed: Value = payload.into_json().unwrap();

    assert_eq!(echoed["contentType"], json!("application/json;charset=UTF-8"));
    let sent: Value = serde_json::from_str(echoed["body"].as_str().unwrap()).unwrap();
    assert_eq!(sent, json!({"name": "Main"}));
}

#[tokio::test]
async fn test_form_body_is_multipart() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let form = Form::new().text("provider", "TINKOFF");
    let echoed: Value = http
        .post("upload", Some(Body::Form(form)), None, None)
        .await
        .unwrap()
        .into_json()
        .unwrap();

    let content_type = echoed["contentType"].as_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"), "{content_type}");
    assert!(echoed["body"].as_str().unwrap().contains("TINKOFF"));
}

#[tokio::test]
async fn test_put_sends_body() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let echoed: Value = http
        .put("echo", Some(Body::from("plain")), None)
        .await
        .unwrap()
        .into_json()
        .unwrap();
    assert_eq!(echoed["body"], json!("plain"));
}

#[tokio::test]
async fn test_get_direct_skips_api_prefix() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let version: Value = http
        .get_direct("static/version", None, None)
        .await
        .unwrap()
        .into_json()
        .unwrap();
    assert_eq!(version["version"], json!("1.2.3"));
}

// ============================================================================
// Response Classification
// ============================================================================

#[tokio::test]
async fn test_no_content_is_empty_regardless_of_type() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    assert!(http.get("no-content", None, None).await.unwrap().is_empty());
    assert!(http.get("no-type", None, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_text_and_binary_payloads() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let text = http.get("text", None, None).await.unwrap();
    assert!(matches!(&text, Payload::Text(t) if t == "share-url"));

    let file = http.get("file", None, None).await.unwrap();
    assert_eq!(file.kind(), "binary");
    assert_eq!(file.into_bytes().await.unwrap(), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let err = http.get("html", None, None).await.unwrap_err();
    assert!(
        matches!(&err, TransportError::UnsupportedContentType(ct) if ct.starts_with("text/html")),
        "{err:?}"
    );
}

#[tokio::test]
async fn test_malformed_json_body() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    let err = http.get("bad-json", None, None).await.unwrap_err();
    assert!(matches!(err, TransportError::InvalidBody(_)), "{err:?}");
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_unauthorized_clears_token_and_calls_hook() {
    let origin = spawn_server().await;
    let storage = Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "stale"));
    let seen = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorder = seen.clone();

    let http = Http::builder(format!("{origin}/portfolio/1"))
        .storage(storage.clone())
        .on_access_denied(Arc::new(move |origin: &Url| {
            recorder.lock().unwrap().push(origin.to_string());
        }))
        .build()
        .unwrap();

    let err = http.get("unauthorized", None, None).await.unwrap_err();
    assert!(err.is_access_denied());
    assert_eq!(err.status(), Some(401));
    assert_eq!(storage.get(TOKEN_KEY).await.unwrap(), None);
    assert_eq!(*seen.lock().unwrap(), vec![format!("{origin}/")]);

    // Later calls go out without credentials
    let echoed = echo_json(&http, None).await;
    assert_eq!(echoed["authorization"], Value::Null);
}

#[tokio::test]
async fn test_error_body_fields_are_mapped() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    match http.get("fail-json", None, None).await.unwrap_err() {
        TransportError::Server(e) => {
            assert_eq!(e.message, "X");
            assert_eq!(e.code.as_deref(), Some("E1"));
            assert_eq!(e.captured, Some(json!({"id": 7})));
            assert_eq!(e.status, 400);
            assert_eq!(e.status_text, "Bad Request");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unparseable_error_body_uses_generic_message() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    match http.get("fail-html", None, None).await.unwrap_err() {
        TransportError::Server(e) => {
            assert_eq!(e.message, INTERNAL_ERROR_MESSAGE);
            assert_eq!(e.code, None);
            assert_eq!(e.status, 500);
            assert_eq!(e.status_text, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_status_text_is_canonical_reason() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    match http.get("fail-unregistered", None, None).await.unwrap_err() {
        TransportError::Server(e) => {
            assert_eq!(e.message, "Odd");
            assert_eq!(e.status, 599);
            assert_eq!(e.status_text, "");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_with_path_parameter() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::new()));

    assert!(http.delete("portfolio-info/17", None, None).await.unwrap().is_empty());

    let err = http.delete("portfolio-info/missing", None, None).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.code(), Some("NOT_FOUND"));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let http = transport(&format!("http://{addr}"), Arc::new(MemoryStorage::new()));
    let err = http.get("echo", None, None).await.unwrap_err();

    assert!(err.is_network(), "{err:?}");
    assert_eq!(err.status(), None);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_concurrent_calls_are_independent() {
    let origin = spawn_server().await;
    let http = transport(&origin, Arc::new(MemoryStorage::with_entry(TOKEN_KEY, "shared")));

    let calls = (0..8).map(|i| {
        let http = http.clone();
        async move {
            let params = UrlParams::new().with("i", i);
            echo_json(&http, Some(&params)).await
        }
    });

    let results = futures::future::join_all(calls).await;
    for (i, echoed) in results.iter().enumerate() {
        assert_eq!(echoed["query"], json!(format!("i={i}")));
        assert_eq!(echoed["authorization"], json!("Bearer shared"));
    }
}
