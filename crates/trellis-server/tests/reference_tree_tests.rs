use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use trellis::{mount, Config, ManifestLoader, RouteMethod, RouteTable};
use trellis_server::handlers::UserStore;
use trellis_server::middleware::REQUEST_ID_HEADER;

fn table() -> RouteTable {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut config = Config::load(root.join("trellis.toml")).unwrap();
    config.routing.routes_dir = root.join("routes").display().to_string();

    let registry = trellis_server::registry(UserStore::with_users(["ada", "grace"]));
    config.discover(&ManifestLoader::new(registry)).unwrap()
}

fn app() -> Router {
    mount(&table())
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, request_id, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[test]
fn test_reference_tree_discovers() {
    let table = table();
    let routes: Vec<_> = table
        .iter()
        .map(|e| format!("{} {}", e.method, e.pattern))
        .collect();

    assert_eq!(
        routes,
        vec![
            "WEBSOCKET /chat",
            "GET /health",
            "GET /stats",
            "GET /api/users",
            "POST /api/users",
            "GET /api/files/*path",
            "GET /api/users/:user_id",
            "DELETE /api/users/:user_id",
        ]
    );

    let delete = table.get("/api/users/:user_id", RouteMethod::Delete).unwrap();
    assert_eq!(delete.chain.names(), ["request_id", "timing", "require_auth"]);
    assert_eq!(delete.metadata.tags, vec!["users"]);
    assert_eq!(delete.metadata.status_code, Some(204));

    let files = table.get("/api/files/*path", RouteMethod::Get).unwrap();
    assert_eq!(files.metadata.tags, vec!["files"]);
}

#[tokio::test]
async fn test_health_carries_request_id() {
    let (status, request_id, body) = call(app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    assert_eq!(request_id.map(|id| id.len()), Some(36));
}

#[tokio::test]
async fn test_users_crud() {
    let app = app();

    let (status, _, body) = call(app.clone(), get("/api/users")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "id": 1, "name": "ada" }, { "id": 2, "name": "grace" }])
    );

    let create = Request::builder()
        .method(Method::POST)
        .uri("/api/users")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"linus"}"#))
        .unwrap();
    let (status, _, body) = call(app.clone(), create).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "id": 3, "name": "linus" }));

    let (status, _, body) = call(app.clone(), get("/api/users/3")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "linus");

    let (status, _, _) = call(app.clone(), get("/api/users/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_requires_auth() {
    let app = app();

    let anonymous = Request::builder()
        .method(Method::DELETE)
        .uri("/api/users/1")
        .body(Body::empty())
        .unwrap();
    let (status, request_id, _) = call(app.clone(), anonymous).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(request_id.is_some());

    let authorized = Request::builder()
        .method(Method::DELETE)
        .uri("/api/users/1")
        .header(header::AUTHORIZATION, "Bearer demo")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = call(app.clone(), authorized).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _, _) = call(app, get("/api/users/1")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_group_is_protected() {
    let (status, _, _) = call(app(), get("/stats")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/stats")
        .header(header::AUTHORIZATION, "Bearer demo")
        .body(Body::empty())
        .unwrap();
    let (status, _, body) = call(app(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "users": 2 }));
}

#[tokio::test]
async fn test_catch_all_receives_the_rest() {
    let (status, _, body) = call(app(), get("/api/files/docs/readme.md")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("file: docs/readme.md"));
}
