//! Shared fixtures: temporary route trees and a recording registry

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use trellis_router::axum::body::{to_bytes, Body};
use trellis_router::axum::extract::Request;
use trellis_router::axum::http::StatusCode;
use trellis_router::axum::response::{IntoResponse, Response};
use trellis_router::{
    discover, DiscoverOptions, Handler, ManifestLoader, Middleware, Next, Registry, Result,
    RouteTable,
};

pub type Log = Arc<Mutex<Vec<String>>>;

/// A route tree under a temporary directory
pub struct Tree {
    dir: TempDir,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `body` to `relative`, creating parent directories
    pub fn file(&self, relative: &str, body: &str) -> &Self {
        let path = self.dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
        self
    }

    pub fn dir(&self, relative: &str) -> &Self {
        fs::create_dir_all(self.dir.path().join(relative)).unwrap();
        self
    }

    /// A route file mapping each method to `ok`
    pub fn route(&self, relative_dir: &str, methods: &[&str]) -> &Self {
        let mut body = String::from("[handlers]\n");
        for method in methods {
            body.push_str(&format!("{method} = \"ok\"\n"));
        }
        self.file(&join(relative_dir, "route.toml"), &body)
    }

    pub fn middleware(&self, relative_dir: &str, names: &[&str]) -> &Self {
        let list = names
            .iter()
            .map(|n| format!("\"{n}\""))
            .collect::<Vec<_>>()
            .join(", ");
        self.file(
            &join(relative_dir, "_middleware.toml"),
            &format!("middleware = [{list}]\n"),
        )
    }

    pub fn discover(&self, registry: Registry) -> Result<RouteTable> {
        self.discover_with(registry, &DiscoverOptions::new())
    }

    pub fn discover_with(&self, registry: Registry, options: &DiscoverOptions) -> Result<RouteTable> {
        discover(self.path(), options, &ManifestLoader::new(registry))
    }
}

fn join(dir: &str, file: &str) -> String {
    if dir.is_empty() || dir == "." {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

/// Middleware that records `{label}-before` and `{label}-after`
pub fn marker(log: &Log, label: &str) -> Middleware {
    let log = Arc::clone(log);
    let label = label.to_string();
    Middleware::new(move |req: Request, next: Next| {
        let log = Arc::clone(&log);
        let label = label.clone();
        async move {
            log.lock().unwrap().push(format!("{label}-before"));
            let response = next.run(req).await;
            log.lock().unwrap().push(format!("{label}-after"));
            response
        }
    })
}

/// Handler that records `handler-call` and answers with `body`
pub fn recording_handler(log: &Log, body: &'static str) -> Handler {
    let log = Arc::clone(log);
    Handler::new(move |_req| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push("handler-call".to_string());
            body
        }
    })
}

/// Registry used across the integration tests
///
/// Handlers: `ok`, `blocking`, `users.show` (declares `user_id`).
/// Middleware: `dir`, `outer`, `inner`, `file`, `handler`, `deny`, `sync_auth` (blocking).
pub fn registry(log: &Log) -> Registry {
    let mut registry = Registry::new()
        .with_handler("ok", recording_handler(log, "ok"))
        .with_handler("blocking", Handler::blocking(|_req| "blocking"))
        .with_handler(
            "users.show",
            recording_handler(log, "user").with_params(["user_id"]),
        )
        .with_middleware(
            "deny",
            Middleware::new(|_req: Request, _next: Next| async {
                StatusCode::UNAUTHORIZED.into_response()
            }),
        )
        .with_middleware(
            "sync_auth",
            Middleware::blocking(|_req: Request, _next: Next| StatusCode::OK.into_response()),
        );

    for label in ["dir", "outer", "inner", "file", "handler", "group"] {
        registry.insert_middleware(label, marker(log, label));
    }
    registry
}

pub fn request(uri: &str) -> Request {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}
