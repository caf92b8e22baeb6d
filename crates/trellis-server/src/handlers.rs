// File: src/handlers.rs
// Purpose: Demo route handlers for the reference tree

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
}

#[derive(Debug, Default)]
struct Users {
    next_id: u64,
    items: Vec<User>,
}

/// In-memory user storage shared by the demo handlers
#[derive(Debug, Clone, Default)]
pub struct UserStore {
    inner: Arc<RwLock<Users>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut users = Users::default();
        for name in names {
            users.next_id += 1;
            users.items.push(User {
                id: users.next_id,
                name: name.into(),
            });
        }
        Self {
            inner: Arc::new(RwLock::new(users)),
        }
    }

    pub async fn list(&self) -> Vec<User> {
        self.inner.read().await.items.clone()
    }

    pub async fn get(&self, id: u64) -> Option<User> {
        self.inner.read().await.items.iter().find(|u| u.id == id).cloned()
    }

    pub async fn create(&self, name: String) -> User {
        let mut users = self.inner.write().await;
        users.next_id += 1;
        let user = User {
            id: users.next_id,
            name,
        };
        users.items.push(user.clone());
        user
    }

    pub async fn remove(&self, id: u64) -> bool {
        let mut users = self.inner.write().await;
        let before = users.items.len();
        users.items.retain(|u| u.id != id);
        users.items.len() != before
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.items.len()
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn path_param<T>(req: Request) -> Result<T, Response>
where
    T: serde::de::DeserializeOwned + Send,
{
    let (mut parts, _body) = req.into_parts();
    Path::<T>::from_request_parts(&mut parts, &())
        .await
        .map(|Path(value)| value)
        .map_err(IntoResponse::into_response)
}

pub async fn health(_req: Request) -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_users(store: UserStore) -> Json<Vec<User>> {
    Json(store.list().await)
}

pub async fn create_user(store: UserStore, req: Request) -> Response {
    match <Json<NewUser> as FromRequest<()>>::from_request(req, &()).await {
        Ok(Json(new_user)) if !new_user.name.trim().is_empty() => {
            let user = store.create(new_user.name).await;
            debug!(id = user.id, "Created user");
            Json(user).into_response()
        }
        Ok(_) => error_response(StatusCode::UNPROCESSABLE_ENTITY, "name must not be empty"),
        Err(rejection) => rejection.into_response(),
    }
}

pub async fn show_user(store: UserStore, req: Request) -> Response {
    let id: u64 = match path_param(req).await {
        Ok(id) => id,
        Err(response) => return response,
    };
    match store.get(id).await {
        Some(user) => Json(user).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "user not found"),
    }
}

pub async fn delete_user(store: UserStore, req: Request) -> Response {
    let id: u64 = match path_param(req).await {
        Ok(id) => id,
        Err(response) => return response,
    };
    if store.remove(id).await {
        StatusCode::OK.into_response()
    } else {
        error_response(StatusCode::NOT_FOUND, "user not found")
    }
}

pub async fn show_file(req: Request) -> Response {
    match path_param::<String>(req).await {
        Ok(path) => format!("file: {path}").into_response(),
        Err(response) => response,
    }
}

pub async fn admin_stats(store: UserStore) -> Json<serde_json::Value> {
    Json(json!({ "users": store.count().await }))
}

/// Upgrades to a websocket that echoes every text and binary frame
pub async fn chat_socket(req: Request) -> Response {
    let (mut parts, _body) = req.into_parts();
    match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
        Ok(ws) => ws.on_upgrade(echo),
        Err(rejection) => rejection.into_response(),
    }
}

async fn echo(mut socket: WebSocket) {
    while let Some(message) = socket.recv().await {
        let message = match message {
            Ok(Message::Close(_)) => break,
            Ok(message @ (Message::Text(_) | Message::Binary(_))) => message,
            Ok(_) => continue,
            Err(e) => {
                warn!("Websocket receive failed: {}", e);
                break;
            }
        };
        if socket.send(message).await.is_err() {
            break;
        }
    }
}
