// Trellis reference server
// Demo handlers and middleware registered under the names used in routes/

pub mod handlers;
pub mod middleware;

use std::future::Future;

use trellis::axum::extract::Request;
use trellis::axum::response::IntoResponse;
use trellis::{Handler, Middleware, Registry};

use crate::handlers::UserStore;

fn with_store<F, Fut, R>(store: &UserStore, f: F) -> Handler
where
    F: Fn(UserStore, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    let store = store.clone();
    Handler::new(move |req| f(store.clone(), req))
}

/// Names every handler and middleware the reference tree refers to
pub fn registry(store: UserStore) -> Registry {
    Registry::new()
        .with_handler("health", Handler::new(handlers::health))
        .with_handler(
            "users.list",
            with_store(&store, |store, _req| handlers::list_users(store)),
        )
        .with_handler("users.create", with_store(&store, handlers::create_user))
        .with_handler(
            "users.show",
            with_store(&store, handlers::show_user).with_params(["user_id"]),
        )
        .with_handler(
            "users.delete",
            with_store(&store, handlers::delete_user).with_params(["user_id"]),
        )
        .with_handler("files.show", Handler::new(handlers::show_file))
        .with_handler(
            "admin.stats",
            with_store(&store, |store, _req| handlers::admin_stats(store)),
        )
        .with_handler("chat.socket", Handler::new(handlers::chat_socket))
        .with_middleware("request_id", Middleware::new(middleware::request_id))
        .with_middleware("timing", Middleware::new(middleware::timing))
        .with_middleware("require_auth", Middleware::new(middleware::require_auth))
}
