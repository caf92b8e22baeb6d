// File: src/mount.rs
// Purpose: Register a discovered route table on an axum Router

use std::collections::BTreeMap;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use tracing::debug;
use trellis_router::{Chain, RouteEntry, RouteMethod, RouteTable};

/// Builds an axum Router with one route per distinct pattern
///
/// Each method is served by its compiled chain. A pattern with both `get`
/// and `websocket` entries sends upgrade requests to the websocket chain and
/// everything else to `get`. A `200 OK` from a chain is rewritten to the
/// route's resolved status code (`201` for POST, `204` for DELETE, or the
/// handler override).
///
/// Tables from [`trellis_router::discover`] never hold two patterns with
/// differently named parameters at one position, which axum would refuse.
pub fn mount(table: &RouteTable) -> Router {
    let mut grouped: BTreeMap<String, Vec<&RouteEntry>> = BTreeMap::new();
    for entry in table {
        grouped.entry(entry.pattern.render()).or_default().push(entry);
    }

    grouped
        .into_iter()
        .fold(Router::new(), |router, (pattern, entries)| {
            debug!(pattern = %pattern, methods = entries.len(), "Mounting route");
            router.route(&pattern, method_router(&entries))
        })
}

fn method_router(entries: &[&RouteEntry]) -> MethodRouter {
    let websocket = entries
        .iter()
        .find(|entry| entry.method.is_websocket())
        .map(|entry| Endpoint::from_entry(entry));
    let get = entries
        .iter()
        .find(|entry| entry.method == RouteMethod::Get)
        .map(|entry| Endpoint::from_entry(entry));

    let mut router = MethodRouter::new();

    match (get, websocket) {
        (Some(get), Some(websocket)) => {
            router = router.on(MethodFilter::GET, move |req: Request| async move {
                if is_upgrade(req.headers()) {
                    websocket.call(req).await
                } else {
                    get.call(req).await
                }
            });
        }
        (Some(endpoint), None) | (None, Some(endpoint)) => {
            router = router.on(MethodFilter::GET, move |req: Request| endpoint.call_owned(req));
        }
        (None, None) => {}
    }

    for entry in entries {
        if let Some(filter) = method_filter(entry.method) {
            let endpoint = Endpoint::from_entry(entry);
            router = router.on(filter, move |req: Request| endpoint.call_owned(req));
        }
    }

    router
}

/// Filters for every method except GET, which is registered separately
fn method_filter(method: RouteMethod) -> Option<MethodFilter> {
    match method {
        RouteMethod::Post => Some(MethodFilter::POST),
        RouteMethod::Put => Some(MethodFilter::PUT),
        RouteMethod::Patch => Some(MethodFilter::PATCH),
        RouteMethod::Delete => Some(MethodFilter::DELETE),
        RouteMethod::Head => Some(MethodFilter::HEAD),
        RouteMethod::Options => Some(MethodFilter::OPTIONS),
        RouteMethod::Get | RouteMethod::WebSocket => None,
    }
}

fn is_upgrade(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("websocket"))
}

/// A compiled chain plus the status applied to its plain `200 OK` responses
#[derive(Clone)]
struct Endpoint {
    chain: Chain,
    status: Option<StatusCode>,
}

impl Endpoint {
    fn from_entry(entry: &RouteEntry) -> Self {
        Self {
            chain: entry.chain.clone(),
            status: entry
                .metadata
                .status_code
                .and_then(|code| StatusCode::from_u16(code).ok()),
        }
    }

    async fn call(&self, req: Request) -> Response {
        let response = self.chain.call(req).await;
        apply_status(response, self.status)
    }

    async fn call_owned(self, req: Request) -> Response {
        self.call(req).await
    }
}

fn apply_status(mut response: Response, status: Option<StatusCode>) -> Response {
    let Some(status) = status else {
        return response;
    };
    if response.status() != StatusCode::OK || status == StatusCode::OK {
        return response;
    }

    *response.status_mut() = status;
    if status == StatusCode::NO_CONTENT {
        *response.body_mut() = Body::empty();
        response.headers_mut().remove(header::CONTENT_TYPE);
        response.headers_mut().remove(header::CONTENT_LENGTH);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_apply_status_rewrites_plain_ok() {
        let response = apply_status("made".into_response(), Some(StatusCode::CREATED));
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[test]
    fn test_apply_status_keeps_explicit_status() {
        let response = apply_status(
            StatusCode::UNAUTHORIZED.into_response(),
            Some(StatusCode::CREATED),
        );
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = apply_status("ws".into_response(), None);
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_no_content_drops_the_body_headers() {
        let response = apply_status("gone".into_response(), Some(StatusCode::NO_CONTENT));
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_upgrade_header_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_upgrade(&headers));
        headers.insert(header::UPGRADE, "WebSocket".parse().unwrap());
        assert!(is_upgrade(&headers));
    }
}
