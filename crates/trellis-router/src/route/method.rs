use std::fmt;

use axum::http::Method;
use serde::Serialize;

/// A handler slot a route file may fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    #[serde(rename = "websocket")]
    WebSocket,
}

impl RouteMethod {
    pub const ALL: [RouteMethod; 8] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Patch,
        Self::Delete,
        Self::Head,
        Self::Options,
        Self::WebSocket,
    ];

    /// Parses an export name, ignoring ASCII case
    pub fn from_export(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.export_name().eq_ignore_ascii_case(name))
    }

    /// Lowercase export name (`get`, `websocket`)
    pub fn export_name(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
            Self::Head => "head",
            Self::Options => "options",
            Self::WebSocket => "websocket",
        }
    }

    /// Display form (`GET`, `WEBSOCKET`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::WebSocket => "WEBSOCKET",
        }
    }

    /// The HTTP method, `None` for websocket
    pub fn http_method(self) -> Option<Method> {
        match self {
            Self::Get => Some(Method::GET),
            Self::Post => Some(Method::POST),
            Self::Put => Some(Method::PUT),
            Self::Patch => Some(Method::PATCH),
            Self::Delete => Some(Method::DELETE),
            Self::Head => Some(Method::HEAD),
            Self::Options => Some(Method::OPTIONS),
            Self::WebSocket => None,
        }
    }

    /// Convention-based status: POST 201, DELETE 204, otherwise 200
    pub fn default_status(self) -> Option<u16> {
        match self {
            Self::Post => Some(201),
            Self::Delete => Some(204),
            Self::WebSocket => None,
            _ => Some(200),
        }
    }

    pub fn is_websocket(self) -> bool {
        self == Self::WebSocket
    }

    /// Comma-separated export names, for error messages
    pub fn allowed_exports() -> String {
        Self::ALL
            .iter()
            .map(|m| m.export_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(RouteMethod::from_export("get"), Some(RouteMethod::Get));
        assert_eq!(RouteMethod::from_export("POST"), Some(RouteMethod::Post));
        assert_eq!(
            RouteMethod::from_export("WebSocket"),
            Some(RouteMethod::WebSocket)
        );
        assert_eq!(RouteMethod::from_export("trace"), None);
        assert_eq!(RouteMethod::from_export("ws"), None);
    }

    #[test]
    fn default_statuses() {
        assert_eq!(RouteMethod::Post.default_status(), Some(201));
        assert_eq!(RouteMethod::Delete.default_status(), Some(204));
        assert_eq!(RouteMethod::Get.default_status(), Some(200));
        assert_eq!(RouteMethod::Patch.default_status(), Some(200));
        assert_eq!(RouteMethod::WebSocket.default_status(), None);
    }

    #[test]
    fn websocket_has_no_http_method() {
        assert_eq!(RouteMethod::WebSocket.http_method(), None);
        assert_eq!(RouteMethod::Put.http_method(), Some(Method::PUT));
    }

    #[test]
    fn allowed_exports_lists_every_method() {
        assert_eq!(
            RouteMethod::allowed_exports(),
            "get, post, put, patch, delete, head, options, websocket"
        );
    }
}
