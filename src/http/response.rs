//! Response handling and transformation.
//!
//! # Responsibilities
//! - Build the plain-text 503 returned when no backend can serve a request
//! - Strip hop-by-hop headers in both directions
//! - Map request-side errors to status codes (413 over the limit, 400 otherwise)
//!
//! # Design Decisions
//! - Backend responses are streamed back, never buffered
//! - "All backends dead" and "too many backends tried" look the same to clients

use std::error::Error as StdError;

use axum::http::{header, HeaderMap, HeaderName, StatusCode};
use http_body_util::LengthLimitError;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub const SERVICE_UNAVAILABLE_BODY: &str = "Service not available";

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP_HEADERS: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Host label of the backend that answered, attached to its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedBy(pub String);

/// Errors raised before a request reaches any backend.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("request body could not be read: {0}")]
    BodyRead(#[source] axum::Error),
}

impl ProxyError {
    /// Classify a failed body read as over-limit or a broken stream.
    pub fn from_body_error(limit: usize, error: axum::Error) -> Self {
        let mut current: Option<&(dyn StdError + 'static)> = Some(&error);
        while let Some(e) = current {
            if e.is::<LengthLimitError>() {
                return ProxyError::BodyTooLarge { limit };
            }
            current = e.source();
        }
        ProxyError::BodyRead(error)
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::BodyTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response()
            }
            ProxyError::BodyRead(_) => {
                (StatusCode::BAD_REQUEST, "Failed to read request body").into_response()
            }
        }
    }
}

pub fn service_unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, SERVICE_UNAVAILABLE_BODY).into_response()
}

/// Remove hop-by-hop headers, including any named in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named.iter().chain(HOP_BY_HOP_HEADERS.iter()) {
        headers.remove(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn strips_standard_and_connection_listed_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive, x-session"));
        headers.insert("keep-alive", HeaderValue::from_static("timeout=5"));
        headers.insert("x-session", HeaderValue::from_static("s1"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn aborted_body_is_a_bad_request() {
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away");
        let err = ProxyError::from_body_error(1024, axum::Error::new(reset));

        assert!(matches!(err, ProxyError::BodyRead(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn over_limit_body_is_413() {
        let err = ProxyError::BodyTooLarge { limit: 16 };
        assert_eq!(err.into_response().status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn service_unavailable_is_503() {
        let response = service_unavailable();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
