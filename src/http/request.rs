//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Buffer the inbound request once so it can be replayed on every retry
//! - Keep the client address and path for failure logging
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Body size is bounded before anything is forwarded

use std::net::SocketAddr;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Uri};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::ProxyError;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates `x-request-id` values for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// An inbound request with its body fully buffered.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub remote_addr: SocketAddr,
}

impl ProxyRequest {
    /// Read the whole body (up to `limit` bytes) into memory.
    pub async fn buffer(
        request: Request<Body>,
        remote_addr: SocketAddr,
        limit: usize,
    ) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| ProxyError::from_body_error(limit, e))?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            remote_addr,
        })
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn request_id(&self) -> &str {
        self.headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote() -> SocketAddr {
        "10.9.8.7:5555".parse().unwrap()
    }

    #[tokio::test]
    async fn buffers_body_and_keeps_metadata() {
        let request = Request::builder()
            .method("POST")
            .uri("/items?id=3")
            .header(X_REQUEST_ID, "abc")
            .body(Body::from("payload"))
            .unwrap();

        let buffered = ProxyRequest::buffer(request, remote(), 1024).await.unwrap();
        assert_eq!(buffered.method, Method::POST);
        assert_eq!(buffered.path(), "/items");
        assert_eq!(buffered.request_id(), "abc");
        assert_eq!(&buffered.body[..], b"payload");
        assert_eq!(buffered.remote_addr, remote());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let request = Request::builder()
            .uri("/")
            .body(Body::from(vec![0u8; 64]))
            .unwrap();

        let err = ProxyRequest::buffer(request, remote(), 16).await.unwrap_err();
        assert!(matches!(err, ProxyError::BodyTooLarge { limit: 16 }));
    }

    #[test]
    fn generated_request_ids_are_uuids() {
        let request = Request::new(());
        let id = MakeRequestUuid.make_request_id(&request).unwrap();
        let value = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(value).is_ok());
    }
}
