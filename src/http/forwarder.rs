//! Forwarding of buffered requests to a single upstream.
//!
//! # Responsibilities
//! - Rewrite the request URI onto the backend (scheme, authority, base path, query)
//! - Strip hop-by-hop headers and append the client to `X-Forwarded-For`
//! - Report transport failures; any HTTP status counts as a delivery

use std::fmt;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderValue, Request, Uri};
use axum::response::Response;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;
use url::Url;

use crate::http::request::ProxyRequest;
use crate::http::response::strip_hop_by_hop;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Error type for a failed delivery.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("failed to build upstream request: {0}")]
    Request(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("{0}")]
    Other(String),
}

/// Delivers one request to one backend.
#[async_trait]
pub trait Forwarder: Send + Sync + fmt::Debug {
    async fn forward(&self, request: &ProxyRequest) -> Result<Response, ForwardError>;
}

/// Shared HTTP client used by every backend's forwarder.
pub fn build_client() -> Client<HttpConnector, Body> {
    Client::builder(TokioExecutor::new()).build(HttpConnector::new())
}

/// Reverse-proxies requests to a single host.
#[derive(Debug, Clone)]
pub struct HttpForwarder {
    target: Url,
    authority: String,
    client: Client<HttpConnector, Body>,
}

impl HttpForwarder {
    pub fn new(target: Url, client: Client<HttpConnector, Body>) -> Self {
        let host = target.host_str().unwrap_or_default();
        let authority = match target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        Self {
            target,
            authority,
            client,
        }
    }

    /// Map the inbound URI onto the target.
    fn upstream_uri(&self, uri: &Uri) -> Result<Uri, axum::http::Error> {
        let path = join_paths(self.target.path(), uri.path());
        let path_and_query = match merge_query(self.target.query(), uri.query()) {
            Some(query) => format!("{}?{}", path, query),
            None => path,
        };

        Uri::builder()
            .scheme(self.target.scheme())
            .authority(self.authority.as_str())
            .path_and_query(path_and_query)
            .build()
    }

    fn upstream_request(&self, request: &ProxyRequest) -> Result<Request<Body>, ForwardError> {
        let mut upstream = Request::builder()
            .method(request.method.clone())
            .uri(self.upstream_uri(&request.uri)?)
            .body(Body::from(request.body.clone()))?;

        let headers = upstream.headers_mut();
        *headers = request.headers.clone();
        strip_hop_by_hop(headers);

        let client_ip = request.remote_addr.ip().to_string();
        let forwarded_for = match headers.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(prior) => format!("{}, {}", prior, client_ip),
            None => client_ip,
        };
        if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
            headers.insert(X_FORWARDED_FOR, value);
        }

        Ok(upstream)
    }
}

#[async_trait]
impl Forwarder for HttpForwarder {
    async fn forward(&self, request: &ProxyRequest) -> Result<Response, ForwardError> {
        let upstream = self.upstream_request(request)?;
        let response = self.client.request(upstream).await?;

        let (mut parts, body) = response.into_parts();
        strip_hop_by_hop(&mut parts.headers);
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

/// Join two paths with exactly one slash between them.
fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

fn merge_query(target: Option<&str>, request: Option<&str>) -> Option<String> {
    match (
        target.filter(|q| !q.is_empty()),
        request.filter(|q| !q.is_empty()),
    ) {
        (Some(t), Some(r)) => Some(format!("{}&{}", t, r)),
        (Some(q), None) | (None, Some(q)) => Some(q.to_string()),
        (None, None) => None,
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use axum::response::IntoResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Forwarder with a scripted outcome that counts its calls.
    #[derive(Debug)]
    pub struct StubForwarder {
        body: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubForwarder {
        /// Always answers 200 with `body`.
        pub fn ok(body: &'static str) -> Self {
            Self {
                body: Some(body),
                calls: AtomicUsize::new(0),
            }
        }

        /// Always fails as if the connection was refused.
        pub fn failing() -> Self {
            Self {
                body: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Forwarder for StubForwarder {
        async fn forward(&self, _request: &ProxyRequest) -> Result<Response, ForwardError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.body {
                Some(body) => Ok(body.into_response()),
                None => Err(ForwardError::Other("connection refused".to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, Method};

    fn forwarder(target: &str) -> HttpForwarder {
        HttpForwarder::new(Url::parse(target).unwrap(), build_client())
    }

    fn request(uri: &str) -> ProxyRequest {
        ProxyRequest {
            method: Method::GET,
            uri: uri.parse().unwrap(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            remote_addr: "192.0.2.10:40000".parse().unwrap(),
        }
    }

    #[test]
    fn joins_paths_with_single_slash() {
        assert_eq!(join_paths("/", "/a"), "/a");
        assert_eq!(join_paths("/api", "/v1"), "/api/v1");
        assert_eq!(join_paths("/api/", "/v1"), "/api/v1");
        assert_eq!(join_paths("/api", "v1"), "/api/v1");
    }

    #[test]
    fn merges_queries() {
        assert_eq!(merge_query(Some("a=1"), Some("b=2")).as_deref(), Some("a=1&b=2"));
        assert_eq!(merge_query(None, Some("b=2")).as_deref(), Some("b=2"));
        assert_eq!(merge_query(Some("a=1"), Some("")).as_deref(), Some("a=1"));
        assert_eq!(merge_query(None, None), None);
    }

    #[test]
    fn rewrites_uri_onto_target() {
        let fwd = forwarder("http://10.0.0.5:8080/base?key=k");
        let uri = fwd.upstream_uri(&"/users?page=2".parse().unwrap()).unwrap();
        assert_eq!(uri.to_string(), "http://10.0.0.5:8080/base/users?key=k&page=2");
    }

    #[test]
    fn default_port_is_left_implicit() {
        let fwd = forwarder("http://backend.internal");
        let uri = fwd.upstream_uri(&"/".parse().unwrap()).unwrap();
        assert_eq!(uri.to_string(), "http://backend.internal/");
    }

    #[test]
    fn appends_client_to_forwarded_for() {
        let fwd = forwarder("http://10.0.0.5:8080");
        let mut req = request("/");
        req.headers
            .insert(X_FORWARDED_FOR, HeaderValue::from_static("198.51.100.1"));
        req.headers
            .insert("connection", HeaderValue::from_static("close"));

        let upstream = fwd.upstream_request(&req).unwrap();
        assert_eq!(
            upstream.headers().get(X_FORWARDED_FOR).unwrap(),
            "198.51.100.1, 192.0.2.10"
        );
        assert!(upstream.headers().get("connection").is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_forward_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fwd = forwarder(&format!("http://{}", addr));
        let result = fwd.forward(&request("/")).await;
        assert!(matches!(result, Err(ForwardError::Upstream(_))));
    }
}
