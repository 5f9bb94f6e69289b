//! Backend reachability probe.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time;
use url::Url;

/// Answers whether a backend is reachable right now.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn is_reachable(&self, url: &Url) -> bool;
}

/// Probe that opens (and immediately drops) a TCP connection.
#[derive(Debug, Clone)]
pub struct TcpProber {
    timeout: Duration,
}

impl TcpProber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn is_reachable(&self, url: &Url) -> bool {
        let (Some(host), Some(port)) = (url.host_str(), url.port_or_known_default()) else {
            tracing::warn!(url = %url, "Site unreachable: no host or port");
            return false;
        };
        // IPv6 literals come back bracketed from host_str.
        let host = host.trim_start_matches('[').trim_end_matches(']');

        match time::timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => {
                drop(stream);
                true
            }
            Ok(Err(e)) => {
                tracing::warn!(host = %host, port, error = %e, "Site unreachable");
                false
            }
            Err(_) => {
                tracing::warn!(host = %host, port, timeout = ?self.timeout, "Site unreachable: timeout");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn listening_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let url = Url::parse(&format!("http://{}", addr)).unwrap();

        let prober = TcpProber::new(Duration::from_secs(2));
        assert!(prober.is_reachable(&url).await);
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{}", addr)).unwrap();

        let prober = TcpProber::new(Duration::from_secs(2));
        assert!(!prober.is_reachable(&url).await);
    }
}
