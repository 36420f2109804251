pub mod http;

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use http::HttpTransport;

/// What came back from the wire, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The network capability the tracker drives: one JSON POST per call.
///
/// Implementations return `Err` only when no response was obtained at all;
/// any HTTP status, success or not, comes back as a `TransportResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: String) -> Result<TransportResponse>;
}

#[async_trait]
impl<X: Transport + ?Sized> Transport for Arc<X> {
    async fn post_json(&self, url: &str, body: String) -> Result<TransportResponse> {
        (**self).post_json(url, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_any_2xx() {
        assert!(TransportResponse::new(200, "").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(199, "").is_success());
        assert!(!TransportResponse::new(302, "").is_success());
        assert!(!TransportResponse::new(500, "server down").is_success());
    }
}
