use std::time::Duration;

use echomesh_common::{DispatchOutcome, MeshError, Result};
use echomesh_metrics::MetricsSnapshot;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Request, StatusCode};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one echomesh server.
///
/// `hit` returns the call's [`DispatchOutcome`] as the server reported it;
/// transport-level problems (connection refused, malformed response) come
/// back as errors instead.
#[derive(Debug, Clone)]
pub struct MeshClient {
    base_url: String,
    request_timeout: Duration,
}

impl MeshClient {
    /// Creates a client for the given base URL, which must include the
    /// `http://` or `https://` prefix.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(MeshError::InvalidRequest(format!(
                "server URL '{base_url}' must start with http:// or https://"
            )));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Performs one dispatch with a server-generated correlation id.
    pub async fn hit(&self) -> Result<DispatchOutcome> {
        self.hit_inner(None).await
    }

    /// Performs one dispatch with a caller-supplied correlation id.
    pub async fn hit_with_correlation(&self, correlation: &str) -> Result<DispatchOutcome> {
        self.hit_inner(Some(correlation)).await
    }

    async fn hit_inner(&self, correlation: Option<&str>) -> Result<DispatchOutcome> {
        let (status, body) = self.get("/", correlation).await?;
        let body = String::from_utf8_lossy(&body).into_owned();

        match status {
            StatusCode::OK => Ok(DispatchOutcome::Success { reply: body }),
            StatusCode::GATEWAY_TIMEOUT => Ok(DispatchOutcome::Timeout),
            StatusCode::SERVICE_UNAVAILABLE => Ok(DispatchOutcome::NoAvailableTarget),
            StatusCode::BAD_GATEWAY => Ok(DispatchOutcome::RoutingFailure { detail: body }),
            other => Err(MeshError::Transport(format!(
                "unexpected status {other}: {body}"
            ))),
        }
    }

    /// Fetches the server's metrics snapshot.
    pub async fn metrics(&self) -> Result<MetricsSnapshot> {
        let (status, body) = self.get("/metrics", None).await?;
        if status != StatusCode::OK {
            return Err(MeshError::Transport(format!(
                "metrics request returned {status}"
            )));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Checks the liveness endpoint.
    pub async fn health(&self) -> Result<bool> {
        let (status, _body) = self.get("/__health", None).await?;
        Ok(status == StatusCode::OK)
    }

    async fn get(&self, path: &str, correlation: Option<&str>) -> Result<(StatusCode, Bytes)> {
        let url = format!("{}{path}", self.base_url);

        let mut builder = Request::builder().method("GET").uri(&url);
        if let Some(correlation) = correlation {
            builder = builder.header("x-correlation-id", correlation);
        }
        let request = builder
            .body(Full::new(Bytes::new()))
            .map_err(|e| MeshError::Transport(format!("failed to build request: {e}")))?;

        // A fresh connection per request keeps concurrent calls independent
        let client = Client::builder(TokioExecutor::new()).build_http();

        let response = tokio::time::timeout(self.request_timeout, client.request(request))
            .await
            .map_err(|_| MeshError::Timeout(self.request_timeout.as_millis() as u64))?
            .map_err(|e| MeshError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| MeshError::Transport(format!("failed to read response: {e}")))?
            .to_bytes();

        Ok((status, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_must_carry_a_scheme() {
        assert!(MeshClient::new("127.0.0.1:8080").is_err());
        assert!(MeshClient::new("http://127.0.0.1:8080").is_ok());
        assert!(MeshClient::new("https://example.com:8080").is_ok());
    }

    #[test]
    fn test_trailing_slash_is_normalized() {
        let client = MeshClient::new("http://127.0.0.1:8080/").unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn test_connection_failure_is_a_transport_error() {
        // Nothing listens on this port in the test environment
        let client = MeshClient::new("http://127.0.0.1:1")
            .unwrap()
            .with_request_timeout(Duration::from_secs(2));
        let err = client.hit().await.unwrap_err();
        assert!(matches!(
            err,
            MeshError::Transport(_) | MeshError::Timeout(_)
        ));
    }
}
