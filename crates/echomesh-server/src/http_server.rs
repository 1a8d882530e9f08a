//! HTTP server for the dispatch boundary.
//!
//! Built on axum: `GET /` dispatches into the cluster, `GET /metrics` serves
//! the metrics snapshot, `GET /__health` answers liveness probes.

use std::net::SocketAddr;

use axum::routing::get;
use echomesh_common::{MeshError, Result};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::handler::{self, AppState};

/// HTTP server wrapping the boundary handler.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Binds to the given address and serves until shutdown.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| MeshError::Transport(format!("failed to bind to {addr}: {e}")))?;

        info!(
            "echomesh HTTP server listening on {}",
            listener
                .local_addr()
                .map_err(|e| MeshError::Transport(format!("failed to get local addr: {e}")))?
        );

        self.serve(listener).await
    }

    /// Serves on an already bound listener (the test seam for port 0).
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let app = self.into_router();
        axum::serve(listener, app)
            .await
            .map_err(|e| MeshError::Transport(format!("server error: {e}")))?;
        Ok(())
    }

    fn into_router(self) -> axum::Router {
        axum::Router::new()
            .route("/", get(handler::handle_hit))
            .route("/metrics", get(handler::handle_metrics))
            .route("/__health", get(handler::health_check))
            .layer(CorsLayer::permissive())
            .with_state(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use echomesh_cluster::{Forwarder, RoutingPool};
    use echomesh_metrics::MetricsRegistry;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_server_binds_an_ephemeral_port() {
        let pool = Arc::new(RoutingPool::new());
        let metrics = Arc::new(MetricsRegistry::new());
        let state = AppState {
            forwarder: Forwarder::spawn(pool, Arc::clone(&metrics)),
            metrics,
            ask_deadline: Duration::from_secs(5),
        };

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        assert_ne!(addr.port(), 0);

        // The server future is dropped at the end of the test; binding and
        // router construction are what is under test here.
        let server = HttpServer::new(state);
        let serve = tokio::spawn(server.serve(listener));
        serve.abort();
    }
}
