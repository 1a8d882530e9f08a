//! # echomesh Server
//!
//! The HTTP boundary of echomesh. `GET /` performs one dispatch into the
//! cluster: the handler opens a trace span, submits the request to the
//! forwarding actor, and races the pending reply against the configured
//! deadline. `GET /metrics` serves the metrics snapshot and `GET /__health`
//! answers liveness probes.

pub mod handler;
pub mod http_server;

pub use handler::AppState;
pub use http_server::HttpServer;

use std::sync::Arc;

use echomesh_cluster::ClusterHandle;
use echomesh_common::{Result, ServeConfig};
use echomesh_metrics::MetricsRegistry;

/// Starts the cluster and serves the HTTP boundary until shutdown.
pub async fn serve(config: ServeConfig) -> Result<()> {
    let metrics = Arc::new(MetricsRegistry::new());
    let cluster = ClusterHandle::start(config.pool_size, Arc::clone(&metrics));

    let state = AppState {
        forwarder: cluster.forwarder(),
        metrics,
        ask_deadline: config.ask_deadline,
    };

    // `cluster` stays in scope so the membership channel outlives the server
    let server = HttpServer::new(state);
    server.run(config.listen_addr).await
}
