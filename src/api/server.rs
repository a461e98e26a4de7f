//! HTTP server lifecycle: bind, spawn in a background task, return a handle
//! carrying the bound address and a shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;

use super::router::build_router;
use super::types::ApiContext;

/// Handle to a running API server.
pub struct ApiServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ApiServer {
    /// Signal graceful shutdown. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("API server shutdown signal sent");
        }
    }
}

/// Bind the listener, spawn the server task, and return immediately.
///
/// Binding to port 0 yields an ephemeral port; the handle reports the
/// actual address, which is what tests use.
pub async fn start_server(ctx: ApiContext, addr: SocketAddr) -> Result<ApiServer, std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;

    let app = build_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("API server received shutdown signal");
        };

        tracing::info!(%addr, "API server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("API server error: {e}");
        }

        tracing::info!("API server stopped");
    });

    Ok(ApiServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::types::{ApiContext, DbHandle};
    use crate::rag::embedding::StaticEmbedder;
    use crate::safety::KeywordClassifier;

    #[tokio::test]
    async fn server_starts_and_shuts_down() {
        let tmp = tempfile::tempdir().unwrap();
        let db = DbHandle::new(tmp.path().join("test.db"));
        db.open().unwrap();

        let ctx = ApiContext {
            db,
            embedder: Arc::new(StaticEmbedder(vec![0.0])),
            classifier: Arc::new(KeywordClassifier),
            pepper: None,
        };

        let mut server = start_server(ctx, "127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert_ne!(server.addr.port(), 0);
        server.shutdown();
        // Second call is a no-op.
        server.shutdown();
    }
}
