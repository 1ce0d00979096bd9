//! Local HTTP listener that receives the broker's login redirect.

pub mod pages;
pub mod routes;
pub mod state;

use axum::Router;
use kitemcp_core::Session;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

/// Build the callback router over the shared session.
pub fn build_router(session: Arc<Session>) -> Router {
    Router::new()
        .merge(routes::callback_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state::CallbackState::new(session))
}

/// Callback listener with its socket already bound.
///
/// Binding happens before the handshake so the redirect target is live by the
/// time the operator finishes logging in.
pub struct CallbackServer {
    listener: TcpListener,
    session: Arc<Session>,
}

impl CallbackServer {
    pub async fn bind(addr: SocketAddr, session: Arc<Session>) -> Result<Self, CallbackServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| CallbackServerError::Bind(addr, e.to_string()))?;
        Ok(Self { listener, session })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, CallbackServerError> {
        self.listener
            .local_addr()
            .map_err(|e| CallbackServerError::Serve(e.to_string()))
    }

    /// Serve until `cancel` fires, then drain in-flight requests.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), CallbackServerError> {
        let addr = self.local_addr()?;
        let app = build_router(self.session);

        tracing::info!(%addr, "Callback server listening");

        axum::serve(self.listener, app)
            .with_graceful_shutdown(cancel.cancelled_owned())
            .await
            .map_err(|e| CallbackServerError::Serve(e.to_string()))?;

        tracing::info!("Callback server stopped");
        Ok(())
    }
}

/// Callback listener errors.
#[derive(Debug, thiserror::Error)]
pub enum CallbackServerError {
    #[error("failed to bind {0}: {1}")]
    Bind(SocketAddr, String),
    #[error("server error: {0}")]
    Serve(String),
}
