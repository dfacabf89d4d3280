//! AlertMesh relay
//!
//! Local node for an emergency chat room: keeps an in-memory log of
//! message lines and serves it over HTTP to the AlertMesh client.

pub mod config;
pub mod health;
pub mod http;
pub mod log_line;
pub mod state;

pub use config::{load_config, RelayConfig};
pub use http::{build_router, AppState};

use tokio::net::TcpListener;

/// Serves the relay on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
