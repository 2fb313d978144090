//! Axum-based REST server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use prometheus::Registry;
use surety_admission::FlightCatalog;
use surety_ledger::LedgerFacade;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

use crate::error::RpcError;
use crate::handlers;

/// Flight schedule catalog shared between the REST façade and the node's
/// flight scheduler.
pub type SharedCatalog = Arc<Mutex<FlightCatalog>>;

/// Shared state for the handlers.
pub struct RpcState {
    pub ledger: Arc<dyn LedgerFacade>,
    pub catalog: SharedCatalog,
    /// Served at `/metrics` when present.
    pub metrics: Option<Registry>,
}

pub struct RpcServer {
    pub port: u16,
    state: Arc<RpcState>,
}

impl RpcServer {
    pub fn with_state(port: u16, state: Arc<RpcState>) -> Self {
        Self { port, state }
    }

    /// The full route table. Any origin may call the façade.
    pub fn router(&self) -> Router {
        router(Arc::clone(&self.state))
    }

    /// Bind and serve until the task is dropped.
    pub async fn start(&self) -> Result<(), RpcError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        tracing::info!(%addr, "REST server listening");
        axum::serve(listener, self.router())
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}

pub fn router(state: Arc<RpcState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/registerAirline", post(handlers::register_airline))
        .route("/getFlights", get(handlers::get_flights))
        .route("/fetchFlightStatus", post(handlers::fetch_flight_status))
        .route("/metrics", get(handlers::metrics))
        .layer(cors)
        .with_state(state)
}
