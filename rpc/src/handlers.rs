//! REST request handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use surety_types::{AccountId, FlightKey, Timestamp};

use crate::error::RpcError;
use crate::server::RpcState;

fn parse_account(field: &str, value: &str) -> Result<AccountId, RpcError> {
    value
        .parse()
        .map_err(|e| RpcError::InvalidRequest(format!("{field}: {e}")))
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

// ── Airlines ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterAirlineRequest {
    pub registrar: String,
    pub airline: String,
}

/// Assign a flight schedule to the airline (first come, first served) and
/// forward the registration to the ledger on behalf of the registrar.
pub async fn register_airline(
    State(state): State<Arc<RpcState>>,
    Json(req): Json<RegisterAirlineRequest>,
) -> Result<Json<MessageResponse>, RpcError> {
    let registrar = parse_account("registrar", &req.registrar)?;
    let airline = parse_account("airline", &req.airline)?;
    tracing::info!(%registrar, %airline, "airline registration request");

    if let Some(schedule) = state.catalog.lock().await.assign(airline) {
        tracing::debug!(%airline, name = %schedule.airline_name, flights = schedule.flights.len(), "schedule attached");
    }
    let outcome = state.ledger.register_airline(registrar, airline)?;
    tracing::debug!(%airline, ?outcome, "registration forwarded");
    Ok(Json(MessageResponse {
        message: format!("Registration sent for airline {airline}"),
    }))
}

// ── Flights ──────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct FlightSummary {
    pub airline: AccountId,
    pub flight: String,
    pub timestamp: Timestamp,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FlightsResponse {
    pub flights: Vec<FlightSummary>,
}

pub async fn get_flights(State(state): State<Arc<RpcState>>) -> Json<FlightsResponse> {
    let catalog = state.catalog.lock().await;
    let flights = catalog
        .registered_flights()
        .iter()
        .map(|key| FlightSummary {
            airline: key.airline,
            flight: key.flight.clone(),
            timestamp: key.timestamp,
        })
        .collect();
    Json(FlightsResponse { flights })
}

#[derive(Deserialize)]
pub struct FetchFlightStatusRequest {
    pub requester: String,
    pub airline: String,
    pub flight: String,
    pub timestamp: u64,
}

pub async fn fetch_flight_status(
    State(state): State<Arc<RpcState>>,
    Json(req): Json<FetchFlightStatusRequest>,
) -> Result<Json<MessageResponse>, RpcError> {
    let requester = parse_account("requester", &req.requester)?;
    let airline = parse_account("airline", &req.airline)?;
    if req.flight.trim().is_empty() {
        return Err(RpcError::InvalidRequest("flight: must not be empty".into()));
    }
    let key = FlightKey::new(airline, req.flight, Timestamp::new(req.timestamp));
    let request = state.ledger.fetch_flight_status(requester, key.clone())?;
    Ok(Json(MessageResponse {
        message: format!("Status request {request} sent for flight {key}"),
    }))
}

// ── Metrics ──────────────────────────────────────────────────────────────

pub async fn metrics(State(state): State<Arc<RpcState>>) -> Result<impl IntoResponse, RpcError> {
    let registry = state.metrics.as_ref().ok_or(RpcError::MetricsDisabled)?;
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&registry.gather(), &mut buffer)
        .map_err(|e| RpcError::Server(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer))
}
