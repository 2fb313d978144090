//! RPC error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use surety_ledger::LedgerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("metrics are disabled")]
    MetricsDisabled,

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RpcError::Ledger(LedgerError::NotOwner(_)) => StatusCode::FORBIDDEN,
            RpcError::Ledger(LedgerError::NotOperational | LedgerError::Unavailable(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            RpcError::Ledger(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RpcError::MetricsDisabled => StatusCode::NOT_FOUND,
            RpcError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_admission::AdmissionError;
    use surety_types::AccountId;

    #[test]
    fn ledger_errors_map_to_client_or_availability_codes() {
        let unfunded = RpcError::from(LedgerError::Admission(AdmissionError::Unfunded(
            AccountId::from_seed(1),
        )));
        assert_eq!(unfunded.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            RpcError::from(LedgerError::NotOperational).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RpcError::InvalidRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }
}
