//! Errors raised while constructing or validating shared types.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid account id: {0}")]
    InvalidAccount(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid flight status code: {0}")]
    InvalidStatusCode(u8),

    #[error("index set must hold distinct indices below {space}, got {indexes:?}")]
    InvalidIndexSet { indexes: Vec<u8>, space: u8 },

    #[error("invalid protocol parameters: {0}")]
    InvalidParams(String),
}
