use surety_types::{AccountId, Amount, FlightKey, ShardIndex, TypesError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("insufficient stake: needed {needed}, provided {provided}")]
    InsufficientStake { needed: Amount, provided: Amount },

    #[error("oracle {0} is not registered")]
    NotRegistered(AccountId),

    #[error("oracle {oracle} does not hold index {index}")]
    IndexMismatch { oracle: AccountId, index: ShardIndex },

    #[error("no status request was dispatched for index {index} and flight {key}")]
    RequestNotOpen { index: ShardIndex, key: FlightKey },

    #[error("entropy source failed: {0}")]
    Entropy(String),

    #[error("invalid parameters: {0}")]
    Params(#[from] TypesError),
}
