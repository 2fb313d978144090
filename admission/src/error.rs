use surety_types::{AccountId, Amount};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    #[error("airline {0} is not registered")]
    NotRegistered(AccountId),

    #[error("airline {0} has not paid the ante")]
    Unfunded(AccountId),

    #[error("airline {0} cannot vote for itself")]
    SelfVote(AccountId),

    #[error("the zero account cannot be registered")]
    InvalidCandidate,

    #[error("insufficient ante: needed {needed}, provided {provided}")]
    InsufficientAnte { needed: Amount, provided: Amount },

    #[error("airline {0} is not a funded, registered participant")]
    NotParticipating(AccountId),

    #[error("flight {0} is already registered")]
    FlightAlreadyRegistered(String),
}
