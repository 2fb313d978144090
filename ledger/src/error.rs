use surety_admission::AdmissionError;
use surety_oracles::OracleError;
use surety_types::AccountId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("admission: {0}")]
    Admission(#[from] AdmissionError),

    #[error("oracle: {0}")]
    Oracle(#[from] OracleError),

    #[error("ledger is not operational")]
    NotOperational,

    #[error("caller {0} is not the ledger owner")]
    NotOwner(AccountId),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}
