//! The ledger boundary of the flight surety network.
//!
//! Admission, oracle registration, status dispatch and response aggregation all
//! sit behind [`LedgerFacade`]: synchronous calls that either apply atomically
//! or fail with a [`LedgerError`], and an ordered event feed that every
//! subscriber observes identically.
//!
//! [`LocalLedger`] is the in-process implementation. Calls serialize on one
//! lock, so concurrent votes for the same candidate never double-count.

pub mod error;
pub mod event;
pub mod facade;
pub mod local;
pub mod subscription;

pub use error::LedgerError;
pub use event::{LedgerEvent, SequencedEvent};
pub use facade::LedgerFacade;
pub use local::LocalLedger;
pub use subscription::{EventSubscription, StartFrom};
