//! Oracle-based fact resolution.
//!
//! Oracles stake to register and receive a small, fixed set of shard indices.
//! A status request draws one index; only oracles holding it may answer, and
//! the request finalizes once `min_responses` of them agree on a status.
//!
//! The randomness behind index assignment and dispatch is pluggable through
//! [`EntropySource`]; which status an oracle reports is pluggable through
//! [`StatusDecider`].

pub mod aggregator;
pub mod decision;
pub mod dispatcher;
pub mod entropy;
pub mod error;
pub mod registry;
pub mod request;
pub mod responder;

pub use aggregator::{RequestState, ResponseAggregator, ResponseOutcome};
pub use decision::{ClockDerived, FixedStatus, StatusDecider};
pub use dispatcher::Dispatcher;
pub use entropy::{EntropySource, OsEntropy};
pub use error::OracleError;
pub use registry::{OracleRecord, OracleRegistry};
pub use request::{OracleRequest, RequestId, StatusRequest, StatusResponse};
pub use responder::{Decision, OracleResponder};
