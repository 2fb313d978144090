//! Flight surety node: drives the ledger from the operator's side.
//!
//! The node:
//! - Registers its oracles and runs one agent per oracle, answering the status
//!   requests dispatched to the oracle's indices
//! - Pays the ante for newly approved airlines
//! - Registers catalog flights for airlines that can participate
//! - Serves the REST façade and Prometheus metrics

pub mod automation;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod oracle_agent;
pub mod oracle_service;
pub mod shutdown;

pub use automation::{AnteSender, FlightScheduler};
pub use config::{AirlineConfig, DecisionConfig, NodeConfig, OracleConfig};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::SuretyNode;
pub use oracle_agent::{AgentAction, OracleAgent};
pub use oracle_service::OracleService;
pub use shutdown::{ShutdownController, StopReason, StopSignal};
