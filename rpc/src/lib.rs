//! REST façade for the flight surety node.
//!
//! Provides endpoints for:
//! - Airline registration requests (with flight schedule assignment)
//! - Listing flights registered from the schedule catalog
//! - Flight status requests
//! - Prometheus metrics

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::{RpcServer, RpcState, SharedCatalog};
