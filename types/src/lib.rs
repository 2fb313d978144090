//! Fundamental types for the flight surety coordination layer.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! account identities, amounts, timestamps, flight keys and status codes, shard index
//! sets, and the protocol parameters.

pub mod address;
pub mod amount;
pub mod error;
pub mod flight;
pub mod index;
pub mod params;
pub mod time;

pub use address::AccountId;
pub use amount::Amount;
pub use error::TypesError;
pub use flight::{FlightKey, FlightStatus};
pub use index::{IndexSet, ShardIndex};
pub use params::ProtocolParams;
pub use time::{Clock, SystemClock, Timestamp};
