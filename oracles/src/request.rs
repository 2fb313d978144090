//! Status requests and oracle responses.

use serde::{Deserialize, Serialize};
use std::fmt;
use surety_types::{AccountId, FlightKey, FlightStatus, ShardIndex, Timestamp};

/// Identifies one dispatched request instance. Monotonic per dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req#{}", self.0)
    }
}

/// What oracles see: the dispatch index and the flight being asked about.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OracleRequest {
    pub index: ShardIndex,
    pub key: FlightKey,
}

/// A dispatched request instance as tracked by the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRequest {
    pub id: RequestId,
    pub index: ShardIndex,
    pub key: FlightKey,
    pub requester: AccountId,
    pub requested_at: Timestamp,
}

impl StatusRequest {
    pub fn oracle_request(&self) -> OracleRequest {
        OracleRequest {
            index: self.index,
            key: self.key.clone(),
        }
    }
}

/// One oracle's answer to a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub index: ShardIndex,
    pub key: FlightKey,
    pub status: FlightStatus,
    pub responder: AccountId,
}
