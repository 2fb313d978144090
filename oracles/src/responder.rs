//! Per-oracle response decision: respond or stay silent, and with which status.
//!
//! Pure logic; the event loop that feeds requests in and submits responses
//! lives with the node.

use std::sync::Arc;

use surety_types::{AccountId, IndexSet, Timestamp};

use crate::decision::StatusDecider;
use crate::request::{OracleRequest, StatusResponse};

/// What an oracle does with one observed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Indices not known yet; treated like any request the oracle does not hold.
    NoIndexes,
    /// The dispatched index is not one of ours. The normal case.
    NotMine,
    Respond(StatusResponse),
}

pub struct OracleResponder {
    oracle: AccountId,
    indexes: Option<IndexSet>,
    decider: Arc<dyn StatusDecider>,
}

impl OracleResponder {
    pub fn new(oracle: AccountId, decider: Arc<dyn StatusDecider>) -> Self {
        Self {
            oracle,
            indexes: None,
            decider,
        }
    }

    pub fn with_indexes(mut self, indexes: IndexSet) -> Self {
        self.indexes = Some(indexes);
        self
    }

    /// Record the oracle's indices. They never change once set; later calls
    /// return false and keep the first set.
    pub fn set_indexes(&mut self, indexes: IndexSet) -> bool {
        if self.indexes.is_some() {
            return false;
        }
        self.indexes = Some(indexes);
        true
    }

    pub fn decide(&self, request: &OracleRequest, now: Timestamp) -> Decision {
        let Some(indexes) = &self.indexes else {
            return Decision::NoIndexes;
        };
        if !indexes.contains(request.index) {
            return Decision::NotMine;
        }
        Decision::Respond(StatusResponse {
            index: request.index,
            key: request.key.clone(),
            status: self.decider.decide(request, now),
            responder: self.oracle,
        })
    }

    pub fn oracle(&self) -> AccountId {
        self.oracle
    }

    pub fn indexes(&self) -> Option<&IndexSet> {
        self.indexes.as_ref()
    }

    pub fn decider_name(&self) -> &str {
        self.decider.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::FixedStatus;
    use surety_types::{FlightKey, FlightStatus};

    fn request(index: u8) -> OracleRequest {
        OracleRequest {
            index,
            key: FlightKey::new(AccountId::from_seed(1), "ONE0001", Timestamp::new(500)),
        }
    }

    fn responder(seed: u8, indexes: Vec<u8>) -> OracleResponder {
        OracleResponder::new(
            AccountId::from_seed(seed),
            Arc::new(FixedStatus(FlightStatus::LateAirline)),
        )
        .with_indexes(IndexSet::new(indexes, 10).unwrap())
    }

    #[test]
    fn only_holder_of_dispatched_index_responds() {
        let holder = responder(1, vec![1, 4, 7]);
        let other = responder(2, vec![2, 5, 8]);

        match holder.decide(&request(4), Timestamp::new(0)) {
            Decision::Respond(r) => {
                assert_eq!(r.index, 4);
                assert_eq!(r.status, FlightStatus::LateAirline);
                assert_eq!(r.responder, AccountId::from_seed(1));
                assert_eq!(r.key, request(4).key);
            }
            other => panic!("expected a response, got {other:?}"),
        }
        assert_eq!(other.decide(&request(4), Timestamp::new(0)), Decision::NotMine);
    }

    #[test]
    fn without_indexes_nothing_is_mine() {
        let r = OracleResponder::new(
            AccountId::from_seed(3),
            Arc::new(FixedStatus(FlightStatus::OnTime)),
        );
        for index in 0..10 {
            assert_eq!(r.decide(&request(index), Timestamp::new(0)), Decision::NoIndexes);
        }
    }

    #[test]
    fn indexes_are_set_once() {
        let mut r = OracleResponder::new(
            AccountId::from_seed(3),
            Arc::new(FixedStatus(FlightStatus::OnTime)),
        );
        assert!(r.set_indexes(IndexSet::new(vec![0, 1, 2], 10).unwrap()));
        assert!(!r.set_indexes(IndexSet::new(vec![7, 8, 9], 10).unwrap()));
        assert_eq!(r.indexes().unwrap().as_slice(), &[0, 1, 2]);
    }
}
