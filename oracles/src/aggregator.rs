//! Response aggregator: tallies oracle responses per status bucket and
//! finalizes each request instance at most once.
//!
//! Responses carry (index, airline, flight, timestamp, status) but no request
//! id, so a response is credited to the oldest still-open instance with the
//! same index and flight that the responder has not answered yet.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use surety_types::{AccountId, FlightKey, FlightStatus, ShardIndex};

use crate::error::OracleError;
use crate::registry::OracleRegistry;
use crate::request::{RequestId, StatusRequest, StatusResponse};

/// Tally state for one request instance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RequestState {
    pub request: StatusRequest,
    /// Responders per reported status.
    pub buckets: BTreeMap<FlightStatus, BTreeSet<AccountId>>,
    pub finalized: Option<FlightStatus>,
}

impl RequestState {
    fn new(request: StatusRequest) -> Self {
        Self {
            request,
            buckets: BTreeMap::new(),
            finalized: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.finalized.is_none()
    }

    pub fn has_responded(&self, oracle: &AccountId) -> bool {
        self.buckets.values().any(|voters| voters.contains(oracle))
    }

    pub fn response_count(&self) -> usize {
        self.buckets.values().map(BTreeSet::len).sum()
    }
}

/// What a submitted response did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseOutcome {
    /// Counted toward its bucket; quorum not yet reached.
    Recorded { request: RequestId, count: u32 },
    /// This response completed the quorum.
    Finalized { request: RequestId, status: FlightStatus },
    /// The responder already answered every open instance; no effect.
    Duplicate { request: RequestId },
    /// Every matching instance is already finalized; accepted with no effect.
    AfterFinalization { request: RequestId },
}

impl ResponseOutcome {
    /// Whether the response changed any tally.
    pub fn counted(&self) -> bool {
        matches!(self, Self::Recorded { .. } | Self::Finalized { .. })
    }
}

/// Tallies responses per dispatched instance.
///
/// Finalized instances are kept for the life of the aggregator so a late
/// response can still be told apart from one for a request that was never
/// dispatched (`AfterFinalization` vs `RequestNotOpen`). Memory grows with
/// the number of dispatches.
pub struct ResponseAggregator {
    min_responses: u32,
    requests: BTreeMap<RequestId, RequestState>,
    by_key: HashMap<(ShardIndex, FlightKey), Vec<RequestId>>,
}

impl ResponseAggregator {
    pub fn new(min_responses: u32) -> Self {
        Self {
            min_responses: min_responses.max(1),
            requests: BTreeMap::new(),
            by_key: HashMap::new(),
        }
    }

    /// Start tracking a dispatched request.
    pub fn open(&mut self, request: StatusRequest) {
        let id = request.id;
        self.by_key
            .entry((request.index, request.key.clone()))
            .or_default()
            .push(id);
        self.requests.insert(id, RequestState::new(request));
    }

    /// Validate and tally one response.
    ///
    /// Rejects responders that are not registered or do not hold the index, and
    /// responses for which no request was ever dispatched.
    pub fn submit(
        &mut self,
        response: &StatusResponse,
        registry: &OracleRegistry,
    ) -> Result<ResponseOutcome, OracleError> {
        let indexes = registry.get_indexes(&response.responder)?;
        if !indexes.contains(response.index) {
            return Err(OracleError::IndexMismatch {
                oracle: response.responder,
                index: response.index,
            });
        }

        let ids = self
            .by_key
            .get(&(response.index, response.key.clone()))
            .ok_or_else(|| OracleError::RequestNotOpen {
                index: response.index,
                key: response.key.clone(),
            })?;

        let target = ids.iter().copied().find(|id| {
            self.requests
                .get(id)
                .is_some_and(|s| s.is_open() && !s.has_responded(&response.responder))
        });

        let Some(id) = target else {
            let open_answered = ids
                .iter()
                .rev()
                .copied()
                .find(|id| self.requests.get(id).is_some_and(RequestState::is_open));
            return Ok(match open_answered {
                Some(request) => ResponseOutcome::Duplicate { request },
                None => ResponseOutcome::AfterFinalization {
                    request: ids.last().copied().unwrap_or(RequestId(0)),
                },
            });
        };

        let min_responses = self.min_responses;
        let Some(state) = self.requests.get_mut(&id) else {
            return Err(OracleError::RequestNotOpen {
                index: response.index,
                key: response.key.clone(),
            });
        };
        let bucket = state.buckets.entry(response.status).or_default();
        bucket.insert(response.responder);
        let count = bucket.len() as u32;
        if count >= min_responses {
            state.finalized = Some(response.status);
            tracing::info!(request = %id, status = %response.status, "status request finalized");
            Ok(ResponseOutcome::Finalized {
                request: id,
                status: response.status,
            })
        } else {
            Ok(ResponseOutcome::Recorded { request: id, count })
        }
    }

    pub fn state(&self, id: RequestId) -> Option<&RequestState> {
        self.requests.get(&id)
    }

    /// Requests still waiting for a quorum, oldest first.
    pub fn open_requests(&self) -> Vec<&StatusRequest> {
        self.requests
            .values()
            .filter(|s| s.is_open())
            .map(|s| &s.request)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::OsEntropy;
    use std::sync::Arc;
    use surety_types::{ProtocolParams, Timestamp};

    fn key() -> FlightKey {
        FlightKey::new(AccountId::from_seed(1), "ONE0001", Timestamp::new(1_000))
    }

    /// Register 40 oracles and return the registry, the busiest index and its holders.
    fn network() -> (OracleRegistry, ShardIndex, Vec<AccountId>) {
        let params = ProtocolParams::default();
        let mut reg = OracleRegistry::new(params.clone(), Arc::new(OsEntropy)).unwrap();
        for seed in 10..50 {
            reg.register(AccountId::from_seed(seed), params.oracle_stake, Timestamp::new(0))
                .unwrap();
        }
        let index = (0..params.index_space)
            .max_by_key(|i| reg.holders_of(*i).len())
            .unwrap();
        let holders = reg.holders_of(index);
        assert!(holders.len() >= 4);
        (reg, index, holders)
    }

    fn request(id: u64, index: ShardIndex) -> StatusRequest {
        StatusRequest {
            id: RequestId(id),
            index,
            key: key(),
            requester: AccountId::from_seed(99),
            requested_at: Timestamp::new(0),
        }
    }

    fn response(responder: AccountId, index: ShardIndex, status: FlightStatus) -> StatusResponse {
        StatusResponse {
            index,
            key: key(),
            status,
            responder,
        }
    }

    #[test]
    fn third_matching_response_finalizes_and_later_ones_are_ignored() {
        let (reg, index, holders) = network();
        let mut agg = ResponseAggregator::new(3);
        agg.open(request(0, index));

        let late = FlightStatus::LateAirline;
        for (n, oracle) in holders[..2].iter().enumerate() {
            assert_eq!(
                agg.submit(&response(*oracle, index, late), &reg).unwrap(),
                ResponseOutcome::Recorded {
                    request: RequestId(0),
                    count: n as u32 + 1
                }
            );
        }
        assert_eq!(
            agg.submit(&response(holders[2], index, late), &reg).unwrap(),
            ResponseOutcome::Finalized {
                request: RequestId(0),
                status: late
            }
        );
        assert_eq!(
            agg.submit(&response(holders[3], index, FlightStatus::LateTechnical), &reg)
                .unwrap(),
            ResponseOutcome::AfterFinalization {
                request: RequestId(0)
            }
        );
        let state = agg.state(RequestId(0)).unwrap();
        assert_eq!(state.finalized, Some(late));
        assert_eq!(state.response_count(), 3);
        assert!(agg.open_requests().is_empty());
    }

    #[test]
    fn index_mismatch_is_rejected() {
        let (reg, index, _) = network();
        let outsider = (10..50)
            .map(AccountId::from_seed)
            .find(|o| !reg.get_indexes(o).unwrap().contains(index))
            .unwrap();
        let mut agg = ResponseAggregator::new(3);
        agg.open(request(0, index));
        let err = agg
            .submit(&response(outsider, index, FlightStatus::OnTime), &reg)
            .unwrap_err();
        assert_eq!(
            err,
            OracleError::IndexMismatch {
                oracle: outsider,
                index
            }
        );
        assert_eq!(agg.state(RequestId(0)).unwrap().response_count(), 0);
    }

    #[test]
    fn unregistered_responder_is_rejected() {
        let (reg, index, _) = network();
        let mut agg = ResponseAggregator::new(3);
        agg.open(request(0, index));
        let stranger = AccountId::from_seed(200);
        let err = agg
            .submit(&response(stranger, index, FlightStatus::OnTime), &reg)
            .unwrap_err();
        assert_eq!(err, OracleError::NotRegistered(stranger));
    }

    #[test]
    fn response_without_request_is_rejected() {
        let (reg, index, holders) = network();
        let mut agg = ResponseAggregator::new(3);
        let err = agg
            .submit(&response(holders[0], index, FlightStatus::OnTime), &reg)
            .unwrap_err();
        assert!(matches!(err, OracleError::RequestNotOpen { .. }));
    }

    #[test]
    fn same_responder_counts_once() {
        let (reg, index, holders) = network();
        let oracle = holders[0];
        let mut agg = ResponseAggregator::new(2);
        agg.open(request(0, index));
        assert!(agg
            .submit(&response(oracle, index, FlightStatus::OnTime), &reg)
            .unwrap()
            .counted());
        assert_eq!(
            agg.submit(&response(oracle, index, FlightStatus::OnTime), &reg)
                .unwrap(),
            ResponseOutcome::Duplicate {
                request: RequestId(0)
            }
        );
        let flip = agg
            .submit(&response(oracle, index, FlightStatus::LateOther), &reg)
            .unwrap();
        assert!(!flip.counted());
        let state = agg.state(RequestId(0)).unwrap();
        assert_eq!(state.response_count(), 1);
        assert!(state.is_open());
    }

    #[test]
    fn split_statuses_do_not_finalize() {
        let (reg, index, holders) = network();
        let mut agg = ResponseAggregator::new(3);
        agg.open(request(0, index));
        let statuses = [
            FlightStatus::OnTime,
            FlightStatus::LateAirline,
            FlightStatus::OnTime,
            FlightStatus::LateWeather,
        ];
        for (oracle, status) in holders.iter().zip(statuses) {
            let outcome = agg.submit(&response(*oracle, index, status), &reg).unwrap();
            assert!(matches!(outcome, ResponseOutcome::Recorded { .. }));
        }
        assert!(agg.state(RequestId(0)).unwrap().is_open());
        assert_eq!(agg.open_requests().len(), 1);
    }

    #[test]
    fn repeated_dispatch_finalizes_independently() {
        let (reg, index, holders) = network();
        let mut agg = ResponseAggregator::new(2);
        agg.open(request(0, index));
        agg.open(request(1, index));

        for oracle in &holders[..2] {
            agg.submit(&response(*oracle, index, FlightStatus::OnTime), &reg)
                .unwrap();
        }
        assert_eq!(
            agg.state(RequestId(0)).unwrap().finalized,
            Some(FlightStatus::OnTime)
        );
        assert!(agg.state(RequestId(1)).unwrap().is_open());

        for oracle in &holders[..2] {
            agg.submit(&response(*oracle, index, FlightStatus::LateAirline), &reg)
                .unwrap();
        }
        assert_eq!(
            agg.state(RequestId(1)).unwrap().finalized,
            Some(FlightStatus::LateAirline)
        );
    }
}
