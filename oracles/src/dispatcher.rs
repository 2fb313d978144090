//! Status request dispatcher: draws the index that decides which oracles may answer.

use std::sync::Arc;

use surety_types::{AccountId, FlightKey, ShardIndex, Timestamp};

use crate::entropy::{draw_index, EntropySource};
use crate::error::OracleError;
use crate::request::{RequestId, StatusRequest};

const MAX_DRAWS: u32 = 4096;

pub struct Dispatcher {
    entropy: Arc<dyn EntropySource>,
    index_space: u8,
    next_id: u64,
}

impl Dispatcher {
    pub fn new(entropy: Arc<dyn EntropySource>, index_space: u8) -> Self {
        Self {
            entropy,
            index_space,
            next_id: 0,
        }
    }

    /// Create a new request instance for `key` with a freshly drawn index.
    ///
    /// Every call is independent: repeating a key yields a new id and a new draw.
    pub fn dispatch(
        &mut self,
        key: FlightKey,
        requester: AccountId,
        now: Timestamp,
    ) -> Result<StatusRequest, OracleError> {
        let id = RequestId(self.next_id);
        let context = request_context(id, &key);
        let seed = self.entropy.seed(&context)?;
        let index = self.pick_index(&seed, &context)?;
        self.next_id += 1;
        tracing::debug!(request = %id, index, flight = %key, "status request dispatched");
        Ok(StatusRequest {
            id,
            index,
            key,
            requester,
            requested_at: now,
        })
    }

    fn pick_index(&self, seed: &[u8; 32], context: &[u8]) -> Result<ShardIndex, OracleError> {
        (0..MAX_DRAWS)
            .find_map(|counter| draw_index(seed, context, counter, self.index_space))
            .ok_or_else(|| OracleError::Entropy("no index could be drawn".into()))
    }

    /// Number of requests dispatched so far.
    pub fn dispatched(&self) -> u64 {
        self.next_id
    }
}

fn request_context(id: RequestId, key: &FlightKey) -> Vec<u8> {
    let mut context = Vec::with_capacity(8 + 20 + key.flight.len() + 8);
    context.extend_from_slice(&id.0.to_le_bytes());
    context.extend_from_slice(key.airline.as_bytes());
    context.extend_from_slice(key.flight.as_bytes());
    context.extend_from_slice(&key.timestamp.as_secs().to_le_bytes());
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::OsEntropy;

    fn key() -> FlightKey {
        FlightKey::new(AccountId::from_seed(1), "ONE0001", Timestamp::new(1_000))
    }

    #[test]
    fn index_within_space() {
        let mut d = Dispatcher::new(Arc::new(OsEntropy), 10);
        for _ in 0..100 {
            let req = d.dispatch(key(), AccountId::from_seed(9), Timestamp::new(0)).unwrap();
            assert!(req.index < 10);
        }
    }

    #[test]
    fn same_key_gives_independent_requests() {
        let mut d = Dispatcher::new(Arc::new(OsEntropy), 10);
        let a = d.dispatch(key(), AccountId::from_seed(9), Timestamp::new(0)).unwrap();
        let b = d.dispatch(key(), AccountId::from_seed(9), Timestamp::new(0)).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.key, b.key);
        assert_eq!(d.dispatched(), 2);
    }

    #[test]
    fn draws_vary_across_requests() {
        let mut d = Dispatcher::new(Arc::new(OsEntropy), 10);
        let indexes: std::collections::HashSet<u8> = (0..200)
            .map(|_| {
                d.dispatch(key(), AccountId::from_seed(9), Timestamp::new(0))
                    .unwrap()
                    .index
            })
            .collect();
        assert!(indexes.len() > 1);
    }
}
