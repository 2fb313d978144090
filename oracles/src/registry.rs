//! Oracle registry and shard index assigner.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use surety_types::{AccountId, Amount, IndexSet, ProtocolParams, ShardIndex, Timestamp};

use crate::entropy::{draw_index, EntropySource};
use crate::error::OracleError;

/// Upper bound on hash draws per assignment; with a uniform hash and a valid
/// parameter set this is never reached in practice.
const MAX_DRAWS: u32 = 4096;

/// A registered oracle and its immutable shard indices.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRecord {
    pub oracle: AccountId,
    pub indexes: IndexSet,
    pub stake: Amount,
    pub registered_at: Timestamp,
}

/// Registers staked oracles and assigns each one its shard indices exactly once.
pub struct OracleRegistry {
    params: ProtocolParams,
    entropy: Arc<dyn EntropySource>,
    oracles: HashMap<AccountId, OracleRecord>,
}

impl OracleRegistry {
    pub fn new(params: ProtocolParams, entropy: Arc<dyn EntropySource>) -> Result<Self, OracleError> {
        params.validate()?;
        Ok(Self {
            params,
            entropy,
            oracles: HashMap::new(),
        })
    }

    /// Register `oracle` with `stake` and return its indices.
    ///
    /// Re-registering returns the existing indices untouched, whatever stake is
    /// attached. A first registration must carry exactly the required stake.
    pub fn register(
        &mut self,
        oracle: AccountId,
        stake: Amount,
        now: Timestamp,
    ) -> Result<IndexSet, OracleError> {
        if let Some(existing) = self.oracles.get(&oracle) {
            return Ok(existing.indexes.clone());
        }
        if stake != self.params.oracle_stake {
            return Err(OracleError::InsufficientStake {
                needed: self.params.oracle_stake,
                provided: stake,
            });
        }
        let indexes = self.assign_indexes(&oracle)?;
        tracing::info!(%oracle, %indexes, "oracle registered");
        self.oracles.insert(
            oracle,
            OracleRecord {
                oracle,
                indexes: indexes.clone(),
                stake,
                registered_at: now,
            },
        );
        Ok(indexes)
    }

    /// Draw `indexes_per_oracle` distinct indices uniformly from the index space.
    fn assign_indexes(&self, oracle: &AccountId) -> Result<IndexSet, OracleError> {
        let seed = self.entropy.seed(oracle.as_bytes())?;
        let wanted = usize::from(self.params.indexes_per_oracle);
        let mut picked: Vec<ShardIndex> = Vec::with_capacity(wanted);
        let mut counter = 0u32;
        while picked.len() < wanted {
            if counter >= MAX_DRAWS {
                return Err(OracleError::Entropy(format!(
                    "could not draw {wanted} distinct indexes after {MAX_DRAWS} attempts"
                )));
            }
            if let Some(index) =
                draw_index(&seed, oracle.as_bytes(), counter, self.params.index_space)
            {
                if !picked.contains(&index) {
                    picked.push(index);
                }
            }
            counter += 1;
        }
        Ok(IndexSet::new(picked, self.params.index_space)?)
    }

    pub fn get_indexes(&self, oracle: &AccountId) -> Result<IndexSet, OracleError> {
        self.oracles
            .get(oracle)
            .map(|r| r.indexes.clone())
            .ok_or(OracleError::NotRegistered(*oracle))
    }

    pub fn is_registered(&self, oracle: &AccountId) -> bool {
        self.oracles.contains_key(oracle)
    }

    /// Registered oracles holding `index`.
    pub fn holders_of(&self, index: ShardIndex) -> Vec<AccountId> {
        let mut holders: Vec<AccountId> = self
            .oracles
            .values()
            .filter(|r| r.indexes.contains(index))
            .map(|r| r.oracle)
            .collect();
        holders.sort();
        holders
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::OsEntropy;

    /// Fixed seed, like a replayed beacon round.
    struct FixedEntropy([u8; 32]);

    impl EntropySource for FixedEntropy {
        fn seed(&self, _context: &[u8]) -> Result<[u8; 32], OracleError> {
            Ok(self.0)
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingEntropy;

    impl EntropySource for FailingEntropy {
        fn seed(&self, _context: &[u8]) -> Result<[u8; 32], OracleError> {
            Err(OracleError::Entropy("offline".into()))
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    fn registry() -> OracleRegistry {
        OracleRegistry::new(ProtocolParams::default(), Arc::new(OsEntropy)).unwrap()
    }

    fn stake() -> Amount {
        ProtocolParams::default().oracle_stake
    }

    #[test]
    fn assigns_three_distinct_indexes_in_range() {
        let mut reg = registry();
        for seed in 1..=50 {
            let set = reg
                .register(AccountId::from_seed(seed), stake(), Timestamp::new(0))
                .unwrap();
            assert_eq!(set.len(), 3);
            let s = set.as_slice();
            assert!(s[0] != s[1] && s[1] != s[2] && s[0] != s[2]);
            assert!(s.iter().all(|&i| i < 10));
        }
    }

    #[test]
    fn wrong_stake_is_rejected() {
        let mut reg = registry();
        let err = reg
            .register(AccountId::from_seed(1), Amount::from_ether(2), Timestamp::new(0))
            .unwrap_err();
        assert!(matches!(err, OracleError::InsufficientStake { .. }));
        assert!(!reg.is_registered(&AccountId::from_seed(1)));
    }

    #[test]
    fn reregistration_returns_same_indexes() {
        let mut reg = registry();
        let oracle = AccountId::from_seed(1);
        let first = reg.register(oracle, stake(), Timestamp::new(0)).unwrap();
        let again = reg.register(oracle, stake(), Timestamp::new(5)).unwrap();
        assert_eq!(first, again);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn get_indexes_for_unknown_oracle_fails() {
        let reg = registry();
        assert_eq!(
            reg.get_indexes(&AccountId::from_seed(4)),
            Err(OracleError::NotRegistered(AccountId::from_seed(4)))
        );
    }

    #[test]
    fn fixed_entropy_still_yields_distinct_indexes() {
        let mut reg =
            OracleRegistry::new(ProtocolParams::default(), Arc::new(FixedEntropy([0u8; 32])))
                .unwrap();
        let set = reg
            .register(AccountId::from_seed(1), stake(), Timestamp::new(0))
            .unwrap();
        let mut sorted = set.as_slice().to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 3);
    }

    #[test]
    fn full_index_space_is_assignable() {
        let params = ProtocolParams {
            index_space: 3,
            indexes_per_oracle: 3,
            ..Default::default()
        };
        let mut reg = OracleRegistry::new(params, Arc::new(OsEntropy)).unwrap();
        let set = reg
            .register(AccountId::from_seed(1), stake(), Timestamp::new(0))
            .unwrap();
        let mut sorted = set.as_slice().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
    }

    #[test]
    fn entropy_failure_leaves_oracle_unregistered() {
        let mut reg =
            OracleRegistry::new(ProtocolParams::default(), Arc::new(FailingEntropy)).unwrap();
        assert!(reg
            .register(AccountId::from_seed(1), stake(), Timestamp::new(0))
            .is_err());
        assert!(reg.is_empty());
    }

    #[test]
    fn invalid_params_are_rejected() {
        let params = ProtocolParams {
            index_space: 2,
            ..Default::default()
        };
        assert!(OracleRegistry::new(params, Arc::new(OsEntropy)).is_err());
    }

    #[test]
    fn holders_of_lists_matching_oracles() {
        let mut reg = registry();
        let oracle = AccountId::from_seed(1);
        let set = reg.register(oracle, stake(), Timestamp::new(0)).unwrap();
        let held = set.as_slice()[0];
        assert_eq!(reg.holders_of(held), vec![oracle]);
    }
}
