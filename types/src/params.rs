//! Protocol parameters: index sharding, quorum sizes and required payments.

use crate::amount::Amount;
use crate::error::TypesError;
use serde::{Deserialize, Serialize};

/// All tunable protocol parameters.
///
/// Every field has a serde default so a partial TOML table overrides only what it names.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    // ── Oracle sharding ─────────────────────────────────────────────────
    /// Size of the shard index space; indices are drawn from `[0, index_space)`.
    pub index_space: u8,

    /// Number of distinct indices assigned to each oracle.
    pub indexes_per_oracle: u8,

    /// Identical responses needed to finalize a status request.
    /// Fixed, independent of the number of registered oracles.
    pub min_responses: u32,

    /// Exact stake an oracle must attach to its registration.
    pub oracle_stake: Amount,

    // ── Airline admission ───────────────────────────────────────────────
    /// While fewer than this many airlines are registered, registration needs no vote.
    pub auto_approve_limit: u32,

    /// Ante an airline pays before it may propose or vote.
    pub airline_ante: Amount,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            index_space: 10,
            indexes_per_oracle: 3,
            min_responses: 3,
            oracle_stake: Amount::from_ether(1),
            auto_approve_limit: 4,
            airline_ante: Amount::from_ether(10),
        }
    }
}

impl ProtocolParams {
    /// Reject combinations the assigner or aggregator cannot honor.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.index_space == 0 {
            return Err(TypesError::InvalidParams("index_space must be positive".into()));
        }
        if self.indexes_per_oracle == 0 {
            return Err(TypesError::InvalidParams(
                "indexes_per_oracle must be positive".into(),
            ));
        }
        if self.indexes_per_oracle > self.index_space {
            return Err(TypesError::InvalidParams(format!(
                "cannot draw {} distinct indexes from a space of {}",
                self.indexes_per_oracle, self.index_space
            )));
        }
        if self.min_responses == 0 {
            return Err(TypesError::InvalidParams("min_responses must be positive".into()));
        }
        Ok(())
    }

    /// Votes needed to admit a candidate when `registered` airlines exist: `ceil(registered / 2)`.
    pub fn required_votes(&self, registered: u32) -> u32 {
        registered.div_ceil(2)
    }
}
