//! Entropy for index assignment and dispatch.
//!
//! Draws need not be cryptographically secure, but an oracle must not be able to
//! predict a dispatch index before the request is made. Production uses the OS
//! generator; tests substitute a deterministic source.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use rand::rngs::OsRng;
use rand::RngCore;
use surety_types::ShardIndex;

use crate::error::OracleError;

type Blake2b256 = Blake2b<U32>;

/// Trait for providing random seeds.
pub trait EntropySource: Send + Sync {
    /// Get 32 bytes of randomness for a given context (e.g. an oracle id or flight key).
    fn seed(&self, context: &[u8]) -> Result<[u8; 32], OracleError>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}

/// Operating-system randomness.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn seed(&self, _context: &[u8]) -> Result<[u8; 32], OracleError> {
        let mut value = [0u8; 32];
        OsRng
            .try_fill_bytes(&mut value)
            .map_err(|e| OracleError::Entropy(e.to_string()))?;
        Ok(value)
    }

    fn name(&self) -> &str {
        "os"
    }
}

/// Derive one candidate index in `[0, space)` from `Hash(seed || context || counter)`.
///
/// Returns `None` when the hash falls in the biased tail of the `u32` range, so
/// accepted draws are uniform; callers move on to the next counter.
pub fn draw_index(seed: &[u8; 32], context: &[u8], counter: u32, space: u8) -> Option<ShardIndex> {
    if space == 0 {
        return None;
    }
    let mut hasher = Blake2b256::new();
    hasher.update(seed);
    hasher.update(context);
    hasher.update(counter.to_le_bytes());
    let digest = hasher.finalize();
    let value = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);
    let space = u32::from(space);
    let zone = (u32::MAX / space) * space;
    if value >= zone {
        return None;
    }
    Some((value % space) as ShardIndex)
}
