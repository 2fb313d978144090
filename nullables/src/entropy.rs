//! Nullable entropy: deterministic seeds for index assignment and dispatch.

use std::sync::atomic::{AtomicUsize, Ordering};
use surety_oracles::{EntropySource, OracleError};

/// Returns pre-configured seeds in order, cycling when exhausted.
pub struct NullEntropy {
    seeds: Vec<[u8; 32]>,
    next: AtomicUsize,
}

impl NullEntropy {
    /// Create with a sequence of deterministic seeds.
    pub fn new(seeds: Vec<[u8; 32]>) -> Self {
        Self {
            seeds,
            next: AtomicUsize::new(0),
        }
    }

    /// Create with a single seed returned for every call.
    pub fn constant(seed: [u8; 32]) -> Self {
        Self::new(vec![seed])
    }

    /// Number of seeds handed out so far.
    pub fn calls(&self) -> usize {
        self.next.load(Ordering::SeqCst)
    }
}

impl EntropySource for NullEntropy {
    fn seed(&self, _context: &[u8]) -> Result<[u8; 32], OracleError> {
        if self.seeds.is_empty() {
            return Err(OracleError::Entropy("null entropy has no seeds".into()));
        }
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Ok(self.seeds[n % self.seeds.len()])
    }

    fn name(&self) -> &str {
        "null-entropy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_seeds() {
        let e = NullEntropy::new(vec![[1u8; 32], [2u8; 32]]);
        assert_eq!(e.seed(b"").unwrap(), [1u8; 32]);
        assert_eq!(e.seed(b"").unwrap(), [2u8; 32]);
        assert_eq!(e.seed(b"").unwrap(), [1u8; 32]);
        assert_eq!(e.calls(), 3);
    }

    #[test]
    fn empty_sequence_fails() {
        assert!(NullEntropy::new(Vec::new()).seed(b"").is_err());
    }
}
