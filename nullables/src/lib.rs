//! Nullable infrastructure for deterministic testing.
//!
//! External sources of nondeterminism (clock, entropy) and the ledger's failure
//! modes are abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the OS or the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod entropy;
pub mod ledger;

pub use clock::NullClock;
pub use entropy::NullEntropy;
pub use ledger::{FailingLedger, LedgerCall};
