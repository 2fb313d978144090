//! Value amounts transferred to the ledger (antes and oracle stakes).
//!
//! Amounts are fixed-point integers in wei (u128) to avoid floating-point errors.
//! They serialize as decimal strings, since wei values overflow the integer
//! types of most formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Wei per ether.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// A ledger value amount in wei.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);

    pub fn new(wei: u128) -> Self {
        Self(wei)
    }

    /// Whole ether to wei.
    pub fn from_ether(ether: u128) -> Self {
        Self(ether.saturating_mul(WEI_PER_ETHER))
    }

    pub fn wei(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % WEI_PER_ETHER == 0 {
            write!(f, "{} ether", self.0 / WEI_PER_ETHER)
        } else {
            write!(f, "{} wei", self.0)
        }
    }
}

impl FromStr for Amount {
    type Err = TypesError;

    /// Parses a wei count (`"1000"`) or whole ether (`"10 ether"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || TypesError::InvalidAmount(s.to_string());
        if let Some(ether) = s.strip_suffix("ether") {
            let ether: u128 = ether.trim().parse().map_err(|_| invalid())?;
            return ether.checked_mul(WEI_PER_ETHER).map(Self).ok_or_else(invalid);
        }
        let wei = s.strip_suffix("wei").unwrap_or(s).trim();
        wei.parse().map(Self).map_err(|_| invalid())
    }
}

impl TryFrom<String> for Amount {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}
