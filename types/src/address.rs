//! Account identity type with `0x` hex prefix.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 20-byte ledger account reference (airline, oracle, passenger or owner).
///
/// Rendered as `0x` followed by 40 lowercase hex digits. Parsing accepts either
/// case and an optional `0x` prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId([u8; 20]);

impl AccountId {
    /// The standard prefix for rendered account ids.
    pub const PREFIX: &'static str = "0x";

    /// The all-zero account, never a valid participant.
    pub const ZERO: Self = Self([0u8; 20]);

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Deterministic account for tests and fixtures: every byte set to `seed`.
    pub fn from_seed(seed: u8) -> Self {
        Self([seed; 20])
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl FromStr for AccountId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(Self::PREFIX)
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let raw = hex::decode(digits).map_err(|_| TypesError::InvalidAccount(s.to_string()))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| TypesError::InvalidAccount(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for AccountId {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_prefixed_lowercase_hex() {
        let id = AccountId::from_seed(0xAB);
        assert_eq!(id.to_string(), format!("0x{}", "ab".repeat(20)));
    }

    #[test]
    fn parse_accepts_mixed_case_and_missing_prefix() {
        let upper = format!("0x{}", "AB".repeat(20));
        let bare = "ab".repeat(20);
        assert_eq!(upper.parse::<AccountId>().unwrap(), AccountId::from_seed(0xAB));
        assert_eq!(bare.parse::<AccountId>().unwrap(), AccountId::from_seed(0xAB));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert!("0x1234".parse::<AccountId>().is_err());
        assert!(format!("0x{}", "00".repeat(21)).parse::<AccountId>().is_err());
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert!(format!("0x{}", "zz".repeat(20)).parse::<AccountId>().is_err());
    }

    #[test]
    fn serde_uses_string_form() {
        let id = AccountId::from_seed(1);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "01".repeat(20)));
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
