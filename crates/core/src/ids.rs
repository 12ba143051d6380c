//! Ledger entity identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when parsing an identifier from its text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    /// The text was not a base-10 unsigned integer.
    #[error("invalid identifier '{0}'")]
    Invalid(String),
}

/// Identifier of a ledger account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct AccountId(u64);

impl AccountId {
    /// Creates an account identifier from its numeric form.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Numeric form of the identifier.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for AccountId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| ParseIdError::Invalid(s.to_string()))
    }
}

/// Identifier of a token definition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct TokenId(u64);

impl TokenId {
    /// Creates a token identifier from its numeric form.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Numeric form of the identifier.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| ParseIdError::Invalid(s.to_string()))
    }
}

/// A single non-fungible token instance: a token plus a serial number.
///
/// Serials are assigned sequentially starting at 1 when minted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NftId {
    /// Token the serial belongs to.
    pub token: TokenId,
    /// Serial number within the token.
    pub serial: u64,
}

impl NftId {
    /// Creates an NFT identifier.
    pub const fn new(token: TokenId, serial: u64) -> Self {
        Self { token, serial }
    }
}

impl fmt::Display for NftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token, self.serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_id_display_and_parse_round_trip() {
        let id = AccountId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!("42".parse::<AccountId>(), Ok(id));
    }

    #[test]
    fn token_id_parse_rejects_garbage() {
        let err = "0.0.7".parse::<TokenId>().unwrap_err();
        assert_eq!(err, ParseIdError::Invalid("0.0.7".to_string()));
    }

    #[test]
    fn nft_id_orders_by_token_then_serial() {
        let a = NftId::new(TokenId::new(1), 9);
        let b = NftId::new(TokenId::new(2), 1);
        assert!(a < b);
        assert_eq!(a.to_string(), "1/9");
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&AccountId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AccountId::new(7));
    }
}
