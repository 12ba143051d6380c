//! Token kind and amount denomination.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TokenId;

/// Whether a token carries divisible balances or serial-numbered instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// Divisible token; balances are integers in the smallest unit.
    Fungible {
        /// Display resolution of the token (pure presentation; all engine
        /// arithmetic is in the smallest unit).
        decimals: u8,
    },
    /// Serial-numbered token; ownership is per serial.
    NonFungible,
}

impl TokenKind {
    /// True for divisible tokens.
    pub fn is_fungible(&self) -> bool {
        matches!(self, TokenKind::Fungible { .. })
    }

    /// Display decimals for fungible tokens, `None` otherwise.
    pub fn decimals(&self) -> Option<u8> {
        match self {
            TokenKind::Fungible { decimals } => Some(*decimals),
            TokenKind::NonFungible => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Fungible { decimals } => write!(f, "fungible({decimals})"),
            TokenKind::NonFungible => write!(f, "non-fungible"),
        }
    }
}

/// Currency a balance adjustment or fee amount is expressed in.
///
/// `Native` sorts before any token, which gives planners a stable order
/// when walking per-denomination maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Denomination {
    /// The ledger's native currency.
    Native,
    /// A specific fungible token.
    Token(TokenId),
}

impl Denomination {
    /// True for the native currency.
    pub fn is_native(&self) -> bool {
        matches!(self, Denomination::Native)
    }

    /// The denominating token, if any.
    pub fn token(&self) -> Option<TokenId> {
        match self {
            Denomination::Native => None,
            Denomination::Token(id) => Some(*id),
        }
    }
}

impl From<TokenId> for Denomination {
    fn from(id: TokenId) -> Self {
        Denomination::Token(id)
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denomination::Native => write!(f, "native"),
            Denomination::Token(id) => write!(f, "token {id}"),
        }
    }
}
