//! Core types shared across the tessera engine crates.
//!
//! Identifiers for accounts, tokens and NFT serials, plus the two small
//! enums that describe what a token is (`TokenKind`) and what currency an
//! amount is expressed in (`Denomination`). Everything here is a plain
//! value type; the ledger semantics live in `tessera-ledger`.

mod asset;
mod ids;

pub use asset::{Denomination, TokenKind};
pub use ids::{AccountId, NftId, ParseIdError, TokenId};
