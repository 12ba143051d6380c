//! Token definitions and ledger-side token records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tessera_core::{AccountId, TokenId, TokenKind};
use tessera_fees::FeeSchedule;

/// One minted NFT serial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Nft {
    pub owner: AccountId,
    pub metadata: Vec<u8>,
    /// Spender approved for this serial; cleared on every transfer.
    pub approved: Option<AccountId>,
}

/// Ledger record of one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Token {
    pub name: String,
    pub symbol: String,
    pub kind: TokenKind,
    /// Account holding freshly minted supply; its outbound transfers are
    /// exempt from custom fees.
    pub treasury: AccountId,
    /// Only this account may mint or burn.
    pub supply_key: AccountId,
    pub total_supply: u64,
    pub fees: FeeSchedule,
    /// Minted serials and their state. Fungible tokens keep this empty.
    pub serials: BTreeMap<u64, Nft>,
    /// Next serial to assign; serials start at 1.
    pub next_serial: u64,
}

impl Token {
    pub fn new(definition: TokenDefinition) -> Self {
        Self {
            name: definition.name,
            symbol: definition.symbol,
            kind: definition.kind,
            treasury: definition.treasury,
            supply_key: definition.supply_key,
            total_supply: 0,
            fees: definition.fees,
            serials: BTreeMap::new(),
            next_serial: 1,
        }
    }
}

/// Parameters for [`crate::TokenLedger::create_token`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDefinition {
    pub name: String,
    pub symbol: String,
    pub kind: TokenKind,
    /// Treasury account; auto-associated at creation.
    pub treasury: AccountId,
    /// Supply key holder; defaults to the treasury.
    pub supply_key: AccountId,
    /// Supply credited to the treasury at creation. Fungible tokens only.
    pub initial_supply: u64,
    /// Custom fee schedule in application order.
    pub fees: FeeSchedule,
}

impl TokenDefinition {
    /// Fungible token with the treasury holding the supply key.
    pub fn fungible(
        name: impl Into<String>,
        symbol: impl Into<String>,
        decimals: u8,
        treasury: AccountId,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            kind: TokenKind::Fungible { decimals },
            treasury,
            supply_key: treasury,
            initial_supply: 0,
            fees: FeeSchedule::empty(),
        }
    }

    /// Non-fungible token with the treasury holding the supply key.
    pub fn non_fungible(
        name: impl Into<String>,
        symbol: impl Into<String>,
        treasury: AccountId,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            kind: TokenKind::NonFungible,
            treasury,
            supply_key: treasury,
            initial_supply: 0,
            fees: FeeSchedule::empty(),
        }
    }

    /// Moves the supply key to another account.
    pub fn with_supply_key(mut self, supply_key: AccountId) -> Self {
        self.supply_key = supply_key;
        self
    }

    /// Credits the treasury at creation. Fungible tokens only.
    pub fn with_initial_supply(mut self, initial_supply: u64) -> Self {
        self.initial_supply = initial_supply;
        self
    }

    /// Attaches the custom fee schedule.
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }
}

/// Public view of a token returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub id: TokenId,
    pub name: String,
    pub symbol: String,
    pub kind: TokenKind,
    pub treasury: AccountId,
    pub supply_key: AccountId,
    pub total_supply: u64,
    pub fees: FeeSchedule,
}

impl TokenInfo {
    pub(crate) fn from_token(id: TokenId, token: &Token) -> Self {
        Self {
            id,
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            kind: token.kind,
            treasury: token.treasury,
            supply_key: token.supply_key,
            total_supply: token.total_supply,
            fees: token.fees.clone(),
        }
    }
}
