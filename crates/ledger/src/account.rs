//! Per-account ledger records.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use tessera_core::{AccountId, TokenId};

/// Balance slot created when an account associates with a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum Holding {
    /// Fungible balance in the smallest unit.
    Fungible(u64),
    /// Serials currently owned.
    NonFungible(BTreeSet<u64>),
}

impl Holding {
    /// Units held: fungible amount or owned-serial count.
    pub fn units(&self) -> u64 {
        match self {
            Holding::Fungible(amount) => *amount,
            Holding::NonFungible(serials) => serials.len() as u64,
        }
    }
}

/// Ledger record of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Account {
    /// Native-currency balance in the smallest unit.
    pub native_balance: u64,
    /// Token slots keyed by token; presence means the account is associated.
    pub holdings: BTreeMap<TokenId, Holding>,
    /// Native-currency allowances granted to spenders.
    pub native_allowances: BTreeMap<AccountId, u64>,
    /// Fungible allowances granted per token and spender.
    pub token_allowances: BTreeMap<(TokenId, AccountId), u64>,
}

impl Account {
    pub fn new(native_balance: u64) -> Self {
        Self {
            native_balance,
            holdings: BTreeMap::new(),
            native_allowances: BTreeMap::new(),
            token_allowances: BTreeMap::new(),
        }
    }

    pub fn is_associated(&self, token: TokenId) -> bool {
        self.holdings.contains_key(&token)
    }

    /// Fungible balance of `token`, zero when unassociated.
    pub fn fungible_balance(&self, token: TokenId) -> u64 {
        match self.holdings.get(&token) {
            Some(Holding::Fungible(amount)) => *amount,
            _ => 0,
        }
    }

    /// Owned serials of `token`, empty when unassociated.
    pub fn serials(&self, token: TokenId) -> Option<&BTreeSet<u64>> {
        match self.holdings.get(&token) {
            Some(Holding::NonFungible(serials)) => Some(serials),
            _ => None,
        }
    }

    pub fn owns_serial(&self, token: TokenId, serial: u64) -> bool {
        self.serials(token)
            .map(|serials| serials.contains(&serial))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassociated_account_holds_nothing() {
        let account = Account::new(10);
        let token = TokenId::new(1);
        assert!(!account.is_associated(token));
        assert_eq!(account.fungible_balance(token), 0);
        assert!(account.serials(token).is_none());
        assert!(!account.owns_serial(token, 1));
    }

    #[test]
    fn holding_units_count_serials() {
        let mut serials = BTreeSet::new();
        serials.insert(1);
        serials.insert(5);
        assert_eq!(Holding::NonFungible(serials).units(), 2);
        assert_eq!(Holding::Fungible(42).units(), 42);
    }
}
