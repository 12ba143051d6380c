//! The in-memory ledger store.
//!
//! `LedgerState` owns every account, token and pending-airdrop record.
//! All methods here either read state or mutate it only after every check
//! has passed; batch settlement goes through the planner and
//! `settlement::apply` instead of touching balances directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tessera_config::LedgerConfig;
use tessera_core::{AccountId, Denomination, TokenId, TokenKind};
use tessera_fees::{CustomFee, FeeConfigError, FeeSchedule, FixedFee};

use crate::account::{Account, Holding};
use crate::airdrop::{AirdropId, PendingAirdrop};
use crate::token::{Nft, Token, TokenDefinition, TokenInfo};
use crate::{Error, Result};

/// Complete ledger state behind the `TokenLedger` lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LedgerState {
    pub accounts: BTreeMap<AccountId, Account>,
    pub tokens: BTreeMap<TokenId, Token>,
    pub pending_airdrops: BTreeMap<AirdropId, PendingAirdrop>,
    next_account_id: u64,
    next_token_id: u64,
    pub(crate) next_airdrop_id: u64,
}

impl LedgerState {
    pub fn new() -> Self {
        Self {
            accounts: BTreeMap::new(),
            tokens: BTreeMap::new(),
            pending_airdrops: BTreeMap::new(),
            next_account_id: 1,
            next_token_id: 1,
            next_airdrop_id: 1,
        }
    }

    // ------------------------------------------------------------------
    // Record access
    // ------------------------------------------------------------------

    pub fn account(&self, id: AccountId) -> Result<&Account> {
        self.accounts.get(&id).ok_or(Error::UnknownAccount(id))
    }

    pub fn account_mut(&mut self, id: AccountId) -> Result<&mut Account> {
        self.accounts.get_mut(&id).ok_or(Error::UnknownAccount(id))
    }

    pub fn token(&self, id: TokenId) -> Result<&Token> {
        self.tokens.get(&id).ok_or(Error::UnknownToken(id))
    }

    pub fn token_mut(&mut self, id: TokenId) -> Result<&mut Token> {
        self.tokens.get_mut(&id).ok_or(Error::UnknownToken(id))
    }

    // ------------------------------------------------------------------
    // Accounts and associations
    // ------------------------------------------------------------------

    pub fn create_account(&mut self, initial_native_balance: u64) -> AccountId {
        let id = AccountId::new(self.next_account_id);
        self.next_account_id += 1;
        self.accounts.insert(id, Account::new(initial_native_balance));
        id
    }

    pub fn associate(&mut self, account: AccountId, token: TokenId) -> Result<()> {
        let kind = self.token(token)?.kind;
        let record = self.account_mut(account)?;
        if record.is_associated(token) {
            return Err(Error::AlreadyAssociated { account, token });
        }
        record.holdings.insert(token, empty_holding(kind));
        Ok(())
    }

    /// Creates the holding slot when missing; no error when present.
    pub fn ensure_associated(&mut self, account: AccountId, token: TokenId) -> Result<bool> {
        let kind = self.token(token)?.kind;
        let record = self.account_mut(account)?;
        if record.is_associated(token) {
            return Ok(false);
        }
        record.holdings.insert(token, empty_holding(kind));
        Ok(true)
    }

    /// Removes an empty holding slot again. Used to unwind a speculative
    /// association when the operation that needed it fails.
    pub fn disassociate_empty(&mut self, account: AccountId, token: TokenId) {
        if let Some(record) = self.accounts.get_mut(&account) {
            let empty = record
                .holdings
                .get(&token)
                .map(|holding| holding.units() == 0)
                .unwrap_or(false);
            if empty {
                record.holdings.remove(&token);
            }
        }
    }

    pub fn is_associated(&self, account: AccountId, token: TokenId) -> Result<bool> {
        self.token(token)?;
        Ok(self.account(account)?.is_associated(token))
    }

    // ------------------------------------------------------------------
    // Token creation
    // ------------------------------------------------------------------

    /// Validates the definition completely, then installs the token,
    /// auto-associates the treasury and the collectors paid in the new
    /// token, and credits any initial supply.
    pub fn create_token(
        &mut self,
        definition: TokenDefinition,
        config: &LedgerConfig,
    ) -> Result<TokenId> {
        let id = TokenId::new(self.next_token_id);

        self.validate_definition(&definition, config)?;
        self.account(definition.treasury)?;
        self.account(definition.supply_key)?;
        definition.fees.validate(definition.kind)?;
        self.validate_fee_cross_references(&definition.fees, id, definition.kind)?;

        // All checks passed; mutations start here.
        let auto_associate = self.schedule_auto_associations(&definition, id);
        let initial_supply = definition.initial_supply;
        let treasury = definition.treasury;
        let kind = definition.kind;

        self.next_token_id += 1;
        self.tokens.insert(id, Token::new(definition));
        for account in auto_associate {
            self.ensure_associated(account, id)?;
        }
        if initial_supply > 0 {
            let token = self.token_mut(id)?;
            token.total_supply = initial_supply;
            if let Some(Holding::Fungible(balance)) = self
                .accounts
                .get_mut(&treasury)
                .and_then(|record| record.holdings.get_mut(&id))
            {
                *balance = initial_supply;
            }
            debug_assert!(kind.is_fungible());
        }
        Ok(id)
    }

    fn validate_definition(
        &self,
        definition: &TokenDefinition,
        config: &LedgerConfig,
    ) -> Result<()> {
        if definition.name.is_empty() {
            return Err(Error::InvalidOperation("token name is empty".into()));
        }
        if definition.name.len() > config.max_token_name_length {
            return Err(Error::InvalidOperation(format!(
                "token name exceeds {} bytes",
                config.max_token_name_length
            )));
        }
        if definition.symbol.is_empty() {
            return Err(Error::InvalidOperation("token symbol is empty".into()));
        }
        if definition.symbol.len() > config.max_token_symbol_length {
            return Err(Error::InvalidOperation(format!(
                "token symbol exceeds {} bytes",
                config.max_token_symbol_length
            )));
        }
        match definition.kind {
            TokenKind::Fungible { decimals } => {
                if decimals > config.max_token_decimals {
                    return Err(Error::InvalidOperation(format!(
                        "token decimals exceed {}",
                        config.max_token_decimals
                    )));
                }
            }
            TokenKind::NonFungible => {
                if definition.initial_supply != 0 {
                    return Err(Error::InvalidOperation(
                        "non-fungible token cannot carry an initial supply".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Cross-record schedule checks: collectors exist, denominating tokens
    /// exist and are fungible, collectors can receive what they collect.
    fn validate_fee_cross_references(
        &self,
        fees: &FeeSchedule,
        new_id: TokenId,
        new_kind: TokenKind,
    ) -> Result<()> {
        for fee in fees.entries() {
            if !self.accounts.contains_key(&fee.collector()) {
                return Err(FeeConfigError::UnknownCollector(fee.collector()).into());
            }
            match fee {
                CustomFee::Fixed(fixed) => {
                    self.validate_fixed_denomination(fixed, new_id, new_kind)?
                }
                CustomFee::Fractional(_) => {
                    // Always denominated in the new token itself; the
                    // collector auto-associates at creation.
                }
                CustomFee::Royalty(royalty) => {
                    if let Some(fallback) = &royalty.fallback {
                        if !self.accounts.contains_key(&fallback.collector) {
                            return Err(
                                FeeConfigError::UnknownCollector(fallback.collector).into()
                            );
                        }
                        self.validate_fixed_denomination(fallback, new_id, new_kind)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_fixed_denomination(
        &self,
        fee: &FixedFee,
        new_id: TokenId,
        new_kind: TokenKind,
    ) -> Result<()> {
        let denom = match fee.denomination {
            Denomination::Native => return Ok(()),
            Denomination::Token(denom) => denom,
        };
        if denom == new_id {
            if !new_kind.is_fungible() {
                return Err(FeeConfigError::NonFungibleDenomination(denom).into());
            }
            // Self-denominated; the collector auto-associates at creation.
            return Ok(());
        }
        let token = self
            .tokens
            .get(&denom)
            .ok_or(FeeConfigError::UnknownDenominatingToken(denom))?;
        if !token.kind.is_fungible() {
            return Err(FeeConfigError::NonFungibleDenomination(denom).into());
        }
        let collector = self
            .accounts
            .get(&fee.collector)
            .ok_or(FeeConfigError::UnknownCollector(fee.collector))?;
        if !collector.is_associated(denom) {
            return Err(FeeConfigError::CollectorNotAssociated {
                collector: fee.collector,
                token: denom,
            }
            .into());
        }
        Ok(())
    }

    /// Accounts that get a slot in the new token at creation: the treasury
    /// plus every collector paid in the token itself.
    fn schedule_auto_associations(
        &self,
        definition: &TokenDefinition,
        new_id: TokenId,
    ) -> Vec<AccountId> {
        let mut accounts = vec![definition.treasury];
        for fee in definition.fees.entries() {
            match fee {
                CustomFee::Fractional(fractional) => accounts.push(fractional.collector),
                CustomFee::Fixed(fixed) => {
                    if fixed.denomination == Denomination::Token(new_id) {
                        accounts.push(fixed.collector);
                    }
                }
                CustomFee::Royalty(_) => {}
            }
        }
        accounts
    }

    // ------------------------------------------------------------------
    // Supply operations
    // ------------------------------------------------------------------

    pub fn mint_fungible(
        &mut self,
        token_id: TokenId,
        caller: AccountId,
        amount: u64,
    ) -> Result<u64> {
        let token = self.token(token_id)?;
        if !token.kind.is_fungible() {
            return Err(Error::KindMismatch {
                token: token_id,
                operation: "fungible mint",
            });
        }
        if caller != token.supply_key {
            return Err(Error::UnauthorizedMint {
                token: token_id,
                caller,
            });
        }
        let treasury = token.treasury;
        let new_supply = token
            .total_supply
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)?;
        let balance = self.account(treasury)?.fungible_balance(token_id);
        let new_balance = balance.checked_add(amount).ok_or(Error::AmountOverflow)?;

        self.token_mut(token_id)?.total_supply = new_supply;
        if let Some(record) = self.accounts.get_mut(&treasury) {
            record.holdings.insert(token_id, Holding::Fungible(new_balance));
        }
        Ok(new_supply)
    }

    pub fn mint_nft(
        &mut self,
        token_id: TokenId,
        caller: AccountId,
        metadata: Vec<Vec<u8>>,
        config: &LedgerConfig,
    ) -> Result<Vec<u64>> {
        let token = self.token(token_id)?;
        if token.kind.is_fungible() {
            return Err(Error::KindMismatch {
                token: token_id,
                operation: "NFT mint",
            });
        }
        if caller != token.supply_key {
            return Err(Error::UnauthorizedMint {
                token: token_id,
                caller,
            });
        }
        for blob in &metadata {
            if blob.len() > config.max_nft_metadata_bytes {
                return Err(Error::InvalidOperation(format!(
                    "NFT metadata exceeds {} bytes",
                    config.max_nft_metadata_bytes
                )));
            }
        }
        let treasury = token.treasury;
        let count = metadata.len() as u64;
        token
            .total_supply
            .checked_add(count)
            .ok_or(Error::AmountOverflow)?;

        let token = self.token_mut(token_id)?;
        let mut serials = Vec::with_capacity(metadata.len());
        for blob in metadata {
            let serial = token.next_serial;
            token.next_serial += 1;
            token.serials.insert(
                serial,
                Nft {
                    owner: treasury,
                    metadata: blob,
                    approved: None,
                },
            );
            serials.push(serial);
        }
        token.total_supply += count;

        if let Some(Holding::NonFungible(owned)) = self
            .accounts
            .get_mut(&treasury)
            .and_then(|record| record.holdings.get_mut(&token_id))
        {
            owned.extend(serials.iter().copied());
        }
        Ok(serials)
    }

    pub fn burn_fungible(
        &mut self,
        token_id: TokenId,
        caller: AccountId,
        amount: u64,
    ) -> Result<u64> {
        let token = self.token(token_id)?;
        if !token.kind.is_fungible() {
            return Err(Error::KindMismatch {
                token: token_id,
                operation: "fungible burn",
            });
        }
        if caller != token.supply_key {
            return Err(Error::UnauthorizedMint {
                token: token_id,
                caller,
            });
        }
        let treasury = token.treasury;
        let balance = self.account(treasury)?.fungible_balance(token_id);
        if balance < amount {
            return Err(Error::InsufficientBalance {
                account: treasury,
                denomination: Denomination::Token(token_id),
                required: amount,
                available: balance,
            });
        }
        let new_supply = token
            .total_supply
            .checked_sub(amount)
            .ok_or(Error::AmountOverflow)?;

        self.token_mut(token_id)?.total_supply = new_supply;
        if let Some(record) = self.accounts.get_mut(&treasury) {
            record
                .holdings
                .insert(token_id, Holding::Fungible(balance - amount));
        }
        Ok(new_supply)
    }

    pub fn burn_nft(&mut self, token_id: TokenId, caller: AccountId, serial: u64) -> Result<u64> {
        let token = self.token(token_id)?;
        if token.kind.is_fungible() {
            return Err(Error::KindMismatch {
                token: token_id,
                operation: "NFT burn",
            });
        }
        if caller != token.supply_key {
            return Err(Error::UnauthorizedMint {
                token: token_id,
                caller,
            });
        }
        let treasury = token.treasury;
        let owner = token
            .serials
            .get(&serial)
            .ok_or(Error::UnknownSerial {
                token: token_id,
                serial,
            })?
            .owner;
        if owner != treasury {
            return Err(Error::NftNotOwned {
                token: token_id,
                serial,
                account: treasury,
            });
        }
        let new_supply = token
            .total_supply
            .checked_sub(1)
            .ok_or(Error::AmountOverflow)?;

        let token = self.token_mut(token_id)?;
        token.serials.remove(&serial);
        token.total_supply = new_supply;
        if let Some(Holding::NonFungible(owned)) = self
            .accounts
            .get_mut(&treasury)
            .and_then(|record| record.holdings.get_mut(&token_id))
        {
            owned.remove(&serial);
        }
        Ok(new_supply)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn native_balance(&self, account: AccountId) -> Result<u64> {
        Ok(self.account(account)?.native_balance)
    }

    /// Fungible balance or owned-serial count; zero when unassociated.
    pub fn token_balance(&self, account: AccountId, token: TokenId) -> Result<u64> {
        self.token(token)?;
        Ok(self
            .account(account)?
            .holdings
            .get(&token)
            .map(Holding::units)
            .unwrap_or(0))
    }

    pub fn owner_of(&self, token_id: TokenId, serial: u64) -> Result<AccountId> {
        let token = self.token(token_id)?;
        token
            .serials
            .get(&serial)
            .map(|nft| nft.owner)
            .ok_or(Error::UnknownSerial {
                token: token_id,
                serial,
            })
    }

    pub fn token_info(&self, token_id: TokenId) -> Result<TokenInfo> {
        Ok(TokenInfo::from_token(token_id, self.token(token_id)?))
    }

    pub fn fees_for(&self, token_id: TokenId) -> Result<FeeSchedule> {
        Ok(self.token(token_id)?.fees.clone())
    }

    // ------------------------------------------------------------------
    // Allowances
    // ------------------------------------------------------------------

    pub fn approve_native(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        amount: u64,
    ) -> Result<()> {
        self.account(spender)?;
        let record = self.account_mut(owner)?;
        if amount == 0 {
            record.native_allowances.remove(&spender);
        } else {
            record.native_allowances.insert(spender, amount);
        }
        Ok(())
    }

    pub fn approve_fungible(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<()> {
        if !self.token(token)?.kind.is_fungible() {
            return Err(Error::KindMismatch {
                token,
                operation: "fungible allowance",
            });
        }
        self.account(spender)?;
        let record = self.account_mut(owner)?;
        if amount == 0 {
            record.token_allowances.remove(&(token, spender));
        } else {
            record.token_allowances.insert((token, spender), amount);
        }
        Ok(())
    }

    pub fn approve_nft(
        &mut self,
        owner: AccountId,
        spender: AccountId,
        token_id: TokenId,
        serial: u64,
    ) -> Result<()> {
        self.account(spender)?;
        self.account(owner)?;
        let token = self.token(token_id)?;
        if token.kind.is_fungible() {
            return Err(Error::KindMismatch {
                token: token_id,
                operation: "NFT approval",
            });
        }
        let nft = token.serials.get(&serial).ok_or(Error::UnknownSerial {
            token: token_id,
            serial,
        })?;
        if nft.owner != owner {
            return Err(Error::NftNotOwned {
                token: token_id,
                serial,
                account: owner,
            });
        }
        if let Some(nft) = self.token_mut(token_id)?.serials.get_mut(&serial) {
            nft.approved = Some(spender);
        }
        Ok(())
    }

    pub fn allowance_native(&self, owner: AccountId, spender: AccountId) -> Result<u64> {
        Ok(self
            .account(owner)?
            .native_allowances
            .get(&spender)
            .copied()
            .unwrap_or(0))
    }

    pub fn allowance_fungible(
        &self,
        owner: AccountId,
        spender: AccountId,
        token: TokenId,
    ) -> Result<u64> {
        self.token(token)?;
        Ok(self
            .account(owner)?
            .token_allowances
            .get(&(token, spender))
            .copied()
            .unwrap_or(0))
    }

    pub fn approved_spender(&self, token_id: TokenId, serial: u64) -> Result<Option<AccountId>> {
        let token = self.token(token_id)?;
        token
            .serials
            .get(&serial)
            .map(|nft| nft.approved)
            .ok_or(Error::UnknownSerial {
                token: token_id,
                serial,
            })
    }
}

fn empty_holding(kind: TokenKind) -> Holding {
    match kind {
        TokenKind::Fungible { .. } => Holding::Fungible(0),
        TokenKind::NonFungible => Holding::NonFungible(Default::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenDefinition;
    use tessera_fees::FractionalFee;

    fn state_with_accounts(count: usize) -> (LedgerState, Vec<AccountId>) {
        let mut state = LedgerState::new();
        let accounts = (0..count).map(|_| state.create_account(0)).collect();
        (state, accounts)
    }

    #[test]
    fn create_token_associates_treasury_and_credits_initial_supply() {
        let (mut state, ids) = state_with_accounts(1);
        let treasury = ids[0];
        let config = LedgerConfig::default();

        let token = state
            .create_token(
                TokenDefinition::fungible("MyToken", "MYT", 8, treasury).with_initial_supply(500),
                &config,
            )
            .unwrap();

        assert!(state.is_associated(treasury, token).unwrap());
        assert_eq!(state.token_balance(treasury, token).unwrap(), 500);
        assert_eq!(state.token_info(token).unwrap().total_supply, 500);
    }

    #[test]
    fn create_token_auto_associates_fractional_collector() {
        let (mut state, ids) = state_with_accounts(2);
        let (treasury, collector) = (ids[0], ids[1]);
        let config = LedgerConfig::default();

        let fees = FeeSchedule::new(vec![FractionalFee::new(1, 10, collector).into()]);
        let token = state
            .create_token(
                TokenDefinition::fungible("MyToken", "MYT", 8, treasury).with_fees(fees),
                &config,
            )
            .unwrap();

        assert!(state.is_associated(collector, token).unwrap());
    }

    #[test]
    fn create_token_rejects_unassociated_denominated_collector() {
        let (mut state, ids) = state_with_accounts(2);
        let (treasury, collector) = (ids[0], ids[1]);
        let config = LedgerConfig::default();

        let fee_token = state
            .create_token(
                TokenDefinition::fungible("FeeToken", "FEE", 8, treasury),
                &config,
            )
            .unwrap();

        // Collector never associated with the denominating token.
        let fees = FeeSchedule::new(vec![FixedFee::denominated(10, fee_token, collector).into()]);
        let err = state
            .create_token(
                TokenDefinition::fungible("MyToken", "MYT", 8, treasury).with_fees(fees),
                &config,
            )
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidFeeConfig(FeeConfigError::CollectorNotAssociated {
                collector,
                token: fee_token
            })
        );
    }

    #[test]
    fn failed_token_creation_leaves_no_trace() {
        let (mut state, ids) = state_with_accounts(1);
        let treasury = ids[0];
        let config = LedgerConfig::default();
        let before = state.clone();

        let fees = FeeSchedule::new(vec![FixedFee::denominated(
            10,
            TokenId::new(777),
            treasury,
        )
        .into()]);
        let err = state
            .create_token(
                TokenDefinition::fungible("MyToken", "MYT", 8, treasury).with_fees(fees),
                &config,
            )
            .unwrap_err();
        assert_eq!(
            err,
            Error::InvalidFeeConfig(FeeConfigError::UnknownDenominatingToken(TokenId::new(777)))
        );
        assert_eq!(state, before);
    }

    #[test]
    fn mint_requires_supply_key() {
        let (mut state, ids) = state_with_accounts(2);
        let (treasury, outsider) = (ids[0], ids[1]);
        let config = LedgerConfig::default();

        let token = state
            .create_token(
                TokenDefinition::fungible("MyToken", "MYT", 8, treasury),
                &config,
            )
            .unwrap();

        let err = state.mint_fungible(token, outsider, 100).unwrap_err();
        assert_eq!(
            err,
            Error::UnauthorizedMint {
                token,
                caller: outsider
            }
        );
        assert_eq!(state.mint_fungible(token, treasury, 100).unwrap(), 100);
    }

    #[test]
    fn nft_serials_mint_sequentially_from_one() {
        let (mut state, ids) = state_with_accounts(1);
        let treasury = ids[0];
        let config = LedgerConfig::default();

        let token = state
            .create_token(
                TokenDefinition::non_fungible("MyNFT", "MNFT", treasury),
                &config,
            )
            .unwrap();

        let serials = state
            .mint_nft(token, treasury, vec![b"a".to_vec(), b"b".to_vec()], &config)
            .unwrap();
        assert_eq!(serials, vec![1, 2]);
        let more = state
            .mint_nft(token, treasury, vec![b"c".to_vec()], &config)
            .unwrap();
        assert_eq!(more, vec![3]);
        assert_eq!(state.owner_of(token, 2).unwrap(), treasury);
        assert_eq!(state.token_balance(treasury, token).unwrap(), 3);
    }

    #[test]
    fn burn_nft_only_from_treasury() {
        let (mut state, ids) = state_with_accounts(2);
        let (treasury, holder) = (ids[0], ids[1]);
        let config = LedgerConfig::default();

        let token = state
            .create_token(
                TokenDefinition::non_fungible("MyNFT", "MNFT", treasury),
                &config,
            )
            .unwrap();
        state
            .mint_nft(token, treasury, vec![b"a".to_vec()], &config)
            .unwrap();

        // Hand the serial to another account outside the settlement path.
        state.associate(holder, token).unwrap();
        if let Some(nft) = state.token_mut(token).unwrap().serials.get_mut(&1) {
            nft.owner = holder;
        }
        if let Some(record) = state.accounts.get_mut(&treasury) {
            if let Some(Holding::NonFungible(owned)) = record.holdings.get_mut(&token) {
                owned.remove(&1);
            }
        }
        if let Some(record) = state.accounts.get_mut(&holder) {
            if let Some(Holding::NonFungible(owned)) = record.holdings.get_mut(&token) {
                owned.insert(1);
            }
        }

        let err = state.burn_nft(token, treasury, 1).unwrap_err();
        assert_eq!(
            err,
            Error::NftNotOwned {
                token,
                serial: 1,
                account: treasury
            }
        );
    }

    #[test]
    fn double_association_is_rejected() {
        let (mut state, ids) = state_with_accounts(2);
        let (treasury, user) = (ids[0], ids[1]);
        let config = LedgerConfig::default();

        let token = state
            .create_token(
                TokenDefinition::fungible("MyToken", "MYT", 8, treasury),
                &config,
            )
            .unwrap();

        state.associate(user, token).unwrap();
        assert_eq!(
            state.associate(user, token).unwrap_err(),
            Error::AlreadyAssociated {
                account: user,
                token
            }
        );
    }

    #[test]
    fn approvals_set_and_clear() {
        let (mut state, ids) = state_with_accounts(2);
        let (owner, spender) = (ids[0], ids[1]);

        state.approve_native(owner, spender, 100).unwrap();
        assert_eq!(state.allowance_native(owner, spender).unwrap(), 100);
        state.approve_native(owner, spender, 0).unwrap();
        assert_eq!(state.allowance_native(owner, spender).unwrap(), 0);
    }
}
