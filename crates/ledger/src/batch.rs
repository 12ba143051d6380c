//! Transfer batches.
//!
//! A `TransferBatch` is the client-facing description of one atomic
//! multi-party transfer: a list of signed native adjustments plus
//! per-token fungible adjustments and NFT movements. Batches are built
//! with the chaining methods here and handed to
//! [`TokenLedger::execute`](crate::TokenLedger::execute); the ledger never
//! applies a batch piecemeal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tessera_core::{AccountId, TokenId};

/// Lifecycle of a batch as it moves through settlement.
///
/// Every batch starts in `Draft`. `execute` advances it through
/// `Validated` and `FeesApplied` to `Committed`, or parks it in
/// `Rejected` if any check fails. Only `Draft` batches are accepted for
/// execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchState {
    /// Under construction; legs may still be added.
    #[default]
    Draft,
    /// Shape and reference checks passed.
    Validated,
    /// Custom fees assessed and folded into the settlement plan.
    FeesApplied,
    /// Applied to the ledger.
    Committed,
    /// Refused; the ledger was left untouched.
    Rejected,
}

/// One signed adjustment to an account's native balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTransfer {
    pub account: AccountId,
    /// Positive credits the account, negative debits it.
    pub amount: i64,
    /// Debit drawn from an allowance granted to the batch operator.
    pub is_approval: bool,
}

/// One signed adjustment to an account's balance in a fungible token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FungibleTransfer {
    pub account: AccountId,
    /// Positive credits the account, negative debits it.
    pub amount: i64,
    /// Debit drawn from an allowance granted to the batch operator.
    pub is_approval: bool,
}

/// Movement of one NFT serial between two accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftTransfer {
    pub sender: AccountId,
    pub receiver: AccountId,
    pub serial: u64,
    /// Transfer authorized through a per-serial approval rather than by
    /// the owner directly.
    pub is_approval: bool,
}

/// All legs of a batch that touch one token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTransfers {
    pub fungible: Vec<FungibleTransfer>,
    pub nft: Vec<NftTransfer>,
}

impl TokenTransfers {
    pub fn is_empty(&self) -> bool {
        self.fungible.is_empty() && self.nft.is_empty()
    }
}

/// An atomic multi-party transfer under construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferBatch {
    operator: AccountId,
    native: Vec<NativeTransfer>,
    tokens: BTreeMap<TokenId, TokenTransfers>,
    state: BatchState,
}

impl TransferBatch {
    /// Starts an empty batch. The operator is the account submitting the
    /// batch; approval legs draw on allowances granted to it.
    pub fn new(operator: AccountId) -> Self {
        Self {
            operator,
            native: Vec::new(),
            tokens: BTreeMap::new(),
            state: BatchState::Draft,
        }
    }

    pub fn operator(&self) -> AccountId {
        self.operator
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.native.is_empty() && self.tokens.values().all(TokenTransfers::is_empty)
    }

    pub fn native_transfers(&self) -> &[NativeTransfer] {
        &self.native
    }

    pub fn token_transfers(&self) -> &BTreeMap<TokenId, TokenTransfers> {
        &self.tokens
    }

    pub(crate) fn set_state(&mut self, state: BatchState) {
        self.state = state;
    }

    // ------------------------------------------------------------------
    // Native legs
    // ------------------------------------------------------------------

    /// Adds one signed native adjustment.
    pub fn adjust_native(&mut self, account: AccountId, amount: i64) -> &mut Self {
        self.native.push(NativeTransfer {
            account,
            amount,
            is_approval: false,
        });
        self
    }

    /// Adds one signed native adjustment drawn from an allowance.
    pub fn adjust_native_approved(&mut self, account: AccountId, amount: i64) -> &mut Self {
        self.native.push(NativeTransfer {
            account,
            amount,
            is_approval: true,
        });
        self
    }

    /// Adds a matched native debit and credit pair.
    pub fn transfer_native(&mut self, from: AccountId, to: AccountId, amount: i64) -> &mut Self {
        self.adjust_native(from, negate(amount)).adjust_native(to, amount)
    }

    /// Like [`transfer_native`](Self::transfer_native), but the debit is
    /// drawn from `from`'s allowance to the operator.
    pub fn transfer_native_approved(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> &mut Self {
        self.adjust_native_approved(from, negate(amount)).adjust_native(to, amount)
    }

    // ------------------------------------------------------------------
    // Fungible token legs
    // ------------------------------------------------------------------

    /// Adds one signed fungible adjustment for `token`.
    pub fn adjust_fungible(
        &mut self,
        token: TokenId,
        account: AccountId,
        amount: i64,
    ) -> &mut Self {
        self.tokens.entry(token).or_default().fungible.push(FungibleTransfer {
            account,
            amount,
            is_approval: false,
        });
        self
    }

    /// Adds one signed fungible adjustment drawn from an allowance.
    pub fn adjust_fungible_approved(
        &mut self,
        token: TokenId,
        account: AccountId,
        amount: i64,
    ) -> &mut Self {
        self.tokens.entry(token).or_default().fungible.push(FungibleTransfer {
            account,
            amount,
            is_approval: true,
        });
        self
    }

    /// Adds a matched fungible debit and credit pair for `token`.
    pub fn transfer_fungible(
        &mut self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> &mut Self {
        self.adjust_fungible(token, from, negate(amount))
            .adjust_fungible(token, to, amount)
    }

    /// Like [`transfer_fungible`](Self::transfer_fungible), but the debit
    /// is drawn from `from`'s allowance to the operator.
    pub fn transfer_fungible_approved(
        &mut self,
        token: TokenId,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> &mut Self {
        self.adjust_fungible_approved(token, from, negate(amount))
            .adjust_fungible(token, to, amount)
    }

    // ------------------------------------------------------------------
    // NFT legs
    // ------------------------------------------------------------------

    /// Moves one serial of `token` from `sender` to `receiver`.
    pub fn transfer_nft(
        &mut self,
        token: TokenId,
        sender: AccountId,
        receiver: AccountId,
        serial: u64,
    ) -> &mut Self {
        self.tokens.entry(token).or_default().nft.push(NftTransfer {
            sender,
            receiver,
            serial,
            is_approval: false,
        });
        self
    }

    /// Like [`transfer_nft`](Self::transfer_nft), but authorized through
    /// the serial's approved spender.
    pub fn transfer_nft_approved(
        &mut self,
        token: TokenId,
        sender: AccountId,
        receiver: AccountId,
        serial: u64,
    ) -> &mut Self {
        self.tokens.entry(token).or_default().nft.push(NftTransfer {
            sender,
            receiver,
            serial,
            is_approval: true,
        });
        self
    }
}

/// Negation that cannot panic; `i64::MIN` saturates and the resulting
/// imbalance is caught by the net-zero check instead.
fn negate(amount: i64) -> i64 {
    amount.checked_neg().unwrap_or(i64::MAX)
}
