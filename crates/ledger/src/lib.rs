//! Ledger store, transfer planner and fee settlement.
//!
//! This crate is the engine proper. A [`TokenLedger`] owns accounts, token
//! definitions with their custom fee schedules, associations, allowances
//! and pending airdrops. Callers describe a group of balance movements as
//! a [`TransferBatch`]; [`TokenLedger::execute`] validates it, assesses
//! every applicable custom fee in schedule order, and applies the combined
//! effect atomically. The batch either commits as a whole or leaves the
//! ledger untouched.
//!
//! Planning is pure: [`TokenLedger::preview`] runs the same validation and
//! fee assessment against the current state and returns the resulting
//! [`SettlementPlan`] without mutating anything.

mod account;
mod airdrop;
mod batch;
mod ledger;
mod planner;
mod settlement;
mod state;
mod token;

use thiserror::Error;

use tessera_core::{AccountId, Denomination, TokenId};
use tessera_fees::FeeConfigError;

pub use airdrop::{AirdropId, AirdropKind, AirdropOutcome, PendingAirdrop};
pub use batch::{
    BatchState, FungibleTransfer, NativeTransfer, NftTransfer, TokenTransfers, TransferBatch,
};
pub use ledger::TokenLedger;
pub use settlement::{AllowanceSpends, AssessedFee, CommittedEffects, NftMove, SettlementPlan};
pub use token::{TokenDefinition, TokenInfo};

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Rejection reasons surfaced by the engine.
///
/// Every variant is detected while planning, before any state mutation;
/// a rejected batch leaves the ledger exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An account touched a token it has not opted into.
    #[error("account {account} is not associated with token {token}")]
    NotAssociated { account: AccountId, token: TokenId },

    /// An account associated with the same token twice.
    #[error("account {account} is already associated with token {token}")]
    AlreadyAssociated { account: AccountId, token: TokenId },

    /// A debit, fees included, exceeds what the account holds.
    #[error(
        "account {account} holds {available} of {denomination}, {required} required"
    )]
    InsufficientBalance {
        account: AccountId,
        denomination: Denomination,
        required: u64,
        available: u64,
    },

    /// An approval leg exceeds the allowance standing for the operator.
    #[error(
        "allowance from {owner} to {spender} covers {available} of {denomination}, {required} required"
    )]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        denomination: Denomination,
        required: u64,
        available: u64,
    },

    /// A transfer list does not sum to zero.
    #[error("transfers of {denomination} net to {net}, expected zero")]
    ImbalancedBatch { denomination: Denomination, net: i128 },

    /// A fee schedule failed validation at token creation.
    #[error("invalid fee configuration: {0}")]
    InvalidFeeConfig(#[from] FeeConfigError),

    /// Mint or burn attempted by an account other than the supply key
    /// holder.
    #[error("account {caller} does not hold the supply key of token {token}")]
    UnauthorizedMint { token: TokenId, caller: AccountId },

    /// An NFT leg named a sender that does not own the serial.
    #[error("account {account} does not own serial {serial} of token {token}")]
    NftNotOwned {
        token: TokenId,
        serial: u64,
        account: AccountId,
    },

    /// Referenced account does not exist.
    #[error("account {0} does not exist")]
    UnknownAccount(AccountId),

    /// Referenced token does not exist.
    #[error("token {0} does not exist")]
    UnknownToken(TokenId),

    /// Referenced serial was never minted or has been burned.
    #[error("serial {serial} of token {token} does not exist")]
    UnknownSerial { token: TokenId, serial: u64 },

    /// Operation applied to the wrong token kind.
    #[error("token {token} does not support {operation}")]
    KindMismatch {
        token: TokenId,
        operation: &'static str,
    },

    /// Caller is not the party entitled to this operation.
    #[error("account {account} may not {operation}")]
    Unauthorized {
        account: AccountId,
        operation: &'static str,
    },

    /// Referenced pending airdrop does not exist.
    #[error("pending airdrop {0} does not exist")]
    PendingAirdropNotFound(AirdropId),

    /// Batch exceeds the configured transfer-count limits.
    #[error("batch carries {actual} transfers, limit is {limit}")]
    BatchTooLarge { limit: usize, actual: usize },

    /// Arithmetic on amounts left the representable range.
    #[error("amount arithmetic overflowed")]
    AmountOverflow,

    /// Catch-all for structurally invalid requests.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}
