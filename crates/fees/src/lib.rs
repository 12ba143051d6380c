//! Custom fee schedules and their assessment arithmetic.
//!
//! A token carries an ordered list of [`CustomFee`] entries fixed at
//! creation time. Three kinds exist:
//!
//! - [`FixedFee`]: a flat amount charged to the sender of a transfer, on
//!   top of the transferred amount, in native currency or a fungible token.
//! - [`FractionalFee`]: a clamped fraction of a fungible transfer, deducted
//!   from what the receiver gets. Fungible tokens only.
//! - [`RoyaltyFee`]: a fraction of the value exchanged for an NFT, with an
//!   optional fixed fallback when no value changes hands. NFTs only.
//!
//! This crate owns the fee types, their creation-time validation and the
//! pure per-fee arithmetic. Deciding who pays, exemptions and ordering
//! across a whole transfer batch is the planner's job in `tessera-ledger`.

mod schedule;

use thiserror::Error;

use tessera_core::{AccountId, TokenId};

pub use schedule::{CustomFee, FeeSchedule, FixedFee, FractionalFee, RoyaltyFee};

/// Rejection reasons for a fee schedule at token creation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeConfigError {
    /// A fee fraction was given a zero denominator.
    #[error("fee fraction has a zero denominator")]
    ZeroDenominator,

    /// A fee fraction was given a zero numerator.
    #[error("fee fraction has a zero numerator")]
    ZeroNumerator,

    /// A fixed fee was given a zero amount.
    #[error("fixed fee amount must be nonzero")]
    ZeroFixedAmount,

    /// A royalty would take more than the whole exchanged value.
    #[error("royalty fraction {numerator}/{denominator} exceeds the exchanged value")]
    RoyaltyExceedsOne { numerator: u64, denominator: u64 },

    /// A fractional fee's maximum undercuts its minimum.
    #[error("fractional fee maximum {maximum} is below minimum {minimum}")]
    MaximumBelowMinimum { minimum: u64, maximum: u64 },

    /// A fractional fee was attached to a non-fungible token.
    #[error("fractional fees apply only to fungible tokens")]
    FractionalOnNonFungible,

    /// A royalty fee was attached to a fungible token.
    #[error("royalty fees apply only to non-fungible tokens")]
    RoyaltyOnFungible,

    /// A fixed fee denominates in a token the ledger does not know.
    #[error("fee denominating token {0} does not exist")]
    UnknownDenominatingToken(TokenId),

    /// A fixed fee denominates in a non-fungible token.
    #[error("fee denominating token {0} is not fungible")]
    NonFungibleDenomination(TokenId),

    /// A fee names a collector account the ledger does not know.
    #[error("fee collector account {0} does not exist")]
    UnknownCollector(AccountId),

    /// A collector cannot receive the token its fee is denominated in.
    #[error("fee collector {collector} is not associated with denominating token {token}")]
    CollectorNotAssociated {
        collector: AccountId,
        token: TokenId,
    },
}
