//! Fee schedule types and per-fee assessment.

use serde::{Deserialize, Serialize};

use tessera_core::{AccountId, Denomination, TokenId, TokenKind};

use crate::FeeConfigError;

/// Truncating fraction with a 128-bit intermediate, saturating at `u64::MAX`.
fn fraction_of(amount: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let raw = u128::from(amount) * u128::from(numerator) / u128::from(denominator);
    u64::try_from(raw).unwrap_or(u64::MAX)
}

/// A flat fee charged to the sender of a triggering transfer leg, on top of
/// the transferred amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedFee {
    /// Amount charged, in the smallest unit of the denomination.
    pub amount: u64,
    /// Currency the fee is collected in.
    pub denomination: Denomination,
    /// Account credited with the fee.
    pub collector: AccountId,
    /// When set, no collector of the token's schedule ever pays this fee.
    pub all_collectors_exempt: bool,
}

impl FixedFee {
    /// Fixed fee collected in the native currency.
    pub fn native(amount: u64, collector: AccountId) -> Self {
        Self {
            amount,
            denomination: Denomination::Native,
            collector,
            all_collectors_exempt: false,
        }
    }

    /// Fixed fee collected in a fungible token.
    pub fn denominated(amount: u64, token: TokenId, collector: AccountId) -> Self {
        Self {
            amount,
            denomination: Denomination::Token(token),
            collector,
            all_collectors_exempt: false,
        }
    }

    /// Exempts every collector of the owning schedule from this fee.
    pub fn exempting_collectors(mut self) -> Self {
        self.all_collectors_exempt = true;
        self
    }
}

/// A clamped fraction of a fungible transfer, deducted from what the
/// receiver gets and collected in the transferred token itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FractionalFee {
    pub numerator: u64,
    pub denominator: u64,
    /// Lower bound on the assessed amount.
    pub minimum: u64,
    /// Optional upper bound on the assessed amount.
    pub maximum: Option<u64>,
    /// Account credited with the fee.
    pub collector: AccountId,
}

impl FractionalFee {
    /// Unbounded fractional fee.
    pub fn new(numerator: u64, denominator: u64, collector: AccountId) -> Self {
        Self {
            numerator,
            denominator,
            minimum: 0,
            maximum: None,
            collector,
        }
    }

    /// Sets the lower bound on the assessed amount.
    pub fn with_minimum(mut self, minimum: u64) -> Self {
        self.minimum = minimum;
        self
    }

    /// Sets the upper bound on the assessed amount.
    pub fn with_maximum(mut self, maximum: u64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Deduction for a leg crediting `amount` units.
    ///
    /// The truncated fraction is raised to `minimum`, lowered to `maximum`,
    /// and finally capped at the transferred amount itself, so the receiver
    /// nets at worst zero.
    pub fn assess(&self, amount: u64) -> u64 {
        let mut fee = fraction_of(amount, self.numerator, self.denominator);
        fee = fee.max(self.minimum);
        if let Some(maximum) = self.maximum {
            fee = fee.min(maximum);
        }
        fee.min(amount)
    }
}

/// A fraction of the value exchanged for an NFT, charged to the party
/// receiving that value. Falls back to a fixed fee on the NFT receiver
/// when the transfer carries no fungible value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoyaltyFee {
    pub numerator: u64,
    pub denominator: u64,
    /// Account credited with the royalty.
    pub collector: AccountId,
    /// Charged to the NFT receiver when no value is exchanged.
    pub fallback: Option<FixedFee>,
}

impl RoyaltyFee {
    /// Royalty without a fallback.
    pub fn new(numerator: u64, denominator: u64, collector: AccountId) -> Self {
        Self {
            numerator,
            denominator,
            collector,
            fallback: None,
        }
    }

    /// Attaches the no-value-exchange fallback fee.
    pub fn with_fallback(mut self, fallback: FixedFee) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Royalty taken from `value` units of exchanged consideration.
    pub fn assess(&self, value: u64) -> u64 {
        fraction_of(value, self.numerator, self.denominator).min(value)
    }
}

/// One entry of a token's custom fee schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomFee {
    Fixed(FixedFee),
    Fractional(FractionalFee),
    Royalty(RoyaltyFee),
}

impl CustomFee {
    /// The entry's primary collector.
    pub fn collector(&self) -> AccountId {
        match self {
            CustomFee::Fixed(fee) => fee.collector,
            CustomFee::Fractional(fee) => fee.collector,
            CustomFee::Royalty(fee) => fee.collector,
        }
    }
}

impl From<FixedFee> for CustomFee {
    fn from(fee: FixedFee) -> Self {
        CustomFee::Fixed(fee)
    }
}

impl From<FractionalFee> for CustomFee {
    fn from(fee: FractionalFee) -> Self {
        CustomFee::Fractional(fee)
    }
}

impl From<RoyaltyFee> for CustomFee {
    fn from(fee: RoyaltyFee) -> Self {
        CustomFee::Royalty(fee)
    }
}

/// Ordered list of custom fees attached to a token at creation.
///
/// Order is significant: the planner applies entries first to last, each
/// against the state left by the previous one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    fees: Vec<CustomFee>,
}

impl FeeSchedule {
    /// Schedule from entries in application order.
    pub fn new(fees: Vec<CustomFee>) -> Self {
        Self { fees }
    }

    /// Schedule with no custom fees.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fees.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fees.len()
    }

    /// Entries in application order.
    pub fn entries(&self) -> &[CustomFee] {
        &self.fees
    }

    /// True when `account` collects any fee of this schedule, fallback
    /// collectors included.
    pub fn collects(&self, account: AccountId) -> bool {
        self.fees.iter().any(|fee| {
            if fee.collector() == account {
                return true;
            }
            match fee {
                CustomFee::Royalty(royalty) => royalty
                    .fallback
                    .as_ref()
                    .is_some_and(|fallback| fallback.collector == account),
                _ => false,
            }
        })
    }

    /// Checks the schedule against the kind of the token carrying it.
    ///
    /// Cross-record checks (denominating token exists and is fungible,
    /// collectors exist and hold the right associations) are the ledger's
    /// responsibility at token creation.
    pub fn validate(&self, kind: TokenKind) -> Result<(), FeeConfigError> {
        for fee in &self.fees {
            match fee {
                CustomFee::Fixed(fixed) => validate_fixed(fixed)?,
                CustomFee::Fractional(fractional) => {
                    if !kind.is_fungible() {
                        return Err(FeeConfigError::FractionalOnNonFungible);
                    }
                    validate_fraction(fractional.numerator, fractional.denominator)?;
                    if let Some(maximum) = fractional.maximum {
                        if maximum < fractional.minimum {
                            return Err(FeeConfigError::MaximumBelowMinimum {
                                minimum: fractional.minimum,
                                maximum,
                            });
                        }
                    }
                }
                CustomFee::Royalty(royalty) => {
                    if kind.is_fungible() {
                        return Err(FeeConfigError::RoyaltyOnFungible);
                    }
                    validate_fraction(royalty.numerator, royalty.denominator)?;
                    if royalty.numerator > royalty.denominator {
                        return Err(FeeConfigError::RoyaltyExceedsOne {
                            numerator: royalty.numerator,
                            denominator: royalty.denominator,
                        });
                    }
                    if let Some(fallback) = &royalty.fallback {
                        validate_fixed(fallback)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl From<Vec<CustomFee>> for FeeSchedule {
    fn from(fees: Vec<CustomFee>) -> Self {
        Self::new(fees)
    }
}

fn validate_fixed(fee: &FixedFee) -> Result<(), FeeConfigError> {
    if fee.amount == 0 {
        return Err(FeeConfigError::ZeroFixedAmount);
    }
    Ok(())
}

fn validate_fraction(numerator: u64, denominator: u64) -> Result<(), FeeConfigError> {
    if denominator == 0 {
        return Err(FeeConfigError::ZeroDenominator);
    }
    if numerator == 0 {
        return Err(FeeConfigError::ZeroNumerator);
    }
    Ok(())
}
