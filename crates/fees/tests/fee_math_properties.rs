//! Property-Based Fee Arithmetic Testing
//!
//! Exercises the fractional and royalty assessment math across the full
//! input space to pin down the truncation, clamping and capping rules the
//! planner relies on.

use proptest::prelude::*;

use tessera_core::{AccountId, TokenKind};
use tessera_fees::{FeeSchedule, FractionalFee, RoyaltyFee};

fn collector() -> AccountId {
    AccountId::new(1)
}

/// Properties of fractional fee assessment
mod fractional_properties {
    use super::*;

    proptest! {
        /// Property: the deduction never exceeds the transferred amount,
        /// whatever the fraction and bounds.
        #[test]
        fn prop_deduction_never_exceeds_amount(
            amount in any::<u64>(),
            numerator in 1u64..=1_000,
            denominator in 1u64..=1_000,
            minimum in 0u64..=u64::MAX,
        ) {
            let fee = FractionalFee::new(numerator, denominator, collector())
                .with_minimum(minimum);
            prop_assert!(fee.assess(amount) <= amount);
        }

        /// Property: with no bounds in play, assessment is the truncated
        /// fraction exactly.
        #[test]
        fn prop_unbounded_assessment_is_truncated_fraction(
            amount in 0u64..=1_000_000_000_000,
            numerator in 1u64..=1_000,
            denominator in 1u64..=1_000,
        ) {
            let fee = FractionalFee::new(numerator, denominator, collector());
            let expected = (u128::from(amount) * u128::from(numerator)
                / u128::from(denominator)).min(u128::from(amount)) as u64;
            prop_assert_eq!(fee.assess(amount), expected);
        }

        /// Property: the assessed amount respects minimum and maximum when
        /// they leave room below the transferred amount.
        #[test]
        fn prop_bounds_are_respected(
            amount in 0u64..=1_000_000_000_000,
            numerator in 1u64..=100,
            denominator in 1u64..=100,
            minimum in 0u64..=1_000,
            extra in 0u64..=1_000_000,
        ) {
            let maximum = minimum + extra;
            let fee = FractionalFee::new(numerator, denominator, collector())
                .with_minimum(minimum)
                .with_maximum(maximum);
            let assessed = fee.assess(amount);

            prop_assert!(assessed <= maximum.min(amount));
            if minimum <= amount {
                prop_assert!(assessed >= minimum.min(amount));
            }
        }

        /// Property: assessment is monotone in the transferred amount.
        #[test]
        fn prop_monotone_in_amount(
            amount in 0u64..=1_000_000_000,
            step in 0u64..=1_000_000,
            numerator in 1u64..=100,
            denominator in 1u64..=100,
            minimum in 0u64..=1_000,
        ) {
            let fee = FractionalFee::new(numerator, denominator, collector())
                .with_minimum(minimum);
            prop_assert!(fee.assess(amount) <= fee.assess(amount + step));
        }
    }
}

/// Properties of royalty fee assessment
mod royalty_properties {
    use super::*;

    proptest! {
        /// Property: a royalty with numerator <= denominator never takes
        /// more than the exchanged value.
        #[test]
        fn prop_royalty_never_exceeds_value(
            value in any::<u64>(),
            denominator in 1u64..=1_000,
            numerator_fraction in 0.0f64..=1.0,
        ) {
            let numerator = ((denominator as f64) * numerator_fraction) as u64;
            let numerator = numerator.clamp(1, denominator);
            let fee = RoyaltyFee::new(numerator, denominator, collector());
            prop_assert!(fee.assess(value) <= value);
        }

        /// Property: royalty assessment truncates, never rounds up.
        #[test]
        fn prop_royalty_truncates(
            value in 0u64..=1_000_000_000_000,
            numerator in 1u64..=100,
        ) {
            let denominator = 100u64;
            let numerator = numerator.min(denominator);
            let fee = RoyaltyFee::new(numerator, denominator, collector());
            let assessed = u128::from(fee.assess(value));
            let scaled = u128::from(value) * u128::from(numerator);
            prop_assert!(assessed * u128::from(denominator) <= scaled);
            prop_assert!((assessed + 1) * u128::from(denominator) > scaled);
        }
    }
}

/// Properties of schedule validation
mod validation_properties {
    use super::*;

    proptest! {
        /// Property: zero denominators are rejected for every fungible kind.
        #[test]
        fn prop_zero_denominator_rejected(
            numerator in 1u64..=1_000,
            decimals in 0u8..=18,
        ) {
            let schedule = FeeSchedule::new(vec![
                FractionalFee::new(numerator, 0, collector()).into(),
            ]);
            let result = schedule.validate(TokenKind::Fungible { decimals });
            prop_assert!(result.is_err());
        }

        /// Property: royalties above unity are rejected, at or below unity pass.
        #[test]
        fn prop_royalty_unity_boundary(
            numerator in 1u64..=2_000,
            denominator in 1u64..=1_000,
        ) {
            let schedule = FeeSchedule::new(vec![
                RoyaltyFee::new(numerator, denominator, collector()).into(),
            ]);
            let result = schedule.validate(TokenKind::NonFungible);
            if numerator > denominator {
                prop_assert!(result.is_err());
            } else {
                prop_assert!(result.is_ok());
            }
        }
    }
}
