//! Royalty fee tests
//!
//! End-to-end coverage of NFT sales and gifts under royalty schedules:
//! - Royalties carved out of native and token-denominated sale proceeds
//! - Fallback fixed fees on transfers without exchanged value
//! - Treasury and collector exemptions
//! - Sequential royalties compounding on the remainder
//! - Serial-level approvals and their consumption

use tessera_core::{AccountId, Denomination, TokenId};
use tessera_fees::{FeeSchedule, FixedFee, RoyaltyFee};
use tessera_ledger::{Error, TokenDefinition, TokenLedger, TransferBatch};

const UNIT: u64 = 100_000_000;

fn ledger_with_accounts(native: u64, count: usize) -> (TokenLedger, Vec<AccountId>) {
    let ledger = TokenLedger::new();
    let accounts = (0..count).map(|_| ledger.create_account(native)).collect();
    (ledger, accounts)
}

fn nft_token(ledger: &TokenLedger, treasury: AccountId, fees: FeeSchedule) -> TokenId {
    ledger
        .create_token(
            TokenDefinition::non_fungible("MyNFT", "MNFT", treasury).with_fees(fees),
        )
        .unwrap()
}

/// Mints one serial and hands it from the treasury to `owner` fee-free.
fn mint_to(ledger: &TokenLedger, token: TokenId, treasury: AccountId, owner: AccountId) -> u64 {
    let serials = ledger
        .mint_nft(token, treasury, vec![b"artwork".to_vec()])
        .unwrap();
    let serial = serials[0];
    ledger.associate(owner, token).unwrap();
    let mut batch = TransferBatch::new(treasury);
    batch.transfer_nft(token, treasury, owner, serial);
    ledger.execute(&mut batch).unwrap();
    serial
}

// ============================================================================
// Royalties on Exchanged Value
// ============================================================================

#[test]
fn royalty_takes_a_tenth_of_the_native_sale_price() {
    let (ledger, ids) = ledger_with_accounts(50 * UNIT, 4);
    let (treasury, collector, seller, buyer) = (ids[0], ids[1], ids[2], ids[3]);
    let fees = FeeSchedule::new(vec![RoyaltyFee::new(1, 10, collector).into()]);
    let token = nft_token(&ledger, treasury, fees);
    let serial = mint_to(&ledger, token, treasury, seller);
    ledger.associate(buyer, token).unwrap();

    // Buyer pays 20 whole units for the serial.
    let mut batch = TransferBatch::new(buyer);
    batch
        .transfer_native(buyer, seller, (20 * UNIT) as i64)
        .transfer_nft(token, seller, buyer, serial);
    let effects = ledger.execute(&mut batch).unwrap();

    assert_eq!(ledger.owner_of(token, serial).unwrap(), buyer);
    assert_eq!(ledger.native_balance(buyer).unwrap(), 30 * UNIT);
    assert_eq!(ledger.native_balance(seller).unwrap(), 68 * UNIT);
    assert_eq!(ledger.native_balance(collector).unwrap(), 52 * UNIT);

    assert_eq!(effects.assessed_fees.len(), 1);
    let fee = &effects.assessed_fees[0];
    assert_eq!(fee.collector, collector);
    assert_eq!(fee.denomination, Denomination::Native);
    assert_eq!(fee.amount, 2 * UNIT);
    assert_eq!(fee.payers, vec![seller]);
}

#[test]
fn royalty_on_a_token_denominated_price() {
    let (ledger, ids) = ledger_with_accounts(0, 4);
    let (treasury, collector, seller, buyer) = (ids[0], ids[1], ids[2], ids[3]);

    let payment = ledger
        .create_token(
            TokenDefinition::fungible("Payment", "PAY", 8, treasury)
                .with_initial_supply(1_000 * UNIT),
        )
        .unwrap();
    for account in [collector, seller, buyer] {
        ledger.associate(account, payment).unwrap();
    }
    let mut funding = TransferBatch::new(treasury);
    funding.transfer_fungible(payment, treasury, buyer, (100 * UNIT) as i64);
    ledger.execute(&mut funding).unwrap();

    let fees = FeeSchedule::new(vec![RoyaltyFee::new(1, 10, collector).into()]);
    let token = nft_token(&ledger, treasury, fees);
    let serial = mint_to(&ledger, token, treasury, seller);
    ledger.associate(buyer, token).unwrap();

    let mut batch = TransferBatch::new(buyer);
    batch
        .transfer_fungible(payment, buyer, seller, (20 * UNIT) as i64)
        .transfer_nft(token, seller, buyer, serial);
    ledger.execute(&mut batch).unwrap();

    assert_eq!(ledger.token_balance(seller, payment).unwrap(), 18 * UNIT);
    assert_eq!(ledger.token_balance(collector, payment).unwrap(), 2 * UNIT);
    assert_eq!(ledger.token_balance(buyer, payment).unwrap(), 80 * UNIT);
}

#[test]
fn sequential_royalties_compound_on_the_remainder() {
    let (ledger, ids) = ledger_with_accounts(50 * UNIT, 5);
    let (treasury, c1, c2, seller, buyer) = (ids[0], ids[1], ids[2], ids[3], ids[4]);
    let fees = FeeSchedule::new(vec![
        RoyaltyFee::new(1, 10, c1).into(),
        RoyaltyFee::new(1, 10, c2).into(),
    ]);
    let token = nft_token(&ledger, treasury, fees);
    let serial = mint_to(&ledger, token, treasury, seller);
    ledger.associate(buyer, token).unwrap();

    let mut batch = TransferBatch::new(buyer);
    batch
        .transfer_native(buyer, seller, (20 * UNIT) as i64)
        .transfer_nft(token, seller, buyer, serial);
    ledger.execute(&mut batch).unwrap();

    // First royalty takes 2 of 20, the second a tenth of the remaining 18.
    assert_eq!(ledger.native_balance(c1).unwrap(), 52 * UNIT);
    assert_eq!(ledger.native_balance(c2).unwrap(), 50 * UNIT + 18 * UNIT / 10);
    assert_eq!(
        ledger.native_balance(seller).unwrap(),
        50 * UNIT + 20 * UNIT - 2 * UNIT - 18 * UNIT / 10
    );
}

#[test]
fn fixed_and_royalty_fees_on_one_schedule_both_assess() {
    let (ledger, ids) = ledger_with_accounts(50 * UNIT, 5);
    let (treasury, c1, c2, seller, buyer) = (ids[0], ids[1], ids[2], ids[3], ids[4]);
    let fees = FeeSchedule::new(vec![
        FixedFee::native(UNIT, c1).into(),
        RoyaltyFee::new(1, 10, c2).into(),
    ]);
    let token = nft_token(&ledger, treasury, fees);
    let serial = mint_to(&ledger, token, treasury, seller);
    ledger.associate(buyer, token).unwrap();

    let mut batch = TransferBatch::new(buyer);
    batch
        .transfer_native(buyer, seller, (20 * UNIT) as i64)
        .transfer_nft(token, seller, buyer, serial);
    let effects = ledger.execute(&mut batch).unwrap();

    assert_eq!(effects.assessed_fees.len(), 2);
    // Seller pays the fixed fee on top and the royalty out of proceeds.
    assert_eq!(ledger.native_balance(seller).unwrap(), 67 * UNIT);
    assert_eq!(ledger.native_balance(c1).unwrap(), 51 * UNIT);
    assert_eq!(ledger.native_balance(c2).unwrap(), 52 * UNIT);
    assert_eq!(ledger.native_balance(buyer).unwrap(), 30 * UNIT);
}

// ============================================================================
// Fallback Fees
// ============================================================================

#[test]
fn fallback_charges_the_receiver_when_no_value_is_exchanged() {
    let (ledger, ids) = ledger_with_accounts(50 * UNIT, 4);
    let (treasury, collector, seller, receiver) = (ids[0], ids[1], ids[2], ids[3]);
    let fees = FeeSchedule::new(vec![RoyaltyFee::new(1, 10, collector)
        .with_fallback(FixedFee::native(5 * UNIT, collector))
        .into()]);
    let token = nft_token(&ledger, treasury, fees);
    let serial = mint_to(&ledger, token, treasury, seller);
    ledger.associate(receiver, token).unwrap();

    // A gift: the serial moves without any paired value leg.
    let mut batch = TransferBatch::new(seller);
    batch.transfer_nft(token, seller, receiver, serial);
    let effects = ledger.execute(&mut batch).unwrap();

    assert_eq!(ledger.owner_of(token, serial).unwrap(), receiver);
    assert_eq!(ledger.native_balance(receiver).unwrap(), 45 * UNIT);
    assert_eq!(ledger.native_balance(collector).unwrap(), 55 * UNIT);
    assert_eq!(ledger.native_balance(seller).unwrap(), 50 * UNIT);
    assert_eq!(effects.assessed_fees[0].payers, vec![receiver]);
}

#[test]
fn fallback_in_a_fee_token_requires_receiver_association() {
    let (ledger, ids) = ledger_with_accounts(0, 4);
    let (treasury, collector, seller, receiver) = (ids[0], ids[1], ids[2], ids[3]);

    let fee_token = ledger
        .create_token(
            TokenDefinition::fungible("FeeToken", "FEE", 8, treasury)
                .with_initial_supply(1_000 * UNIT),
        )
        .unwrap();
    ledger.associate(collector, fee_token).unwrap();

    let fees = FeeSchedule::new(vec![RoyaltyFee::new(1, 10, collector)
        .with_fallback(FixedFee::denominated(UNIT, fee_token, collector))
        .into()]);
    let token = nft_token(&ledger, treasury, fees);
    let serial = mint_to(&ledger, token, treasury, seller);
    ledger.associate(receiver, token).unwrap();

    let mut batch = TransferBatch::new(seller);
    batch.transfer_nft(token, seller, receiver, serial);
    let err = ledger.execute(&mut batch).unwrap_err();

    assert_eq!(
        err,
        Error::NotAssociated {
            account: receiver,
            token: fee_token
        }
    );
    assert_eq!(ledger.owner_of(token, serial).unwrap(), seller);
}

#[test]
fn gift_without_a_fallback_charges_nothing() {
    let (ledger, ids) = ledger_with_accounts(50 * UNIT, 4);
    let (treasury, collector, seller, receiver) = (ids[0], ids[1], ids[2], ids[3]);
    let fees = FeeSchedule::new(vec![RoyaltyFee::new(1, 10, collector).into()]);
    let token = nft_token(&ledger, treasury, fees);
    let serial = mint_to(&ledger, token, treasury, seller);
    ledger.associate(receiver, token).unwrap();

    let mut batch = TransferBatch::new(seller);
    batch.transfer_nft(token, seller, receiver, serial);
    let effects = ledger.execute(&mut batch).unwrap();

    assert!(effects.assessed_fees.is_empty());
    assert_eq!(ledger.owner_of(token, serial).unwrap(), receiver);
}

#[test]
fn fallback_and_fixed_fee_both_charge_on_a_gift() {
    let (ledger, ids) = ledger_with_accounts(50 * UNIT, 5);
    let (treasury, c1, c2, seller, receiver) = (ids[0], ids[1], ids[2], ids[3], ids[4]);
    let fees = FeeSchedule::new(vec![
        FixedFee::native(UNIT, c1).into(),
        RoyaltyFee::new(1, 10, c2)
            .with_fallback(FixedFee::native(15 * UNIT, c2))
            .into(),
    ]);
    let token = nft_token(&ledger, treasury, fees);
    let serial = mint_to(&ledger, token, treasury, seller);
    ledger.associate(receiver, token).unwrap();

    let mut batch = TransferBatch::new(seller);
    batch.transfer_nft(token, seller, receiver, serial);
    let effects = ledger.execute(&mut batch).unwrap();

    assert_eq!(effects.assessed_fees.len(), 2);
    assert_eq!(ledger.native_balance(seller).unwrap(), 49 * UNIT);
    assert_eq!(ledger.native_balance(receiver).unwrap(), 35 * UNIT);
    assert_eq!(ledger.native_balance(c1).unwrap(), 51 * UNIT);
    assert_eq!(ledger.native_balance(c2).unwrap(), 65 * UNIT);
}

// ============================================================================
// Exemptions
// ============================================================================

#[test]
fn treasury_nft_distribution_is_fee_free() {
    let (ledger, ids) = ledger_with_accounts(50 * UNIT, 3);
    let (treasury, collector, alice) = (ids[0], ids[1], ids[2]);
    let fees = FeeSchedule::new(vec![RoyaltyFee::new(1, 10, collector)
        .with_fallback(FixedFee::native(5 * UNIT, collector))
        .into()]);
    let token = nft_token(&ledger, treasury, fees);
    let serials = ledger
        .mint_nft(token, treasury, vec![b"artwork".to_vec()])
        .unwrap();
    ledger.associate(alice, token).unwrap();

    // Even the fallback stays unassessed on a treasury distribution.
    let mut batch = TransferBatch::new(treasury);
    batch.transfer_nft(token, treasury, alice, serials[0]);
    let effects = ledger.execute(&mut batch).unwrap();

    assert!(effects.assessed_fees.is_empty());
    assert_eq!(ledger.owner_of(token, serials[0]).unwrap(), alice);
    assert_eq!(ledger.native_balance(alice).unwrap(), 50 * UNIT);
}

// ============================================================================
// Serial Approvals
// ============================================================================

#[test]
fn approved_spender_moves_the_serial_and_the_approval_clears() {
    let (ledger, ids) = ledger_with_accounts(0, 4);
    let (treasury, owner, spender, bob) = (ids[0], ids[1], ids[2], ids[3]);
    let token = nft_token(&ledger, treasury, FeeSchedule::empty());
    let serial = mint_to(&ledger, token, treasury, owner);
    ledger.associate(bob, token).unwrap();

    ledger.approve_nft(owner, spender, token, serial).unwrap();
    assert_eq!(
        ledger.approved_spender(token, serial).unwrap(),
        Some(spender)
    );

    let mut batch = TransferBatch::new(spender);
    batch.transfer_nft_approved(token, owner, bob, serial);
    ledger.execute(&mut batch).unwrap();

    assert_eq!(ledger.owner_of(token, serial).unwrap(), bob);
    assert_eq!(ledger.approved_spender(token, serial).unwrap(), None);
}

#[test]
fn unapproved_spender_cannot_move_the_serial() {
    let (ledger, ids) = ledger_with_accounts(0, 4);
    let (treasury, owner, spender, bob) = (ids[0], ids[1], ids[2], ids[3]);
    let token = nft_token(&ledger, treasury, FeeSchedule::empty());
    let serial = mint_to(&ledger, token, treasury, owner);
    ledger.associate(bob, token).unwrap();

    let mut batch = TransferBatch::new(spender);
    batch.transfer_nft_approved(token, owner, bob, serial);
    let err = ledger.execute(&mut batch).unwrap_err();

    assert_eq!(
        err,
        Error::InsufficientAllowance {
            owner,
            spender,
            denomination: token.into(),
            required: 1,
            available: 0,
        }
    );
    assert_eq!(ledger.owner_of(token, serial).unwrap(), owner);
}

#[test]
fn sender_who_does_not_own_the_serial_rejects() {
    let (ledger, ids) = ledger_with_accounts(0, 4);
    let (treasury, owner, outsider, bob) = (ids[0], ids[1], ids[2], ids[3]);
    let token = nft_token(&ledger, treasury, FeeSchedule::empty());
    let serial = mint_to(&ledger, token, treasury, owner);
    for account in [outsider, bob] {
        ledger.associate(account, token).unwrap();
    }

    let mut batch = TransferBatch::new(outsider);
    batch.transfer_nft(token, outsider, bob, serial);
    let err = ledger.execute(&mut batch).unwrap_err();

    assert_eq!(
        err,
        Error::NftNotOwned {
            token,
            serial,
            account: outsider
        }
    );
}
