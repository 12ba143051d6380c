//! Batch validation and custom fee assessment.
//!
//! The planner turns a draft batch into a [`SettlementPlan`] or an error,
//! without touching ledger state. Checks run in phases: shape, balance
//! conservation, record references and associations, declared funding,
//! allowances, then fee assessment with a final feasibility pass over the
//! fee-adjusted deltas. Any failure rejects the whole batch.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use tessera_config::LedgerConfig;
use tessera_core::{AccountId, Denomination, NftId, TokenId};
use tessera_fees::{CustomFee, FixedFee, FractionalFee, RoyaltyFee};

use crate::batch::{TokenTransfers, TransferBatch};
use crate::settlement::{AllowanceSpends, AssessedFee, NftMove, SettlementPlan};
use crate::state::LedgerState;
use crate::token::Token;
use crate::{Error, Result};

/// Running per-account deltas while a batch is planned. Accumulation is
/// 128-bit; narrowing to the plan's `i64` happens once at the end.
#[derive(Default)]
struct DeltaBook {
    native: BTreeMap<AccountId, i128>,
    tokens: BTreeMap<TokenId, BTreeMap<AccountId, i128>>,
}

impl DeltaBook {
    fn shift(&mut self, denomination: Denomination, account: AccountId, amount: i128) {
        match denomination {
            Denomination::Native => *self.native.entry(account).or_insert(0) += amount,
            Denomination::Token(token) => {
                *self
                    .tokens
                    .entry(token)
                    .or_default()
                    .entry(account)
                    .or_insert(0) += amount;
            }
        }
    }
}

/// A batch that passed every pre-fee check, carrying the declared deltas
/// forward into fee assessment.
pub(crate) struct CheckedBatch {
    book: DeltaBook,
    nft_moves: Vec<NftMove>,
    allowance_spends: AllowanceSpends,
}

pub(crate) struct Planner<'a> {
    state: &'a LedgerState,
    config: &'a LedgerConfig,
}

impl<'a> Planner<'a> {
    pub fn new(state: &'a LedgerState, config: &'a LedgerConfig) -> Self {
        Self { state, config }
    }

    /// Phases 1 through 5: shape, conservation, references, declared
    /// funding and allowances.
    pub fn validate(&self, batch: &TransferBatch) -> Result<CheckedBatch> {
        self.check_shape(batch)?;
        self.check_conservation(batch)?;

        let mut book = DeltaBook::default();
        let nft_moves = self.check_references(batch, &mut book)?;
        self.check_funding(&book, "declared")?;
        let allowance_spends = self.check_allowances(batch)?;

        Ok(CheckedBatch {
            book,
            nft_moves,
            allowance_spends,
        })
    }

    /// Phases 6 and 7: folds custom fees into the checked deltas, runs
    /// the authoritative funding gate and narrows to a plan.
    pub fn assess(&self, batch: &TransferBatch, checked: CheckedBatch) -> Result<SettlementPlan> {
        let CheckedBatch {
            mut book,
            nft_moves,
            allowance_spends,
        } = checked;

        let mut assessed_fees = Vec::new();
        self.apply_fees(batch, &mut book, &mut assessed_fees)?;
        self.check_funding(&book, "fee-adjusted")?;

        self.narrow(batch, book, nft_moves, assessed_fees, allowance_spends)
    }

    /// Validates `batch` completely and reduces it to a settlement plan
    /// with all custom fees folded in.
    pub fn plan(&self, batch: &TransferBatch) -> Result<SettlementPlan> {
        let checked = self.validate(batch)?;
        self.assess(batch, checked)
    }

    // ------------------------------------------------------------------
    // Phase 1: shape
    // ------------------------------------------------------------------

    fn check_shape(&self, batch: &TransferBatch) -> Result<()> {
        self.state.account(batch.operator())?;

        let adjustments = batch.native_transfers().len()
            + batch
                .token_transfers()
                .values()
                .map(|t| t.fungible.len())
                .sum::<usize>();
        if adjustments > self.config.max_transfers_per_batch {
            return Err(Error::BatchTooLarge {
                limit: self.config.max_transfers_per_batch,
                actual: adjustments,
            });
        }
        let nft_count = batch
            .token_transfers()
            .values()
            .map(|t| t.nft.len())
            .sum::<usize>();
        if nft_count > self.config.max_nft_transfers_per_batch {
            return Err(Error::BatchTooLarge {
                limit: self.config.max_nft_transfers_per_batch,
                actual: nft_count,
            });
        }

        for leg in batch.native_transfers() {
            check_adjustment_leg(leg.amount, leg.is_approval)?;
        }
        let mut seen_serials = BTreeSet::new();
        for (&token, transfers) in batch.token_transfers() {
            for leg in &transfers.fungible {
                check_adjustment_leg(leg.amount, leg.is_approval)?;
            }
            for leg in &transfers.nft {
                if leg.sender == leg.receiver {
                    return Err(Error::InvalidOperation(format!(
                        "serial {} of token {token} sent to its own sender",
                        leg.serial
                    )));
                }
                if !seen_serials.insert((token, leg.serial)) {
                    return Err(Error::InvalidOperation(format!(
                        "serial {} of token {token} moves twice in one batch",
                        leg.serial
                    )));
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase 2: balance conservation
    // ------------------------------------------------------------------

    fn check_conservation(&self, batch: &TransferBatch) -> Result<()> {
        let net: i128 = batch
            .native_transfers()
            .iter()
            .map(|leg| i128::from(leg.amount))
            .sum();
        if net != 0 {
            return Err(Error::ImbalancedBatch {
                denomination: Denomination::Native,
                net,
            });
        }
        for (&token, transfers) in batch.token_transfers() {
            let net: i128 = transfers
                .fungible
                .iter()
                .map(|leg| i128::from(leg.amount))
                .sum();
            if net != 0 {
                return Err(Error::ImbalancedBatch {
                    denomination: Denomination::Token(token),
                    net,
                });
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase 3: record references and associations
    // ------------------------------------------------------------------

    /// Resolves every account, token and serial the batch names, folds
    /// the declared legs into `book` and collects the NFT movements.
    fn check_references(
        &self,
        batch: &TransferBatch,
        book: &mut DeltaBook,
    ) -> Result<Vec<NftMove>> {
        for leg in batch.native_transfers() {
            self.state.account(leg.account)?;
            book.shift(Denomination::Native, leg.account, i128::from(leg.amount));
        }

        let mut nft_moves = Vec::new();
        for (&token_id, transfers) in batch.token_transfers() {
            let token = self.state.token(token_id)?;
            if !transfers.fungible.is_empty() && !token.kind.is_fungible() {
                return Err(Error::KindMismatch {
                    token: token_id,
                    operation: "fungible transfer",
                });
            }
            if !transfers.nft.is_empty() && token.kind.is_fungible() {
                return Err(Error::KindMismatch {
                    token: token_id,
                    operation: "NFT transfer",
                });
            }

            for leg in &transfers.fungible {
                if !self.state.account(leg.account)?.is_associated(token_id) {
                    return Err(Error::NotAssociated {
                        account: leg.account,
                        token: token_id,
                    });
                }
                book.shift(
                    Denomination::Token(token_id),
                    leg.account,
                    i128::from(leg.amount),
                );
            }

            for leg in &transfers.nft {
                self.state.account(leg.sender)?;
                let owner = self.state.owner_of(token_id, leg.serial)?;
                if owner != leg.sender {
                    return Err(Error::NftNotOwned {
                        token: token_id,
                        serial: leg.serial,
                        account: leg.sender,
                    });
                }
                if !self.state.account(leg.receiver)?.is_associated(token_id) {
                    return Err(Error::NotAssociated {
                        account: leg.receiver,
                        token: token_id,
                    });
                }
                nft_moves.push(NftMove {
                    token: token_id,
                    serial: leg.serial,
                    from: leg.sender,
                    to: leg.receiver,
                });
            }
        }
        Ok(nft_moves)
    }

    // ------------------------------------------------------------------
    // Phase 4: funding
    // ------------------------------------------------------------------

    /// Every net debit in `book` must be covered by the current balance.
    /// Runs twice: once over the declared legs for early attribution, and
    /// again after fees as the authoritative gate.
    fn check_funding(&self, book: &DeltaBook, stage: &str) -> Result<()> {
        for (&account, &delta) in &book.native {
            if delta < 0 {
                let available = self.state.account(account)?.native_balance;
                if i128::from(available) + delta < 0 {
                    debug!(
                        "rejecting batch: account {} is short {} native units at the {} stage",
                        account,
                        -delta,
                        stage
                    );
                    return Err(Error::InsufficientBalance {
                        account,
                        denomination: Denomination::Native,
                        required: saturate(-delta),
                        available,
                    });
                }
            }
        }
        for (&token, deltas) in &book.tokens {
            for (&account, &delta) in deltas {
                if delta < 0 {
                    let available = self.state.account(account)?.fungible_balance(token);
                    if i128::from(available) + delta < 0 {
                        debug!(
                            "rejecting batch: account {} is short {} units of token {} at the {} stage",
                            account,
                            -delta,
                            token,
                            stage
                        );
                        return Err(Error::InsufficientBalance {
                            account,
                            denomination: Denomination::Token(token),
                            required: saturate(-delta),
                            available,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase 5: allowances
    // ------------------------------------------------------------------

    /// Aggregates approval debits per granting owner and checks them
    /// against the allowances held by the batch operator.
    fn check_allowances(&self, batch: &TransferBatch) -> Result<AllowanceSpends> {
        let operator = batch.operator();
        let mut spends = AllowanceSpends::default();

        let mut native_required: BTreeMap<AccountId, u128> = BTreeMap::new();
        for leg in batch.native_transfers() {
            if leg.is_approval {
                *native_required.entry(leg.account).or_insert(0) +=
                    u128::from(leg.amount.unsigned_abs());
            }
        }
        for (&owner, &required) in &native_required {
            let required = saturate_u128(required);
            let available = self.state.allowance_native(owner, operator)?;
            if available < required {
                return Err(Error::InsufficientAllowance {
                    owner,
                    spender: operator,
                    denomination: Denomination::Native,
                    required,
                    available,
                });
            }
            spends.native.insert(owner, required);
        }

        let mut fungible_required: BTreeMap<(TokenId, AccountId), u128> = BTreeMap::new();
        for (&token, transfers) in batch.token_transfers() {
            for leg in &transfers.fungible {
                if leg.is_approval {
                    *fungible_required.entry((token, leg.account)).or_insert(0) +=
                        u128::from(leg.amount.unsigned_abs());
                }
            }
            for leg in &transfers.nft {
                if leg.is_approval {
                    let approved = self.state.approved_spender(token, leg.serial)?;
                    if approved != Some(operator) {
                        return Err(Error::InsufficientAllowance {
                            owner: leg.sender,
                            spender: operator,
                            denomination: Denomination::Token(token),
                            required: 1,
                            available: 0,
                        });
                    }
                    spends.nft.push(NftId::new(token, leg.serial));
                }
            }
        }
        for (&(token, owner), &required) in &fungible_required {
            let required = saturate_u128(required);
            let available = self.state.allowance_fungible(owner, operator, token)?;
            if available < required {
                return Err(Error::InsufficientAllowance {
                    owner,
                    spender: operator,
                    denomination: Denomination::Token(token),
                    required,
                    available,
                });
            }
            spends.fungible.insert((token, owner), required);
        }
        Ok(spends)
    }

    // ------------------------------------------------------------------
    // Phase 6: custom fees
    // ------------------------------------------------------------------

    fn apply_fees(
        &self,
        batch: &TransferBatch,
        book: &mut DeltaBook,
        assessed: &mut Vec<AssessedFee>,
    ) -> Result<()> {
        for (&token_id, transfers) in batch.token_transfers() {
            let token = self.state.token(token_id)?;
            if token.fees.is_empty() {
                continue;
            }
            if !transfers.fungible.is_empty() {
                self.assess_fungible_schedule(token_id, token, transfers, book, assessed)?;
            }
            if !transfers.nft.is_empty() {
                self.assess_nft_schedule(batch, token_id, token, transfers, book, assessed)?;
            }
        }
        Ok(())
    }

    fn assess_fungible_schedule(
        &self,
        token_id: TokenId,
        token: &Token,
        transfers: &TokenTransfers,
        book: &mut DeltaBook,
        assessed: &mut Vec<AssessedFee>,
    ) -> Result<()> {
        let mut per_account: BTreeMap<AccountId, i128> = BTreeMap::new();
        for leg in &transfers.fungible {
            *per_account.entry(leg.account).or_insert(0) += i128::from(leg.amount);
        }
        let senders: Vec<AccountId> = per_account
            .iter()
            .filter(|(_, &net)| net < 0)
            .map(|(&account, _)| account)
            .collect();
        let treasury_only = !senders.is_empty()
            && senders.iter().all(|&sender| sender == token.treasury);

        // Per-leg running credits, in declaration order. Fractional fees
        // compound on what the previous entry left behind.
        let mut credits: Vec<(AccountId, u64)> = transfers
            .fungible
            .iter()
            .filter(|leg| leg.amount > 0)
            .map(|leg| (leg.account, leg.amount.unsigned_abs()))
            .collect();

        for fee in token.fees.entries() {
            match fee {
                CustomFee::Fixed(fixed) => {
                    self.charge_fixed_to_senders(token_id, token, fixed, &senders, book, assessed)?;
                }
                CustomFee::Fractional(fractional) => {
                    if treasury_only {
                        continue;
                    }
                    self.charge_fractional(
                        token_id,
                        token,
                        fractional,
                        &mut credits,
                        book,
                        assessed,
                    )?;
                }
                // Creation-time validation keeps royalties off fungible
                // schedules.
                CustomFee::Royalty(_) => {}
            }
        }
        Ok(())
    }

    /// Charges one fixed fee to every distinct non-exempt sender.
    fn charge_fixed_to_senders(
        &self,
        token_id: TokenId,
        token: &Token,
        fee: &FixedFee,
        senders: &[AccountId],
        book: &mut DeltaBook,
        assessed: &mut Vec<AssessedFee>,
    ) -> Result<()> {
        let mut payers = Vec::new();
        for &sender in senders {
            if sender == token.treasury || sender == fee.collector {
                continue;
            }
            if fee.all_collectors_exempt && token.fees.collects(sender) {
                continue;
            }
            self.charge(book, sender, fee.collector, fee.denomination, fee.amount)?;
            payers.push(sender);
        }
        if !payers.is_empty() {
            let total = u128::from(fee.amount) * payers.len() as u128;
            let total = u64::try_from(total).map_err(|_| Error::AmountOverflow)?;
            debug!(
                "assessed fixed fee of {} ({}) on token {} across {} senders",
                fee.amount,
                fee.denomination,
                token_id,
                payers.len()
            );
            assessed.push(AssessedFee {
                token: token_id,
                collector: fee.collector,
                denomination: fee.denomination,
                amount: total,
                payers,
            });
        }
        Ok(())
    }

    /// Deducts one fractional fee from each receiving leg's remaining
    /// credit.
    fn charge_fractional(
        &self,
        token_id: TokenId,
        token: &Token,
        fee: &FractionalFee,
        credits: &mut [(AccountId, u64)],
        book: &mut DeltaBook,
        assessed: &mut Vec<AssessedFee>,
    ) -> Result<()> {
        let mut total: u64 = 0;
        let mut payers = Vec::new();
        for (receiver, remaining) in credits.iter_mut() {
            if *receiver == fee.collector || *receiver == token.treasury {
                continue;
            }
            let amount = fee.assess(*remaining);
            if amount == 0 {
                continue;
            }
            self.charge(
                book,
                *receiver,
                fee.collector,
                Denomination::Token(token_id),
                amount,
            )?;
            *remaining -= amount;
            total = total.checked_add(amount).ok_or(Error::AmountOverflow)?;
            if !payers.contains(receiver) {
                payers.push(*receiver);
            }
        }
        if total > 0 {
            debug!(
                "assessed fractional fee {}/{} on token {} for {} units",
                fee.numerator, fee.denominator, token_id, total
            );
            assessed.push(AssessedFee {
                token: token_id,
                collector: fee.collector,
                denomination: Denomination::Token(token_id),
                amount: total,
                payers,
            });
        }
        Ok(())
    }

    fn assess_nft_schedule(
        &self,
        batch: &TransferBatch,
        token_id: TokenId,
        token: &Token,
        transfers: &TokenTransfers,
        book: &mut DeltaBook,
        assessed: &mut Vec<AssessedFee>,
    ) -> Result<()> {
        let senders: Vec<AccountId> = transfers
            .nft
            .iter()
            .map(|leg| leg.sender)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        // Exchanged value available for royalties: the declared credits
        // flowing to each NFT sender, per denomination. Royalty entries
        // compound on what earlier entries left in the pool. Fee legs
        // themselves never feed a pool.
        let mut pools: BTreeMap<AccountId, BTreeMap<Denomination, u64>> = BTreeMap::new();
        for &sender in &senders {
            if sender == token.treasury {
                continue;
            }
            let credits = declared_credits(batch, self.state, sender)?;
            if !credits.is_empty() {
                pools.insert(sender, credits);
            }
        }

        for fee in token.fees.entries() {
            match fee {
                CustomFee::Fixed(fixed) => {
                    self.charge_fixed_to_senders(token_id, token, fixed, &senders, book, assessed)?;
                }
                CustomFee::Royalty(royalty) => {
                    self.charge_royalty(
                        token_id, token, royalty, transfers, &senders, &mut pools, book, assessed,
                    )?;
                }
                // Creation-time validation keeps fractional fees off NFT
                // schedules.
                CustomFee::Fractional(_) => {}
            }
        }
        Ok(())
    }

    /// Charges one royalty entry: a cut of each value pool when the NFT
    /// sender receives value in the batch, otherwise the fallback fixed
    /// fee from each receiver of that sender's serials.
    #[allow(clippy::too_many_arguments)]
    fn charge_royalty(
        &self,
        token_id: TokenId,
        token: &Token,
        fee: &RoyaltyFee,
        transfers: &TokenTransfers,
        senders: &[AccountId],
        pools: &mut BTreeMap<AccountId, BTreeMap<Denomination, u64>>,
        book: &mut DeltaBook,
        assessed: &mut Vec<AssessedFee>,
    ) -> Result<()> {
        type Charges = BTreeMap<(AccountId, Denomination), (u64, Vec<AccountId>)>;
        fn record(
            charges: &mut Charges,
            collector: AccountId,
            denomination: Denomination,
            amount: u64,
            payer: AccountId,
        ) -> Result<()> {
            let entry = charges
                .entry((collector, denomination))
                .or_insert((0, Vec::new()));
            entry.0 = entry.0.checked_add(amount).ok_or(Error::AmountOverflow)?;
            if !entry.1.contains(&payer) {
                entry.1.push(payer);
            }
            Ok(())
        }
        let mut charges: Charges = BTreeMap::new();

        for &sender in senders {
            if sender == token.treasury || sender == fee.collector {
                continue;
            }
            if let Some(sender_pools) = pools.get_mut(&sender) {
                for (&denomination, remaining) in sender_pools.iter_mut() {
                    let amount = fee.assess(*remaining);
                    if amount == 0 {
                        continue;
                    }
                    self.charge(book, sender, fee.collector, denomination, amount)?;
                    *remaining -= amount;
                    record(&mut charges, fee.collector, denomination, amount, sender)?;
                }
            } else if let Some(fallback) = &fee.fallback {
                for leg in transfers.nft.iter().filter(|leg| leg.sender == sender) {
                    let receiver = leg.receiver;
                    if receiver == token.treasury || receiver == fallback.collector {
                        continue;
                    }
                    if fallback.all_collectors_exempt && token.fees.collects(receiver) {
                        continue;
                    }
                    self.charge(
                        book,
                        receiver,
                        fallback.collector,
                        fallback.denomination,
                        fallback.amount,
                    )?;
                    record(
                        &mut charges,
                        fallback.collector,
                        fallback.denomination,
                        fallback.amount,
                        receiver,
                    )?;
                }
            }
            // No value exchanged and no fallback: the entry charges
            // nothing for this sender.
        }

        for ((collector, denomination), (amount, payers)) in charges {
            debug!(
                "assessed royalty {}/{} on token {} for {} ({})",
                fee.numerator, fee.denominator, token_id, amount, denomination
            );
            assessed.push(AssessedFee {
                token: token_id,
                collector,
                denomination,
                amount,
                payers,
            });
        }
        Ok(())
    }

    /// Moves `amount` of `denomination` from `payer` to `collector` in the
    /// book. Token-denominated charges require both parties to hold the
    /// token's association; a missing slot rejects the whole batch.
    fn charge(
        &self,
        book: &mut DeltaBook,
        payer: AccountId,
        collector: AccountId,
        denomination: Denomination,
        amount: u64,
    ) -> Result<()> {
        if let Denomination::Token(token) = denomination {
            if !self.state.account(payer)?.is_associated(token) {
                return Err(Error::NotAssociated {
                    account: payer,
                    token,
                });
            }
            if !self.state.account(collector)?.is_associated(token) {
                return Err(Error::NotAssociated {
                    account: collector,
                    token,
                });
            }
        } else {
            self.state.account(collector)?;
        }
        book.shift(denomination, payer, -i128::from(amount));
        book.shift(denomination, collector, i128::from(amount));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Phase 7: narrowing
    // ------------------------------------------------------------------

    fn narrow(
        &self,
        batch: &TransferBatch,
        book: DeltaBook,
        nft_moves: Vec<NftMove>,
        assessed_fees: Vec<AssessedFee>,
        allowance_spends: AllowanceSpends,
    ) -> Result<SettlementPlan> {
        let mut native_deltas = BTreeMap::new();
        for (account, delta) in book.native {
            if delta != 0 {
                let delta = i64::try_from(delta).map_err(|_| Error::AmountOverflow)?;
                native_deltas.insert(account, delta);
            }
        }
        let mut token_deltas = BTreeMap::new();
        for (token, deltas) in book.tokens {
            let mut narrowed = BTreeMap::new();
            for (account, delta) in deltas {
                if delta != 0 {
                    let delta = i64::try_from(delta).map_err(|_| Error::AmountOverflow)?;
                    narrowed.insert(account, delta);
                }
            }
            if !narrowed.is_empty() {
                token_deltas.insert(token, narrowed);
            }
        }
        Ok(SettlementPlan {
            operator: batch.operator(),
            native_deltas,
            token_deltas,
            nft_moves,
            assessed_fees,
            allowance_spends,
        })
    }
}

/// Declared credits flowing to `account` in the batch, per denomination:
/// its positive net native adjustment plus positive nets in every
/// fungible token. This is the exchanged value royalties draw on.
fn declared_credits(
    batch: &TransferBatch,
    state: &LedgerState,
    account: AccountId,
) -> Result<BTreeMap<Denomination, u64>> {
    let mut credits = BTreeMap::new();

    let native: i128 = batch
        .native_transfers()
        .iter()
        .filter(|leg| leg.account == account)
        .map(|leg| i128::from(leg.amount))
        .sum();
    if native > 0 {
        credits.insert(Denomination::Native, saturate(native));
    }

    for (&token, transfers) in batch.token_transfers() {
        if transfers.fungible.is_empty() || !state.token(token)?.kind.is_fungible() {
            continue;
        }
        let net: i128 = transfers
            .fungible
            .iter()
            .filter(|leg| leg.account == account)
            .map(|leg| i128::from(leg.amount))
            .sum();
        if net > 0 {
            credits.insert(Denomination::Token(token), saturate(net));
        }
    }
    Ok(credits)
}

fn check_adjustment_leg(amount: i64, is_approval: bool) -> Result<()> {
    if amount == 0 {
        return Err(Error::InvalidOperation("zero-amount transfer leg".into()));
    }
    if is_approval && amount > 0 {
        return Err(Error::InvalidOperation(
            "approval flag on a credit leg".into(),
        ));
    }
    Ok(())
}

fn saturate(value: i128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn saturate_u128(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
