//! The `TokenLedger` facade.
//!
//! Wraps the ledger state in a single `parking_lot::RwLock`: queries take
//! the read lock, every mutation takes the write lock, so batches commit
//! one at a time. `execute` applies a settlement plan to a copy of the
//! state and swaps it in, which keeps a failing batch from leaving any
//! partial effect behind.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use tessera_config::LedgerConfig;
use tessera_core::{AccountId, TokenId};
use tessera_fees::FeeSchedule;

use crate::airdrop::{AirdropId, AirdropKind, AirdropOutcome, PendingAirdrop};
use crate::batch::{BatchState, TransferBatch};
use crate::planner::Planner;
use crate::settlement::{self, AllowanceSpends, CommittedEffects, NftMove, SettlementPlan};
use crate::state::LedgerState;
use crate::token::{TokenDefinition, TokenInfo};
use crate::{Error, Result};

/// A token ledger with custom fee settlement.
///
/// All public methods are safe to call from any thread; writes are
/// serialized through the internal lock.
#[derive(Debug)]
pub struct TokenLedger {
    state: RwLock<LedgerState>,
    config: LedgerConfig,
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenLedger {
    /// Empty ledger with stock limits.
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    /// Empty ledger with custom limits.
    pub fn with_config(config: LedgerConfig) -> Self {
        Self {
            state: RwLock::new(LedgerState::new()),
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Accounts and tokens
    // ------------------------------------------------------------------

    /// Opens an account holding `initial_native_balance` units of the
    /// native currency and no token associations.
    pub fn create_account(&self, initial_native_balance: u64) -> AccountId {
        let id = self.state.write().create_account(initial_native_balance);
        debug!(
            "created account {} with {} native units",
            id, initial_native_balance
        );
        id
    }

    /// Creates a token from `definition` with its fee schedule fixed for
    /// the token's lifetime. The treasury and any collector paid in the
    /// new token are associated automatically.
    pub fn create_token(&self, definition: TokenDefinition) -> Result<TokenId> {
        let mut state = self.state.write();
        let id = state.create_token(definition, &self.config)?;
        info!("created token {}", id);
        Ok(id)
    }

    /// Opens `account`'s holding slot for `token`.
    pub fn associate(&self, account: AccountId, token: TokenId) -> Result<()> {
        self.state.write().associate(account, token)?;
        debug!("associated account {} with token {}", account, token);
        Ok(())
    }

    pub fn is_associated(&self, account: AccountId, token: TokenId) -> Result<bool> {
        self.state.read().is_associated(account, token)
    }

    /// Mints `amount` units to the treasury. Only the supply key may call
    /// this. Returns the new total supply.
    pub fn mint_fungible(&self, token: TokenId, caller: AccountId, amount: u64) -> Result<u64> {
        let supply = self.state.write().mint_fungible(token, caller, amount)?;
        debug!("minted {} units of token {}", amount, token);
        Ok(supply)
    }

    /// Mints one serial per metadata blob to the treasury and returns the
    /// serial numbers. Only the supply key may call this.
    pub fn mint_nft(
        &self,
        token: TokenId,
        caller: AccountId,
        metadata: Vec<Vec<u8>>,
    ) -> Result<Vec<u64>> {
        let serials = self
            .state
            .write()
            .mint_nft(token, caller, metadata, &self.config)?;
        debug!("minted serials {:?} of token {}", serials, token);
        Ok(serials)
    }

    /// Burns `amount` units held by the treasury. Returns the new total
    /// supply.
    pub fn burn_fungible(&self, token: TokenId, caller: AccountId, amount: u64) -> Result<u64> {
        self.state.write().burn_fungible(token, caller, amount)
    }

    /// Burns one treasury-held serial. Returns the new total supply.
    pub fn burn_nft(&self, token: TokenId, caller: AccountId, serial: u64) -> Result<u64> {
        self.state.write().burn_nft(token, caller, serial)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn native_balance(&self, account: AccountId) -> Result<u64> {
        self.state.read().native_balance(account)
    }

    /// Fungible balance or owned-serial count; zero when unassociated.
    pub fn token_balance(&self, account: AccountId, token: TokenId) -> Result<u64> {
        self.state.read().token_balance(account, token)
    }

    pub fn owner_of(&self, token: TokenId, serial: u64) -> Result<AccountId> {
        self.state.read().owner_of(token, serial)
    }

    pub fn token_info(&self, token: TokenId) -> Result<TokenInfo> {
        self.state.read().token_info(token)
    }

    /// The token's custom fee schedule, in application order.
    pub fn fees_for(&self, token: TokenId) -> Result<FeeSchedule> {
        self.state.read().fees_for(token)
    }

    // ------------------------------------------------------------------
    // Allowances
    // ------------------------------------------------------------------

    /// Grants `spender` a native allowance of `amount`, replacing any
    /// previous grant. Zero revokes.
    pub fn approve_native(
        &self,
        owner: AccountId,
        spender: AccountId,
        amount: u64,
    ) -> Result<()> {
        self.state.write().approve_native(owner, spender, amount)
    }

    /// Grants `spender` an allowance over `owner`'s units of a fungible
    /// token, replacing any previous grant. Zero revokes.
    pub fn approve_fungible(
        &self,
        owner: AccountId,
        spender: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<()> {
        self.state
            .write()
            .approve_fungible(owner, spender, token, amount)
    }

    /// Approves `spender` for one serial. The approval clears when the
    /// serial next moves.
    pub fn approve_nft(
        &self,
        owner: AccountId,
        spender: AccountId,
        token: TokenId,
        serial: u64,
    ) -> Result<()> {
        self.state.write().approve_nft(owner, spender, token, serial)
    }

    pub fn allowance_native(&self, owner: AccountId, spender: AccountId) -> Result<u64> {
        self.state.read().allowance_native(owner, spender)
    }

    pub fn allowance_fungible(
        &self,
        owner: AccountId,
        spender: AccountId,
        token: TokenId,
    ) -> Result<u64> {
        self.state.read().allowance_fungible(owner, spender, token)
    }

    pub fn approved_spender(&self, token: TokenId, serial: u64) -> Result<Option<AccountId>> {
        self.state.read().approved_spender(token, serial)
    }

    // ------------------------------------------------------------------
    // Settlement
    // ------------------------------------------------------------------

    /// Plans and commits `batch` atomically.
    ///
    /// On success the batch ends `Committed` and the returned effects
    /// include every custom fee charged. On any failure the batch ends
    /// `Rejected`, the error names the first violated rule and the ledger
    /// is exactly as it was. Only `Draft` batches are accepted; an empty
    /// batch commits as a no-op.
    pub fn execute(&self, batch: &mut TransferBatch) -> Result<CommittedEffects> {
        if batch.state() != BatchState::Draft {
            return Err(Error::InvalidOperation(format!(
                "batch in state {:?} cannot be executed",
                batch.state()
            )));
        }
        if batch.is_empty() {
            batch.set_state(BatchState::Committed);
            debug!("committed empty batch from operator {}", batch.operator());
            return Ok(CommittedEffects::default());
        }

        let mut state = self.state.write();
        let planner = Planner::new(&state, &self.config);
        let checked = match planner.validate(batch) {
            Ok(checked) => checked,
            Err(err) => return reject(batch, err),
        };
        batch.set_state(BatchState::Validated);
        let plan = match planner.assess(batch, checked) {
            Ok(plan) => plan,
            Err(err) => return reject(batch, err),
        };
        batch.set_state(BatchState::FeesApplied);

        let mut next = (*state).clone();
        if let Err(err) = settlement::apply(&mut next, &plan) {
            return reject(batch, err);
        }
        *state = next;
        batch.set_state(BatchState::Committed);
        info!(
            "committed batch from operator {} with {} assessed fees",
            batch.operator(),
            plan.assessed_fees().len()
        );
        Ok(plan.into())
    }

    /// Plans `batch` against current state without committing anything.
    /// The batch itself is left untouched.
    pub fn preview(&self, batch: &TransferBatch) -> Result<SettlementPlan> {
        let state = self.state.read();
        Planner::new(&state, &self.config).plan(batch)
    }

    /// Plans and applies a batch under an already-held write lock.
    fn settle_locked(
        &self,
        state: &mut LedgerState,
        batch: &TransferBatch,
    ) -> Result<CommittedEffects> {
        let plan = Planner::new(state, &self.config).plan(batch)?;
        let mut next = (*state).clone();
        settlement::apply(&mut next, &plan)?;
        *state = next;
        Ok(plan.into())
    }

    // ------------------------------------------------------------------
    // Airdrops
    // ------------------------------------------------------------------

    /// Sends `amount` units of a fungible token to `receiver`, parking
    /// the drop if the receiver lacks the association.
    ///
    /// An immediate settlement carries custom fees like any transfer. A
    /// parked drop leaves the units with the sender; a later drop of the
    /// same token between the same parties merges into it.
    pub fn airdrop_fungible(
        &self,
        sender: AccountId,
        receiver: AccountId,
        token: TokenId,
        amount: u64,
    ) -> Result<AirdropOutcome> {
        if amount == 0 {
            return Err(Error::InvalidOperation("zero-amount airdrop".into()));
        }
        let declared = i64::try_from(amount).map_err(|_| Error::AmountOverflow)?;

        let mut state = self.state.write();
        if !state.token(token)?.kind.is_fungible() {
            return Err(Error::KindMismatch {
                token,
                operation: "fungible airdrop",
            });
        }
        state.account(receiver)?;
        if !state.account(sender)?.is_associated(token) {
            return Err(Error::NotAssociated {
                account: sender,
                token,
            });
        }
        let available = state.account(sender)?.fungible_balance(token);
        if available < amount {
            return Err(Error::InsufficientBalance {
                account: sender,
                denomination: token.into(),
                required: amount,
                available,
            });
        }

        if state.account(receiver)?.is_associated(token) {
            let mut batch = TransferBatch::new(sender);
            batch.transfer_fungible(token, sender, receiver, declared);
            let effects = self.settle_locked(&mut state, &batch)?;
            info!(
                "airdropped {} units of token {} from {} to {}",
                amount, token, sender, receiver
            );
            return Ok(AirdropOutcome::Transferred(effects));
        }

        for pending in state.pending_airdrops.values_mut() {
            if pending.sender == sender && pending.receiver == receiver && pending.token == token {
                if let AirdropKind::Fungible { amount: parked } = &mut pending.kind {
                    *parked = parked.checked_add(amount).ok_or(Error::AmountOverflow)?;
                    debug!("merged {} units into pending airdrop {}", amount, pending.id);
                    return Ok(AirdropOutcome::Pending(pending.id));
                }
            }
        }
        let id = AirdropId::new(state.next_airdrop_id);
        state.next_airdrop_id += 1;
        state.pending_airdrops.insert(
            id,
            PendingAirdrop {
                id,
                sender,
                receiver,
                token,
                kind: AirdropKind::Fungible { amount },
            },
        );
        info!(
            "parked airdrop {}: {} units of token {} from {} for {}",
            id, amount, token, sender, receiver
        );
        Ok(AirdropOutcome::Pending(id))
    }

    /// Sends one NFT serial to `receiver`, parking the drop if the
    /// receiver lacks the association. A new drop of the same serial
    /// supersedes any parked one.
    pub fn airdrop_nft(
        &self,
        sender: AccountId,
        receiver: AccountId,
        token: TokenId,
        serial: u64,
    ) -> Result<AirdropOutcome> {
        let mut state = self.state.write();
        if state.token(token)?.kind.is_fungible() {
            return Err(Error::KindMismatch {
                token,
                operation: "NFT airdrop",
            });
        }
        state.account(receiver)?;
        state.account(sender)?;
        let owner = state.owner_of(token, serial)?;
        if owner != sender {
            return Err(Error::NftNotOwned {
                token,
                serial,
                account: sender,
            });
        }

        if state.account(receiver)?.is_associated(token) {
            let mut batch = TransferBatch::new(sender);
            batch.transfer_nft(token, sender, receiver, serial);
            let effects = self.settle_locked(&mut state, &batch)?;
            info!(
                "airdropped serial {} of token {} from {} to {}",
                serial, token, sender, receiver
            );
            return Ok(AirdropOutcome::Transferred(effects));
        }

        // A serial can sit in at most one pending drop; later drops win.
        state.pending_airdrops.retain(|_, pending| {
            !(pending.token == token
                && matches!(pending.kind, AirdropKind::NonFungible { serial: parked } if parked == serial))
        });
        let id = AirdropId::new(state.next_airdrop_id);
        state.next_airdrop_id += 1;
        state.pending_airdrops.insert(
            id,
            PendingAirdrop {
                id,
                sender,
                receiver,
                token,
                kind: AirdropKind::NonFungible { serial },
            },
        );
        info!(
            "parked airdrop {}: serial {} of token {} from {} for {}",
            id, serial, token, sender, receiver
        );
        Ok(AirdropOutcome::Pending(id))
    }

    /// Settles a parked airdrop. Only the receiver may claim; the
    /// association is opened on their behalf and custom fees apply as if
    /// the transfer ran directly. A failed claim stays parked.
    pub fn claim_airdrop(&self, caller: AccountId, id: AirdropId) -> Result<CommittedEffects> {
        let mut state = self.state.write();
        let pending = state
            .pending_airdrops
            .get(&id)
            .cloned()
            .ok_or(Error::PendingAirdropNotFound(id))?;
        if caller != pending.receiver {
            return Err(Error::Unauthorized {
                account: caller,
                operation: "claim airdrop",
            });
        }

        let mut batch = TransferBatch::new(pending.sender);
        match pending.kind {
            AirdropKind::Fungible { amount } => {
                let amount = i64::try_from(amount).map_err(|_| Error::AmountOverflow)?;
                batch.transfer_fungible(pending.token, pending.sender, pending.receiver, amount);
            }
            AirdropKind::NonFungible { serial } => {
                batch.transfer_nft(pending.token, pending.sender, pending.receiver, serial);
            }
        }

        let newly_associated = state.ensure_associated(pending.receiver, pending.token)?;
        match self.settle_locked(&mut state, &batch) {
            Ok(effects) => {
                state.pending_airdrops.remove(&id);
                info!("claimed airdrop {} for account {}", id, caller);
                Ok(effects)
            }
            Err(err) => {
                if newly_associated {
                    state.disassociate_empty(pending.receiver, pending.token);
                }
                warn!("claim of airdrop {} failed: {}", id, err);
                Err(err)
            }
        }
    }

    /// Withdraws a parked airdrop. Only the sender may cancel.
    pub fn cancel_airdrop(&self, caller: AccountId, id: AirdropId) -> Result<()> {
        let mut state = self.state.write();
        let sender = state
            .pending_airdrops
            .get(&id)
            .ok_or(Error::PendingAirdropNotFound(id))?
            .sender;
        if caller != sender {
            return Err(Error::Unauthorized {
                account: caller,
                operation: "cancel airdrop",
            });
        }
        state.pending_airdrops.remove(&id);
        info!("cancelled airdrop {}", id);
        Ok(())
    }

    /// Every parked airdrop, in id order.
    pub fn pending_airdrops(&self) -> Vec<PendingAirdrop> {
        self.state.read().pending_airdrops.values().cloned().collect()
    }

    /// Parked airdrops awaiting `receiver`, in id order.
    pub fn pending_airdrops_for(&self, receiver: AccountId) -> Vec<PendingAirdrop> {
        self.state
            .read()
            .pending_airdrops
            .values()
            .filter(|pending| pending.receiver == receiver)
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------
    // Token rejection
    // ------------------------------------------------------------------

    /// Returns all of `account`'s holdings of `token` to the treasury.
    ///
    /// Rejection is the escape hatch from unwanted holdings, so the
    /// token's custom fees are not assessed. The treasury cannot reject
    /// its own token.
    pub fn reject_tokens(&self, account: AccountId, token: TokenId) -> Result<CommittedEffects> {
        let mut state = self.state.write();
        let record = state.token(token)?;
        let treasury = record.treasury;
        let fungible = record.kind.is_fungible();
        if account == treasury {
            return Err(Error::InvalidOperation(
                "the treasury cannot reject its own token".into(),
            ));
        }
        if !state.account(account)?.is_associated(token) {
            return Err(Error::NotAssociated { account, token });
        }

        let mut plan = SettlementPlan {
            operator: account,
            native_deltas: BTreeMap::new(),
            token_deltas: BTreeMap::new(),
            nft_moves: Vec::new(),
            assessed_fees: Vec::new(),
            allowance_spends: AllowanceSpends::default(),
        };
        if fungible {
            let amount = state.account(account)?.fungible_balance(token);
            if amount == 0 {
                return Err(Error::InvalidOperation(format!(
                    "account {account} holds no units of token {token}"
                )));
            }
            let delta = i64::try_from(amount).map_err(|_| Error::AmountOverflow)?;
            plan.token_deltas
                .insert(token, BTreeMap::from([(account, -delta), (treasury, delta)]));
        } else {
            let serials: Vec<u64> = state
                .account(account)?
                .serials(token)
                .map(|owned| owned.iter().copied().collect())
                .unwrap_or_default();
            if serials.is_empty() {
                return Err(Error::InvalidOperation(format!(
                    "account {account} holds no serials of token {token}"
                )));
            }
            plan.nft_moves = serials
                .into_iter()
                .map(|serial| NftMove {
                    token,
                    serial,
                    from: account,
                    to: treasury,
                })
                .collect();
        }

        let mut next = (*state).clone();
        settlement::apply(&mut next, &plan)?;
        *state = next;
        info!("account {} rejected token {} back to the treasury", account, token);
        Ok(plan.into())
    }
}

fn reject(batch: &mut TransferBatch, err: Error) -> Result<CommittedEffects> {
    batch.set_state(BatchState::Rejected);
    warn!("rejected batch from operator {}: {}", batch.operator(), err);
    Err(err)
}
