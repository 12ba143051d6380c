//! Settlement plans and their application to ledger state.
//!
//! The planner reduces a validated batch plus its assessed fees to a
//! `SettlementPlan`: net per-account deltas, NFT movements and allowance
//! spends. `apply` folds a plan into a `LedgerState` with checked
//! arithmetic; the ledger runs it against a copy of the state so a failure
//! cannot leave a half-applied batch behind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tessera_core::{AccountId, Denomination, NftId, TokenId};

use crate::account::Holding;
use crate::state::LedgerState;
use crate::{Error, Result};

/// Movement of one NFT serial, fully resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftMove {
    pub token: TokenId,
    pub serial: u64,
    pub from: AccountId,
    pub to: AccountId,
}

/// One custom fee charged while planning a batch.
///
/// `token` is the token whose fee schedule produced the charge;
/// `denomination` is what the fee is paid in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessedFee {
    pub token: TokenId,
    pub collector: AccountId,
    pub denomination: Denomination,
    pub amount: u64,
    /// Accounts the charge was taken from, in assessment order.
    pub payers: Vec<AccountId>,
}

/// Allowance consumption required by a plan's approval legs, keyed by the
/// granting owner. All spends draw on allowances granted to the batch
/// operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceSpends {
    pub native: BTreeMap<AccountId, u64>,
    pub fungible: BTreeMap<(TokenId, AccountId), u64>,
    /// Per-serial approvals consumed by the plan. Approvals clear on
    /// transfer regardless; this records which legs relied on one.
    pub nft: Vec<NftId>,
}

impl AllowanceSpends {
    pub fn is_empty(&self) -> bool {
        self.native.is_empty() && self.fungible.is_empty() && self.nft.is_empty()
    }
}

/// The fully-checked outcome of planning a batch.
///
/// All deltas are net of custom fees; every balance they touch has been
/// proven sufficient against current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPlan {
    pub(crate) operator: AccountId,
    pub(crate) native_deltas: BTreeMap<AccountId, i64>,
    pub(crate) token_deltas: BTreeMap<TokenId, BTreeMap<AccountId, i64>>,
    pub(crate) nft_moves: Vec<NftMove>,
    pub(crate) assessed_fees: Vec<AssessedFee>,
    pub(crate) allowance_spends: AllowanceSpends,
}

impl SettlementPlan {
    pub fn operator(&self) -> AccountId {
        self.operator
    }

    /// Net native delta per touched account, fees folded in.
    pub fn native_deltas(&self) -> &BTreeMap<AccountId, i64> {
        &self.native_deltas
    }

    /// Net fungible delta per token and account, fees folded in.
    pub fn token_deltas(&self) -> &BTreeMap<TokenId, BTreeMap<AccountId, i64>> {
        &self.token_deltas
    }

    pub fn nft_moves(&self) -> &[NftMove] {
        &self.nft_moves
    }

    pub fn assessed_fees(&self) -> &[AssessedFee] {
        &self.assessed_fees
    }

    pub fn allowance_spends(&self) -> &AllowanceSpends {
        &self.allowance_spends
    }
}

/// What a committed batch did to the ledger, for callers that want a
/// receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedEffects {
    pub native_adjustments: BTreeMap<AccountId, i64>,
    pub token_adjustments: BTreeMap<TokenId, BTreeMap<AccountId, i64>>,
    pub nft_transfers: Vec<NftMove>,
    pub assessed_fees: Vec<AssessedFee>,
}

impl From<SettlementPlan> for CommittedEffects {
    fn from(plan: SettlementPlan) -> Self {
        Self {
            native_adjustments: plan.native_deltas,
            token_adjustments: plan.token_deltas,
            nft_transfers: plan.nft_moves,
            assessed_fees: plan.assessed_fees,
        }
    }
}

/// Folds a plan into `state`. Errors here mean the planner's proof and
/// the state diverged; the caller applies to a copy and discards it on
/// failure, so nothing is ever half-committed.
pub(crate) fn apply(state: &mut LedgerState, plan: &SettlementPlan) -> Result<()> {
    for (&account, &delta) in &plan.native_deltas {
        let record = state.account_mut(account)?;
        record.native_balance =
            shifted(record.native_balance, delta, account, Denomination::Native)?;
    }

    for (&token, deltas) in &plan.token_deltas {
        for (&account, &delta) in deltas {
            let record = state.account_mut(account)?;
            let holding = record
                .holdings
                .get_mut(&token)
                .ok_or(Error::NotAssociated { account, token })?;
            match holding {
                Holding::Fungible(balance) => {
                    *balance = shifted(*balance, delta, account, Denomination::Token(token))?;
                }
                Holding::NonFungible(_) => {
                    return Err(Error::KindMismatch {
                        token,
                        operation: "fungible adjustment",
                    })
                }
            }
        }
    }

    for mv in &plan.nft_moves {
        move_serial(state, mv)?;
    }

    for (&owner, &spent) in &plan.allowance_spends.native {
        let record = state.account_mut(owner)?;
        let current = record.native_allowances.get(&plan.operator).copied().unwrap_or(0);
        let remaining = drawn_down(current, spent, owner, plan.operator, Denomination::Native)?;
        if remaining == 0 {
            record.native_allowances.remove(&plan.operator);
        } else {
            record.native_allowances.insert(plan.operator, remaining);
        }
    }

    for (&(token, owner), &spent) in &plan.allowance_spends.fungible {
        let record = state.account_mut(owner)?;
        let key = (token, plan.operator);
        let current = record.token_allowances.get(&key).copied().unwrap_or(0);
        let remaining =
            drawn_down(current, spent, owner, plan.operator, Denomination::Token(token))?;
        if remaining == 0 {
            record.token_allowances.remove(&key);
        } else {
            record.token_allowances.insert(key, remaining);
        }
    }

    Ok(())
}

fn move_serial(state: &mut LedgerState, mv: &NftMove) -> Result<()> {
    let token = state.token_mut(mv.token)?;
    let nft = token.serials.get_mut(&mv.serial).ok_or(Error::UnknownSerial {
        token: mv.token,
        serial: mv.serial,
    })?;
    if nft.owner != mv.from {
        return Err(Error::NftNotOwned {
            token: mv.token,
            serial: mv.serial,
            account: mv.from,
        });
    }
    nft.owner = mv.to;
    nft.approved = None;

    let sender = state.account_mut(mv.from)?;
    match sender.holdings.get_mut(&mv.token) {
        Some(Holding::NonFungible(owned)) => {
            owned.remove(&mv.serial);
        }
        _ => {
            return Err(Error::NotAssociated {
                account: mv.from,
                token: mv.token,
            })
        }
    }
    let receiver = state.account_mut(mv.to)?;
    match receiver.holdings.get_mut(&mv.token) {
        Some(Holding::NonFungible(owned)) => {
            owned.insert(mv.serial);
        }
        _ => {
            return Err(Error::NotAssociated {
                account: mv.to,
                token: mv.token,
            })
        }
    }
    Ok(())
}

fn shifted(
    balance: u64,
    delta: i64,
    account: AccountId,
    denomination: Denomination,
) -> Result<u64> {
    let next = i128::from(balance) + i128::from(delta);
    if next < 0 {
        return Err(Error::InsufficientBalance {
            account,
            denomination,
            required: delta.unsigned_abs(),
            available: balance,
        });
    }
    u64::try_from(next).map_err(|_| Error::AmountOverflow)
}

fn drawn_down(
    current: u64,
    spent: u64,
    owner: AccountId,
    spender: AccountId,
    denomination: Denomination,
) -> Result<u64> {
    current
        .checked_sub(spent)
        .ok_or(Error::InsufficientAllowance {
            owner,
            spender,
            denomination,
            required: spent,
            available: current,
        })
}
