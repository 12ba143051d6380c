//! Pending airdrops.
//!
//! An airdrop to a receiver already holding the token's association
//! settles like any transfer. Otherwise it parks here: the assets stay
//! with the sender and the receiver gains a claim it can exercise or the
//! sender can withdraw. Custom fees are assessed when the claim settles,
//! not when the drop parks.

use std::fmt;

use serde::{Deserialize, Serialize};

use tessera_core::{AccountId, TokenId};

use crate::settlement::CommittedEffects;

/// Identifier of a parked airdrop, unique per ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AirdropId(u64);

impl AirdropId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AirdropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a parked airdrop delivers when claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirdropKind {
    /// Fungible units awaiting the receiver.
    Fungible { amount: u64 },
    /// One NFT serial awaiting the receiver.
    NonFungible { serial: u64 },
}

/// An airdrop parked because its receiver lacks the token association.
///
/// The sender keeps ownership until the claim settles, so the recorded
/// amount or serial may become unclaimable if the sender spends it first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAirdrop {
    pub id: AirdropId,
    pub sender: AccountId,
    pub receiver: AccountId,
    pub token: TokenId,
    pub kind: AirdropKind,
}

/// How an airdrop submission was disposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirdropOutcome {
    /// The receiver held the association; value moved immediately.
    Transferred(CommittedEffects),
    /// Parked until claimed, cancelled or superseded.
    Pending(AirdropId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airdrop_ids_serialize_as_plain_numbers() {
        let id = AirdropId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: AirdropId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }
}
