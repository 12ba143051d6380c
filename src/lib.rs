//! # Tessera: Token Ledger with Custom Fee Settlement
//!
//! An embeddable in-memory ledger for a native currency, fungible tokens
//! and NFTs, with Hedera-style custom fee schedules settled atomically.
//!
//! This library provides:
//! - Account, token and association management with explicit opt-in holdings
//! - Fixed, fractional and royalty custom fees fixed at token creation
//! - Atomic multi-party transfer batches with net-zero validation
//! - A pure planning step that assesses fees without mutating state
//! - Allowances, airdrops with pending claims, and token rejection
//!
//! ## Quick Start
//!
//! ```rust
//! use tessera::prelude::*;
//!
//! let ledger = TokenLedger::new();
//! let treasury = ledger.create_account(0);
//! let collector = ledger.create_account(0);
//! let alice = ledger.create_account(0);
//! let bob = ledger.create_account(0);
//!
//! // A fungible token taking a tenth of every transfer for the collector.
//! let fees = FeeSchedule::new(vec![FractionalFee::new(1, 10, collector).into()]);
//! let token = ledger.create_token(
//!     TokenDefinition::fungible("MyToken", "MYT", 8, treasury)
//!         .with_initial_supply(1_000)
//!         .with_fees(fees),
//! )?;
//! ledger.associate(alice, token)?;
//! ledger.associate(bob, token)?;
//!
//! // Fund alice from the treasury; treasury sends carry no fees.
//! let mut funding = TransferBatch::new(treasury);
//! funding.transfer_fungible(token, treasury, alice, 1_000);
//! ledger.execute(&mut funding)?;
//!
//! // Alice pays bob; the schedule deducts the fee from bob's credit.
//! let mut batch = TransferBatch::new(alice);
//! batch.transfer_fungible(token, alice, bob, 100);
//! let effects = ledger.execute(&mut batch)?;
//!
//! assert_eq!(ledger.token_balance(bob, token)?, 90);
//! assert_eq!(ledger.token_balance(collector, token)?, 10);
//! assert_eq!(effects.assessed_fees.len(), 1);
//! # Ok::<(), tessera::ledger::Error>(())
//! ```
//!
//! ## Architecture
//!
//! The implementation is organized into four crates:
//!
//! - [`tessera_core`] - Identifier and asset primitives
//! - [`tessera_config`] - Engine limits and per-instance configuration
//! - [`tessera_fees`] - Fee schedule types and assessment arithmetic
//! - [`tessera_ledger`] - Ledger store, transfer planner and settlement

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Re-export the member crates under short names
pub use tessera_config as config;
pub use tessera_core as core;
pub use tessera_fees as fees;
pub use tessera_ledger as ledger;

/// Common imports for working with the ledger
pub mod prelude {
    pub use crate::config::LedgerConfig;
    pub use crate::core::{AccountId, Denomination, NftId, TokenId, TokenKind};
    pub use crate::fees::{CustomFee, FeeSchedule, FixedFee, FractionalFee, RoyaltyFee};
    pub use crate::ledger::{
        AirdropId, AirdropOutcome, AssessedFee, BatchState, CommittedEffects, PendingAirdrop,
        SettlementPlan, TokenDefinition, TokenInfo, TokenLedger, TransferBatch,
    };
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
