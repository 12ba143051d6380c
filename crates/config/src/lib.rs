//! Engine limits and per-instance configuration for the tessera ledger.
//!
//! The constants are the stock limits; `LedgerConfig` lets an embedding
//! application loosen or tighten them per ledger instance.

use serde::{Deserialize, Serialize};

/// Decimal places of the native currency. Amounts everywhere in the engine
/// are denominated in the smallest unit.
pub const NATIVE_DECIMALS: u8 = 8;

/// Maximum number of balance adjustments accepted in one batch, native and
/// fungible legs combined.
pub const MAX_TRANSFERS_PER_BATCH: usize = 10;

/// Maximum number of NFT transfers accepted in one batch.
pub const MAX_NFT_TRANSFERS_PER_BATCH: usize = 10;

/// Longest accepted token name, in bytes.
pub const MAX_TOKEN_NAME_LENGTH: usize = 100;

/// Longest accepted token symbol, in bytes.
pub const MAX_TOKEN_SYMBOL_LENGTH: usize = 100;

/// Largest metadata blob accepted for a minted NFT serial, in bytes.
pub const MAX_NFT_METADATA_BYTES: usize = 100;

/// Highest display resolution accepted for a fungible token.
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Tunable limits for one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Upper bound on native plus fungible adjustments per batch.
    pub max_transfers_per_batch: usize,
    /// Upper bound on NFT transfers per batch.
    pub max_nft_transfers_per_batch: usize,
    /// Upper bound on token name length in bytes.
    pub max_token_name_length: usize,
    /// Upper bound on token symbol length in bytes.
    pub max_token_symbol_length: usize,
    /// Upper bound on per-serial metadata size in bytes.
    pub max_nft_metadata_bytes: usize,
    /// Upper bound on fungible token decimals.
    pub max_token_decimals: u8,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_transfers_per_batch: MAX_TRANSFERS_PER_BATCH, // 10 adjustments
            max_nft_transfers_per_batch: MAX_NFT_TRANSFERS_PER_BATCH, // 10 serials
            max_token_name_length: MAX_TOKEN_NAME_LENGTH,     // 100 bytes
            max_token_symbol_length: MAX_TOKEN_SYMBOL_LENGTH, // 100 bytes
            max_nft_metadata_bytes: MAX_NFT_METADATA_BYTES,   // 100 bytes
            max_token_decimals: MAX_TOKEN_DECIMALS,           // 18 places
        }
    }
}
