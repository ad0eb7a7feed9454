//! Chain-wide configuration constants.
//!
//! Everything here is consensus-critical: changing a value is a hard fork.

use crate::protocol::asset::Asset;

/// Decimal places of the native coin. 1 SCR = 10^9 units.
pub const CURRENCY_PRECISION: u32 = 9;

/// Units per whole SCR.
pub const UNITS_PER_SCR: i64 = 1_000_000_000;

/// Ticker of the native coin.
pub const CURRENCY_SYMBOL: &str = "SCR";

/// Smallest stake a bet may carry: 0.001 SCR.
pub const MIN_BET_STAKE: Asset = Asset::from_units(1_000_000);

/// Lower bound of the accepted odds range as a reduced fraction.
/// The upper bound is its inversion: 1001/1000 .. 1001/1.
pub const MIN_ODDS_NUMERATOR: u32 = 1001;
pub const MIN_ODDS_DENOMINATOR: u32 = 1000;

/// Target seconds between blocks.
pub const BLOCK_INTERVAL_SECS: i64 = 3;

/// Account name length bounds.
pub const MIN_ACCOUNT_NAME_LENGTH: usize = 3;
pub const MAX_ACCOUNT_NAME_LENGTH: usize = 16;

/// Longest accepted game name.
pub const MAX_GAME_NAME_LENGTH: usize = 256;
