//! Persisted object types.
//!
//! Everything in this module is chain state: serialized into snapshots,
//! versioned through the undo stack, and mutated only via the database's
//! update path.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::protocol::asset::Asset;
use crate::protocol::betting::market::{Market, Wincase};
use crate::protocol::odds::Odds;

pub type AccountName = String;

// ============================================================================
// IDS
// ============================================================================

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(PendingBetId);
id_type!(MatchedBetId);
id_type!(GameId);

// ============================================================================
// ACCOUNTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub name: AccountName,
    pub balance: Asset,
}

// ============================================================================
// BETS
// ============================================================================

/// Cancellation policy class of a bet.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BetKind {
    Live,
    NonLive,
}

/// The per-side bet payload, embedded in both pending and matched bets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetData {
    /// External stable identifier, globally unique across all bets ever.
    pub uuid: Uuid,
    pub better: AccountName,
    pub stake: Asset,
    /// The odds this side was willing to match at.
    pub bet_odds: Odds,
    pub wincase: Wincase,
    pub kind: BetKind,
    /// Block time of creation.
    pub created: DateTime<Utc>,
}

/// An unmatched offer sitting in the book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingBet {
    pub id: PendingBetId,
    pub game: GameId,
    pub market: Market,
    pub data: BetData,
}

/// Two opposing pending bets locked against each other.
///
/// The wincases of the two sides are distinct inverses over `market`, and
/// the paired stakes are consistent with the agreed odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedBet {
    pub id: MatchedBetId,
    pub game: GameId,
    pub market: Market,
    pub bet1_data: BetData,
    pub bet2_data: BetData,
}

// ============================================================================
// GAMES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Created,
    Started,
    Finished,
    Resolved,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub uuid: Uuid,
    pub name: String,
    pub status: GameStatus,
    pub start_time: DateTime<Utc>,
    /// Deadline after which the auto-resolver expires an abandoned game.
    pub auto_resolve_time: DateTime<Utc>,
    pub markets: BTreeSet<Market>,
    /// Winning wincases, set by the results operation.
    pub results: BTreeSet<Wincase>,
}

// ============================================================================
// SINGLETONS
// ============================================================================

/// Betting property singleton: who moderates game lifecycle operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BettingProperty {
    pub moderator: AccountName,
}

/// Running totals of stakes held in escrow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BettingStats {
    pub pending_bets_volume: Asset,
    pub matched_bets_volume: Asset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicGlobalProperties {
    pub head_block_num: u64,
    pub head_block_time: DateTime<Utc>,
    pub betting_stats: BettingStats,
}
