//! Wagerbook - Betting Subsystem of a Deterministic Chain State Machine
//!
//! Participants place stake-backed wagers on scheduled games; the system
//! matches opposing positions, holds their stakes in escrow, and - on game
//! cancel, expiry or market updates - pays out, refunds, or restores bets
//! to the unmatched queue.
//!
//! ## Architecture
//!
//! 1. Protocol - value types (SCR amounts, rational odds, wincase/market
//!    unions) and the externally accepted operations
//! 2. Storage - the chain database: indexed bet/game collections, the uuid
//!    history, singletons, and the undo stack
//! 3. Betting service - every lifecycle mutation, transactional against the
//!    undo stack
//! 4. Evaluators - per-operation dispatchers with authority checks
//! 5. Runtime - block application loop and the auto-resolve block task

// Core modules
pub mod account;
pub mod betting;
pub mod errors;
pub mod events;
pub mod storage;

// Infrastructure
#[path = "../protocol/mod.rs"]
pub mod protocol;
#[path = "../runtime/mod.rs"]
pub mod runtime;

// ============================================================================
// PUBLIC API
// ============================================================================

// Errors
pub use errors::ChainError;

// Events (for the block side-channel)
pub use events::{CancelledBetKind, VirtualOperation};

// Protocol
pub use protocol::{
    Asset, CancelGameOperation, CancelPendingBetsOperation, CreateGameOperation, Market, Odds,
    OddsInput, Operation, PostBetOperation, PostGameResultsOperation,
    UpdateGameMarketsOperation, UpdateGameStartTimeOperation, Wincase,
};

// Storage
pub use storage::objects::{
    Account, AccountName, BetData, BetKind, BettingProperty, BettingStats,
    DynamicGlobalProperties, Game, GameId, GameStatus, MatchedBet, MatchedBetId, PendingBet,
    PendingBetId,
};
pub use storage::Database;

// Betting core
pub use betting::{apply_operation, game_winners, BetOutcome, BettingService, MarketWinner};

// Runtime
pub use runtime::{
    create_chain, process_bets_auto_resolving, process_games_startup, BlockResult, Chain,
    Genesis, SharedChain,
};
