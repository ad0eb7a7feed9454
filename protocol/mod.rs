//! Wagerbook Protocol - Value Types & Operations
//!
//! Everything a transaction can carry: exact SCR amounts, rational odds,
//! the closed wincase/market unions, and the externally accepted operations
//! with their syntactic validation.

pub mod asset;
pub mod betting;
pub mod config;
pub mod odds;
pub mod operations;

// Re-export core types
pub use asset::Asset;
pub use betting::market::{Market, Wincase};
pub use odds::Odds;
pub use operations::{
    CancelGameOperation, CancelPendingBetsOperation, CreateGameOperation, OddsInput, Operation,
    PostBetOperation, PostGameResultsOperation, UpdateGameMarketsOperation,
    UpdateGameStartTimeOperation,
};
