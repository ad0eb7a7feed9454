//! Chain error taxonomy.
//!
//! Every failure aborts the current transaction; the runtime rolls the store
//! back to the transaction start, so partial effects never persist. Errors
//! surface to the transaction submitter as typed rejections.

use thiserror::Error;
use uuid::Uuid;

use crate::protocol::asset::Asset;
use crate::storage::objects::GameStatus;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("insufficient funds: have {have}, need {need}")]
    InsufficientFunds { have: Asset, need: Asset },

    #[error("account not found: {0}")]
    UnknownAccount(String),

    #[error("unknown bet {uuid} for better {better}")]
    UnknownBet { uuid: Uuid, better: String },

    #[error("bet uuid already used: {0}")]
    DuplicateUuid(Uuid),

    #[error("game not found: {0}")]
    UnknownGame(Uuid),

    #[error("game {uuid} does not accept this operation in status {status:?}")]
    InvalidGameState { uuid: Uuid, status: GameStatus },

    #[error("account {0} is not the betting moderator")]
    NotModerator(String),

    #[error("cannot cancel game {0} which has associated bets")]
    GameHasBets(Uuid),

    #[error("{0}")]
    Validation(String),

    /// Unreachable by construction; raising it aborts the whole block.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
