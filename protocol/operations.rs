//! Externally accepted operations and their syntactic validation.
//!
//! Validation here is purely local to the operation payload: names, odds
//! bounds, stake floor, duplicate-free lists. Stateful checks (moderator
//! authority, uuid history, game status) live in the evaluators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ChainError;
use crate::protocol::asset::Asset;
use crate::protocol::betting::market::{Market, Wincase};
use crate::protocol::betting::validation::{
    validate_account_name, validate_game_name, validate_markets, validate_wincase,
    validate_wincases,
};
use crate::protocol::config::MIN_BET_STAKE;
use crate::protocol::odds::Odds;

/// Raw odds fraction as submitted. Converted (and bounds-checked) into
/// [`Odds`] during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OddsInput {
    pub numerator: u32,
    pub denominator: u32,
}

fn is_unique<T: Ord + Clone>(input: &[T]) -> bool {
    let mut data = input.to_vec();
    data.sort();
    data.windows(2).all(|w| w[0] != w[1])
}

// ============================================================================
// GAME LIFECYCLE OPERATIONS (moderator-gated)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateGameOperation {
    pub moderator: String,
    pub uuid: Uuid,
    pub name: String,
    pub start_time: DateTime<Utc>,
    /// Seconds after `start_time` at which an abandoned game auto-expires.
    pub auto_resolve_delay_sec: u32,
    pub markets: Vec<Market>,
}

impl CreateGameOperation {
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_account_name(&self.moderator)?;
        validate_game_name(&self.name)?;
        if self.uuid.is_nil() {
            return Err(ChainError::Validation("game uuid must not be nil".into()));
        }
        if self.markets.is_empty() {
            return Err(ChainError::Validation("market list is empty".into()));
        }
        if !is_unique(&self.markets) {
            return Err(ChainError::Validation(
                "market list contains duplicates".into(),
            ));
        }
        if self.auto_resolve_delay_sec == 0 {
            return Err(ChainError::Validation(
                "auto resolve delay must be positive".into(),
            ));
        }
        validate_markets(self.markets.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelGameOperation {
    pub moderator: String,
    pub game_uuid: Uuid,
}

impl CancelGameOperation {
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_account_name(&self.moderator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateGameMarketsOperation {
    pub moderator: String,
    pub game_uuid: Uuid,
    pub markets: Vec<Market>,
}

impl UpdateGameMarketsOperation {
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_account_name(&self.moderator)?;
        if self.markets.is_empty() {
            return Err(ChainError::Validation("market list is empty".into()));
        }
        if !is_unique(&self.markets) {
            return Err(ChainError::Validation(
                "market list contains duplicates".into(),
            ));
        }
        validate_markets(self.markets.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateGameStartTimeOperation {
    pub moderator: String,
    pub game_uuid: Uuid,
    pub start_time: DateTime<Utc>,
}

impl UpdateGameStartTimeOperation {
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_account_name(&self.moderator)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostGameResultsOperation {
    pub moderator: String,
    pub game_uuid: Uuid,
    pub wincases: Vec<Wincase>,
}

impl PostGameResultsOperation {
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_account_name(&self.moderator)?;
        if !is_unique(&self.wincases) {
            return Err(ChainError::Validation(
                "wincase list contains duplicates".into(),
            ));
        }
        validate_wincases(self.wincases.iter())
    }
}

// ============================================================================
// BETTING OPERATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostBetOperation {
    pub better: String,
    pub uuid: Uuid,
    pub game_uuid: Uuid,
    pub wincase: Wincase,
    pub odds: OddsInput,
    pub stake: Asset,
    /// Live bets stay valid after kick-off; non-live bets do not.
    pub live: bool,
}

impl PostBetOperation {
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_account_name(&self.better)?;
        validate_wincase(&self.wincase)?;
        if self.uuid.is_nil() {
            return Err(ChainError::Validation("bet uuid must not be nil".into()));
        }
        if self.stake < MIN_BET_STAKE {
            return Err(ChainError::Validation(format!(
                "stake {} is below the minimum {}",
                self.stake, MIN_BET_STAKE
            )));
        }
        Odds::new(self.odds.numerator, self.odds.denominator).map(|_| ())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelPendingBetsOperation {
    pub better: String,
    pub bet_uuids: Vec<Uuid>,
}

impl CancelPendingBetsOperation {
    pub fn validate(&self) -> Result<(), ChainError> {
        validate_account_name(&self.better)?;
        if self.bet_uuids.is_empty() {
            return Err(ChainError::Validation("list of bets is empty".into()));
        }
        if !is_unique(&self.bet_uuids) {
            return Err(ChainError::Validation(
                "bet uuid list contains duplicates".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// DISPATCH UNION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    CreateGame(CreateGameOperation),
    CancelGame(CancelGameOperation),
    UpdateGameMarkets(UpdateGameMarketsOperation),
    UpdateGameStartTime(UpdateGameStartTimeOperation),
    PostGameResults(PostGameResultsOperation),
    PostBet(PostBetOperation),
    CancelPendingBets(CancelPendingBetsOperation),
}

impl Operation {
    pub fn validate(&self) -> Result<(), ChainError> {
        match self {
            Operation::CreateGame(op) => op.validate(),
            Operation::CancelGame(op) => op.validate(),
            Operation::UpdateGameMarkets(op) => op.validate(),
            Operation::UpdateGameStartTime(op) => op.validate(),
            Operation::PostGameResults(op) => op.validate(),
            Operation::PostBet(op) => op.validate(),
            Operation::CancelPendingBets(op) => op.validate(),
        }
    }
}
