//! Per-market winners of a finished game.
//!
//! Read-only: walks the matched bets of a game against its posted results.
//! A matched bet whose market has no posted result is skipped (third-result
//! markets such as an untouched handicap line stay unsettled).

use serde::Serialize;
use uuid::Uuid;

use crate::errors::ChainError;
use crate::protocol::asset::Asset;
use crate::protocol::betting::market::{Market, Wincase};
use crate::storage::objects::{AccountName, GameStatus};
use crate::storage::Database;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BetOutcome {
    pub uuid: Uuid,
    pub better: AccountName,
    pub wincase: Wincase,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketWinner {
    pub market: Market,
    /// What the winner takes off the loser.
    pub profit: Asset,
    /// The winner's own stake plus the profit.
    pub income: Asset,
    pub winner: BetOutcome,
    pub loser: BetOutcome,
}

pub fn game_winners(db: &Database, game_uuid: &Uuid) -> Result<Vec<MarketWinner>, ChainError> {
    let game = db.game_by_uuid(game_uuid)?;
    if !matches!(game.status, GameStatus::Finished | GameStatus::Resolved) {
        return Err(ChainError::InvalidGameState {
            uuid: *game_uuid,
            status: game.status,
        });
    }

    let mut winners = Vec::new();
    for id in db.matched_bets_by_game(game.id) {
        let bet = db.matched_bet(id)?;
        let bet1_won = game.results.contains(&bet.bet1_data.wincase);
        let bet2_won = game.results.contains(&bet.bet2_data.wincase);
        let (winner, loser) = match (bet1_won, bet2_won) {
            (true, false) => (&bet.bet1_data, &bet.bet2_data),
            (false, true) => (&bet.bet2_data, &bet.bet1_data),
            _ => continue,
        };

        winners.push(MarketWinner {
            market: bet.market,
            profit: loser.stake,
            income: winner.stake + loser.stake,
            winner: BetOutcome {
                uuid: winner.uuid,
                better: winner.better.clone(),
                wincase: winner.wincase,
            },
            loser: BetOutcome {
                uuid: loser.uuid,
                better: loser.better.clone(),
                wincase: loser.wincase,
            },
        });
    }
    Ok(winners)
}
