//! Operation evaluators - thin dispatchers between validated operations and
//! the betting service.
//!
//! Each evaluator re-runs the operation's syntactic validation, verifies
//! account existence and moderator authority where applicable, resolves
//! referenced uuids, and delegates. Evaluators never touch the store tables
//! directly.

use std::collections::BTreeSet;

use chrono::Duration;

use crate::errors::ChainError;
use crate::events::VirtualOperation;
use crate::protocol::betting::market::Market;
use crate::protocol::odds::Odds;
use crate::protocol::operations::{
    CancelGameOperation, CancelPendingBetsOperation, CreateGameOperation, Operation,
    PostBetOperation, PostGameResultsOperation, UpdateGameMarketsOperation,
    UpdateGameStartTimeOperation,
};
use crate::storage::objects::{BetKind, GameStatus, PendingBetId};
use crate::storage::Database;

use super::service::BettingService;

pub fn apply_operation(db: &mut Database, op: &Operation) -> Result<(), ChainError> {
    op.validate()?;
    match op {
        Operation::CreateGame(op) => create_game(db, op),
        Operation::CancelGame(op) => cancel_game(db, op),
        Operation::UpdateGameMarkets(op) => update_game_markets(db, op),
        Operation::UpdateGameStartTime(op) => update_game_start_time(db, op),
        Operation::PostGameResults(op) => post_game_results(db, op),
        Operation::PostBet(op) => post_bet(db, op),
        Operation::CancelPendingBets(op) => cancel_pending_bets(db, op),
    }
}

fn check_moderator(db: &Database, account: &str) -> Result<(), ChainError> {
    if !BettingService::is_moderator_in(db, account) {
        return Err(ChainError::NotModerator(account.to_string()));
    }
    Ok(())
}

// ============================================================================
// GAME LIFECYCLE
// ============================================================================

fn create_game(db: &mut Database, op: &CreateGameOperation) -> Result<(), ChainError> {
    check_moderator(db, &op.moderator)?;
    if db.game_exists(&op.uuid) {
        return Err(ChainError::Validation(format!(
            "game uuid already used: {}",
            op.uuid
        )));
    }
    if op.start_time <= db.head_block_time() {
        return Err(ChainError::Validation(
            "game start time must be in the future".into(),
        ));
    }

    let markets: BTreeSet<Market> = op.markets.iter().copied().collect();
    let auto_resolve_time = op.start_time + Duration::seconds(op.auto_resolve_delay_sec as i64);
    db.create_game(
        op.uuid,
        op.name.clone(),
        op.start_time,
        auto_resolve_time,
        markets,
    );
    Ok(())
}

fn cancel_game(db: &mut Database, op: &CancelGameOperation) -> Result<(), ChainError> {
    check_moderator(db, &op.moderator)?;
    let game_id = db.game_by_uuid(&op.game_uuid)?.id;

    let mut svc = BettingService::new(db);
    svc.cancel_bets(game_id)?;
    svc.cancel_game(game_id)
}

fn update_game_markets(db: &mut Database, op: &UpdateGameMarketsOperation) -> Result<(), ChainError> {
    check_moderator(db, &op.moderator)?;
    let game = db.game_by_uuid(&op.game_uuid)?;
    let (game_id, status) = (game.id, game.status);
    if matches!(
        status,
        GameStatus::Finished | GameStatus::Resolved | GameStatus::Expired
    ) {
        return Err(ChainError::InvalidGameState {
            uuid: op.game_uuid,
            status,
        });
    }

    let new_markets: BTreeSet<Market> = op.markets.iter().copied().collect();
    let removed: BTreeSet<Market> = game
        .markets
        .difference(&new_markets)
        .copied()
        .collect();

    db.update_game(game_id, |g| g.markets = new_markets)?;

    if !removed.is_empty() {
        BettingService::new(db).cancel_bets_by_markets(game_id, &removed)?;
    }
    Ok(())
}

fn update_game_start_time(
    db: &mut Database,
    op: &UpdateGameStartTimeOperation,
) -> Result<(), ChainError> {
    check_moderator(db, &op.moderator)?;
    let game = db.game_by_uuid(&op.game_uuid)?;
    let (game_id, status, old_start) = (game.id, game.status, game.start_time);
    if matches!(
        status,
        GameStatus::Finished | GameStatus::Resolved | GameStatus::Expired
    ) {
        return Err(ChainError::InvalidGameState {
            uuid: op.game_uuid,
            status,
        });
    }
    if op.start_time <= db.head_block_time() {
        return Err(ChainError::Validation(
            "game start time must be in the future".into(),
        ));
    }

    // The auto-resolve deadline keeps its distance from kick-off.
    let shift = op.start_time - old_start;
    db.update_game(game_id, |g| {
        g.start_time = op.start_time;
        g.auto_resolve_time = g.auto_resolve_time + shift;
    })?;

    BettingService::new(db).cancel_bets_created_after(game_id, old_start)
}

fn post_game_results(db: &mut Database, op: &PostGameResultsOperation) -> Result<(), ChainError> {
    check_moderator(db, &op.moderator)?;
    let game = db.game_by_uuid(&op.game_uuid)?;
    let (game_id, status) = (game.id, game.status);
    if !matches!(status, GameStatus::Started | GameStatus::Finished) {
        return Err(ChainError::InvalidGameState {
            uuid: op.game_uuid,
            status,
        });
    }
    for wincase in &op.wincases {
        if !game.markets.contains(&wincase.market()) {
            return Err(ChainError::Validation(format!(
                "wincase {:?} does not belong to an open market of the game",
                wincase
            )));
        }
    }

    db.update_game(game_id, |g| {
        g.results = op.wincases.iter().copied().collect();
        if g.status == GameStatus::Started {
            g.status = GameStatus::Finished;
        }
    })?;

    if status == GameStatus::Started {
        db.push_virtual_op(VirtualOperation::GameStatusChanged {
            game_uuid: op.game_uuid,
            old_status: GameStatus::Started,
            new_status: GameStatus::Finished,
        });
    }
    Ok(())
}

// ============================================================================
// BETS
// ============================================================================

fn post_bet(db: &mut Database, op: &PostBetOperation) -> Result<(), ChainError> {
    db.check_account_existence(&op.better)?;
    let game = db.game_by_uuid(&op.game_uuid)?;
    let (game_id, status) = (game.id, game.status);

    match status {
        GameStatus::Created => {}
        GameStatus::Started if op.live => {}
        _ => {
            return Err(ChainError::InvalidGameState {
                uuid: op.game_uuid,
                status,
            })
        }
    }
    if !game.markets.contains(&op.wincase.market()) {
        return Err(ChainError::Validation(format!(
            "market of wincase {:?} is not open for this game",
            op.wincase
        )));
    }

    let odds = Odds::new(op.odds.numerator, op.odds.denominator)?;
    let kind = if op.live {
        BetKind::Live
    } else {
        BetKind::NonLive
    };

    BettingService::new(db)
        .create_pending_bet(&op.better, op.stake, odds, op.wincase, game_id, op.uuid, kind)
        .map(|_| ())
}

fn cancel_pending_bets(db: &mut Database, op: &CancelPendingBetsOperation) -> Result<(), ChainError> {
    db.check_account_existence(&op.better)?;

    // Resolve and authorize every uuid before the first cancellation.
    let mut ids: Vec<PendingBetId> = Vec::with_capacity(op.bet_uuids.len());
    for uuid in &op.bet_uuids {
        let bet = db
            .pending_bet_by_uuid(uuid)
            .ok_or(ChainError::UnknownBet {
                uuid: *uuid,
                better: op.better.clone(),
            })?;
        if bet.data.better != op.better {
            return Err(ChainError::UnknownBet {
                uuid: *uuid,
                better: op.better.clone(),
            });
        }
        ids.push(bet.id);
    }

    let mut svc = BettingService::new(db);
    for id in ids {
        svc.cancel_pending_bet(id)?;
    }
    Ok(())
}
