//! Per-block betting tasks.
//!
//! Two fixed phases of block application touch the betting state outside
//! user transactions:
//!
//!   - `process_games_startup`, before transactions: games whose kick-off
//!     time has arrived move from `Created` to `Started`.
//!   - `process_bets_auto_resolving`, after transactions: games whose
//!     auto-resolve deadline has elapsed are abandoned - every bet is
//!     refunded, the game record is removed, and a status-change event
//!     marks the expiry.
//!
//! Both tasks scan games in id order so replay is deterministic. Each
//! expired game's unwind runs in its own undo session and is atomic with
//! respect to the block.

use tracing::debug;

use crate::betting::service::BettingService;
use crate::errors::ChainError;
use crate::events::VirtualOperation;
use crate::storage::objects::{GameId, GameStatus};
use crate::storage::Database;

pub fn process_games_startup(db: &mut Database) -> Result<(), ChainError> {
    let head_time = db.head_block_time();
    let starting: Vec<GameId> = db
        .games()
        .filter(|g| g.status == GameStatus::Created && g.start_time <= head_time)
        .map(|g| g.id)
        .collect();

    for game_id in starting {
        let game_uuid = db.game(game_id)?.uuid;
        db.update_game(game_id, |g| g.status = GameStatus::Started)?;
        db.push_virtual_op(VirtualOperation::GameStatusChanged {
            game_uuid,
            old_status: GameStatus::Created,
            new_status: GameStatus::Started,
        });
    }
    Ok(())
}

pub fn process_bets_auto_resolving(db: &mut Database) -> Result<(), ChainError> {
    debug!(
        head_block = db.dgp().head_block_num,
        "process_bets_auto_resolving BEGIN"
    );

    for game_id in db.games_to_auto_resolve(db.head_block_time()) {
        db.begin_undo();
        match resolve_game(db, game_id) {
            Ok(()) => db.commit_undo(),
            Err(e) => {
                db.undo();
                return Err(e);
            }
        }
    }

    debug!(
        head_block = db.dgp().head_block_num,
        "process_bets_auto_resolving END"
    );
    Ok(())
}

fn resolve_game(db: &mut Database, game_id: GameId) -> Result<(), ChainError> {
    let game_uuid = db.game(game_id)?.uuid;

    let mut svc = BettingService::new(db);
    svc.cancel_bets(game_id)?;
    svc.cancel_game(game_id)?;

    db.push_virtual_op(VirtualOperation::GameStatusChanged {
        game_uuid,
        old_status: GameStatus::Started,
        new_status: GameStatus::Expired,
    });
    Ok(())
}
