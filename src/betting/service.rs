//! The betting service: every lifecycle mutation of pending and matched
//! bets.
//!
//! All mutations run inside the caller's undo session, so any error unwinds
//! every prior effect of the enclosing transaction. The service itself never
//! retries and never swallows an error.
//!
//! Cancellation distinguishes three refund shapes:
//!   - pending bets are always refunded in full;
//!   - matched legs are refunded when the whole game unwinds;
//!   - the time-partitioned cancel refunds legs created at or after the
//!     cut-off and re-queues older legs into the pending book unchanged.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::ChainError;
use crate::events::{CancelledBetKind, VirtualOperation};
use crate::protocol::asset::Asset;
use crate::protocol::betting::market::{Market, Wincase};
use crate::protocol::odds::Odds;
use crate::storage::objects::{
    BetData, BetKind, GameId, MatchedBetId, PendingBetId,
};
use crate::storage::Database;

pub struct BettingService<'a> {
    db: &'a mut Database,
}

impl<'a> BettingService<'a> {
    pub fn new(db: &'a mut Database) -> Self {
        BettingService { db }
    }

    pub fn is_moderator(&self, account: &str) -> bool {
        Self::is_moderator_in(self.db, account)
    }

    /// Moderator check against a shared borrow, for callers that are not
    /// mutating yet.
    pub fn is_moderator_in(db: &Database, account: &str) -> bool {
        db.betting_property().moderator == account
    }

    // ========================================================================
    // CREATION
    // ========================================================================

    /// Record the uuid, put the bet into the pending book, grow the pending
    /// volume, and take the stake out of the better's balance - in that
    /// order. The balance precondition is checked before any mutation.
    pub fn create_pending_bet(
        &mut self,
        better: &str,
        stake: Asset,
        odds: Odds,
        wincase: Wincase,
        game: GameId,
        bet_uuid: Uuid,
        kind: BetKind,
    ) -> Result<PendingBetId, ChainError> {
        self.db.check_account_existence(better)?;
        let have = self.db.balance(better);
        if have < stake {
            return Err(ChainError::InsufficientFunds { have, need: stake });
        }

        self.db.record_bet_uuid(bet_uuid)?;

        let data = BetData {
            uuid: bet_uuid,
            better: better.to_string(),
            stake,
            bet_odds: odds,
            wincase,
            kind,
            created: self.db.head_block_time(),
        };
        let id = self.db.create_pending_bet(game, wincase.market(), data);

        self.db
            .update_dgp(|dgp| dgp.betting_stats.pending_bets_volume += stake);
        self.db.debit(better, stake)?;

        Ok(id)
    }

    /// Persist a match outcome delivered by the matcher: carve the matched
    /// stakes out of the two opposing pending bets and lock them against
    /// each other. A pending bet drained to zero leaves the book; a partial
    /// match leaves the residue pending.
    pub fn match_pending_bets(
        &mut self,
        bet1_id: PendingBetId,
        bet2_id: PendingBetId,
        stake1: Asset,
        stake2: Asset,
    ) -> Result<MatchedBetId, ChainError> {
        let bet1 = self.db.pending_bet(bet1_id)?.clone();
        let bet2 = self.db.pending_bet(bet2_id)?.clone();

        if bet1.game != bet2.game || bet1.market != bet2.market {
            return Err(ChainError::InvariantViolation(
                "matched sides must share one market of one game".into(),
            ));
        }
        if bet2.data.wincase != bet1.data.wincase.inverse() {
            return Err(ChainError::InvariantViolation(
                "matched sides must be inverse wincases".into(),
            ));
        }
        if stake1.is_zero()
            || stake1 > bet1.data.stake
            || stake2 > bet2.data.stake
            || stake2 != bet1.data.bet_odds.opposite_stake(stake1)
        {
            return Err(ChainError::InvariantViolation(
                "matched stakes are inconsistent with the agreed odds".into(),
            ));
        }

        for (id, bet, matched) in [(bet1_id, &bet1, stake1), (bet2_id, &bet2, stake2)] {
            if bet.data.stake == matched {
                self.db.remove_pending_bet(id);
            } else {
                self.db
                    .update_pending_bet(id, |o| o.data.stake -= matched)?;
            }
        }

        let mut leg1 = bet1.data;
        leg1.stake = stake1;
        let mut leg2 = bet2.data;
        leg2.stake = stake2;
        let id = self
            .db
            .create_matched_bet(bet1.game, bet1.market, leg1, leg2);

        let moved = stake1 + stake2;
        self.db.update_dgp(|dgp| {
            dgp.betting_stats.pending_bets_volume -= moved;
            dgp.betting_stats.matched_bets_volume += moved;
        });

        Ok(id)
    }

    // ========================================================================
    // WHOLE-GAME CANCELLATION
    // ========================================================================

    /// Cancel every pending bet of the game, then every matched bet.
    pub fn cancel_bets(&mut self, game_id: GameId) -> Result<(), ChainError> {
        self.cancel_pending_bets(game_id)?;
        self.cancel_matched_bets(game_id)
    }

    /// Time-partitioned cancel, used when game terms change mid-flight.
    ///
    /// Every pending bet of the game is refunded regardless of its own
    /// creation time. Each matched leg is judged on its own: a leg created
    /// at or after `created_after` was placed under terms that no longer
    /// apply and is refunded; an older leg keeps its place in the book and
    /// is restored to pending with its original odds and creation time.
    /// Both legs are processed before the matched record is removed.
    pub fn cancel_bets_created_after(
        &mut self,
        game_id: GameId,
        created_after: DateTime<Utc>,
    ) -> Result<(), ChainError> {
        let game_uuid = self.db.game(game_id)?.uuid;

        let pending = self.db.pending_bets_by_game_ordered_by_created(game_id);
        self.cancel_pending_bets_in(&pending, game_uuid)?;

        for id in self.db.matched_bets_by_game(game_id) {
            let bet = self.db.matched_bet(id)?.clone();
            for leg in [&bet.bet1_data, &bet.bet2_data] {
                if leg.created >= created_after {
                    self.return_bet(leg, game_uuid)?;
                } else {
                    self.restore_pending_bet(leg, game_uuid)?;
                }
            }
            self.db.remove_matched_bet(id);
        }
        Ok(())
    }

    /// Market-partitioned cancel: unwind exactly the bets whose market was
    /// withdrawn from the game. Matched legs are always refunded here, never
    /// re-queued.
    pub fn cancel_bets_by_markets(
        &mut self,
        game_id: GameId,
        cancelled_markets: &BTreeSet<Market>,
    ) -> Result<(), ChainError> {
        let game_uuid = self.db.game(game_id)?.uuid;

        let mut pending_keyed = Vec::new();
        for id in self.db.pending_bets_by_game(game_id) {
            pending_keyed.push((self.db.pending_bet(id)?.market, id));
        }
        let pending = intersect_by_market(&pending_keyed, cancelled_markets);
        self.cancel_pending_bets_in(&pending, game_uuid)?;

        let mut matched_keyed = Vec::new();
        for id in self.db.matched_bets_by_game(game_id) {
            matched_keyed.push((self.db.matched_bet(id)?.market, id));
        }
        let matched = intersect_by_market(&matched_keyed, cancelled_markets);
        self.cancel_matched_bets_in(&matched, game_uuid)
    }

    /// Remove the game record. The game must not have any associated bet in
    /// either store; callers cancel bets first.
    pub fn cancel_game(&mut self, game_id: GameId) -> Result<(), ChainError> {
        let game_uuid = self.db.game(game_id)?.uuid;
        if self.db.has_matched_bets(game_id) || self.db.has_pending_bets(game_id) {
            return Err(ChainError::GameHasBets(game_uuid));
        }
        self.db.remove_game(game_id);
        Ok(())
    }

    // ========================================================================
    // PENDING BETS
    // ========================================================================

    pub fn cancel_pending_bet(&mut self, id: PendingBetId) -> Result<(), ChainError> {
        let game = self.db.pending_bet(id)?.game;
        let game_uuid = self.db.game(game)?.uuid;
        self.cancel_pending_bet_of(id, game_uuid)
    }

    pub fn cancel_pending_bets(&mut self, game_id: GameId) -> Result<(), ChainError> {
        let game_uuid = self.db.game(game_id)?.uuid;
        let ids = self.db.pending_bets_by_game(game_id);
        self.cancel_pending_bets_in(&ids, game_uuid)
    }

    pub fn cancel_pending_bets_by_kind(
        &mut self,
        game_id: GameId,
        kind: BetKind,
    ) -> Result<(), ChainError> {
        let game_uuid = self.db.game(game_id)?.uuid;
        let ids = self.db.pending_bets_by_game_and_kind(game_id, kind);
        self.cancel_pending_bets_in(&ids, game_uuid)
    }

    /// Cancel a pre-selected id list. The list is a snapshot, so removal
    /// while processing cannot invalidate it.
    pub fn cancel_pending_bets_in(
        &mut self,
        ids: &[PendingBetId],
        game_uuid: Uuid,
    ) -> Result<(), ChainError> {
        for &id in ids {
            self.cancel_pending_bet_of(id, game_uuid)?;
        }
        Ok(())
    }

    pub fn cancel_pending_bet_of(
        &mut self,
        id: PendingBetId,
        game_uuid: Uuid,
    ) -> Result<(), ChainError> {
        let data = self.db.pending_bet(id)?.data.clone();

        self.db.credit(&data.better, data.stake)?;
        self.push_bet_cancelled_op(&data, game_uuid, CancelledBetKind::Pending);
        self.db
            .update_dgp(|dgp| dgp.betting_stats.pending_bets_volume -= data.stake);
        self.db.remove_pending_bet(id);
        Ok(())
    }

    // ========================================================================
    // MATCHED BETS
    // ========================================================================

    pub fn cancel_matched_bets(&mut self, game_id: GameId) -> Result<(), ChainError> {
        let game_uuid = self.db.game(game_id)?.uuid;
        let ids = self.db.matched_bets_by_game(game_id);
        self.cancel_matched_bets_in(&ids, game_uuid)
    }

    pub fn cancel_matched_bets_in(
        &mut self,
        ids: &[MatchedBetId],
        game_uuid: Uuid,
    ) -> Result<(), ChainError> {
        for &id in ids {
            self.cancel_matched_bet(id, game_uuid)?;
        }
        Ok(())
    }

    pub fn cancel_matched_bet(
        &mut self,
        id: MatchedBetId,
        game_uuid: Uuid,
    ) -> Result<(), ChainError> {
        let bet = self.db.matched_bet(id)?.clone();

        self.return_bet(&bet.bet1_data, game_uuid)?;
        self.return_bet(&bet.bet2_data, game_uuid)?;

        self.db.remove_matched_bet(id);
        Ok(())
    }

    /// Refund one matched leg: stake back to the better, matched volume
    /// shrinks, a cancellation event is emitted.
    fn return_bet(&mut self, bet: &BetData, game_uuid: Uuid) -> Result<(), ChainError> {
        self.db.credit(&bet.better, bet.stake)?;
        self.push_bet_cancelled_op(bet, game_uuid, CancelledBetKind::Matched);
        self.db
            .update_dgp(|dgp| dgp.betting_stats.matched_bets_volume -= bet.stake);
        Ok(())
    }

    /// Put a matched leg back into the pending book. If a semantically
    /// identical pending bet exists - same creation time, odds, kind, and a
    /// wincase neither less nor greater under the total order - the stakes
    /// coalesce; otherwise a fresh pending bet carries the leg unchanged.
    /// The balance is untouched: the stake was already held when the bet
    /// matched.
    fn restore_pending_bet(&mut self, bet: &BetData, game_uuid: Uuid) -> Result<(), ChainError> {
        let game_id = self.db.game_by_uuid(&game_uuid)?.id;

        let mut found = None;
        for id in self.db.pending_bets_by_game_and_better(game_id, &bet.better) {
            let data = &self.db.pending_bet(id)?.data;
            if data.created == bet.created
                && data.bet_odds == bet.bet_odds
                && data.kind == bet.kind
                && !(data.wincase < bet.wincase)
                && !(bet.wincase < data.wincase)
            {
                found = Some(id);
                break;
            }
        }

        match found {
            Some(id) => {
                let stake = bet.stake;
                self.db.update_pending_bet(id, |o| o.data.stake += stake)?;
            }
            None => {
                self.db
                    .create_pending_bet(game_id, bet.wincase.market(), bet.clone());
            }
        }

        let stake = bet.stake;
        self.db.update_dgp(|dgp| {
            dgp.betting_stats.pending_bets_volume += stake;
            dgp.betting_stats.matched_bets_volume -= stake;
        });

        self.db.push_virtual_op(VirtualOperation::BetRestored {
            game_uuid,
            better: bet.better.clone(),
            bet_uuid: bet.uuid,
            stake: bet.stake,
        });
        Ok(())
    }

    fn push_bet_cancelled_op(&mut self, bet: &BetData, game_uuid: Uuid, kind: CancelledBetKind) {
        self.db.push_virtual_op(VirtualOperation::BetCancelled {
            game_uuid,
            better: bet.better.clone(),
            bet_uuid: bet.uuid,
            stake: bet.stake,
            kind,
        });
    }
}

/// Merge-style intersection of a (market, id) sequence sorted by market with
/// a sorted market set. A market may carry several bets; all of them are
/// kept.
fn intersect_by_market<I: Copy>(bets: &[(Market, I)], markets: &BTreeSet<Market>) -> Vec<I> {
    let markets: Vec<&Market> = markets.iter().collect();
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < bets.len() && j < markets.len() {
        if bets[i].0 < *markets[j] {
            i += 1;
        } else if *markets[j] < bets[i].0 {
            j += 1;
        } else {
            out.push(bets[i].1);
            i += 1;
        }
    }
    out
}
