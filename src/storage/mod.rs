// ============================================================================
// WAGERBOOK - CHAIN STATE STORE
// ============================================================================
//
// Owns every betting-relevant table of the chain state:
//
//   accounts            name -> balance ledger
//   pending_bets        unmatched offers, scanned by (game, market/created/
//                       better/kind) secondary orderings
//   matched_bets        locked pairs, scanned by (game, market)
//   games               scheduled events with lifecycle status
//   bet_uuid_history    every bet uuid ever accepted (replay protection)
//   betting_property    moderator singleton
//   dgp                 head block number/time + betting volume stats
//   virtual_ops         event trail for the block side-channel
//
// CONCURRENCY MODEL:
// Single-threaded cooperative. Exactly one transaction mutates state at a
// time during block apply; there are no suspension points and no internal
// locks. The host wraps the whole chain in a lock if it needs shared access.
//
// UNDO MODEL:
// begin_undo() snapshots the full state; undo() restores the snapshot,
// commit_undo() discards it. Sessions nest (block session around
// per-transaction sessions). Events live inside the snapshotted state, so a
// rolled-back transaction emits nothing.
//
// ============================================================================

pub mod objects;

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ChainError;
use crate::events::VirtualOperation;
use crate::protocol::betting::market::Market;
use objects::{
    Account, AccountName, BetData, BetKind, BettingProperty, BettingStats,
    DynamicGlobalProperties, Game, GameId, GameStatus, MatchedBet, MatchedBetId, PendingBet,
    PendingBetId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct State {
    accounts: BTreeMap<AccountName, Account>,
    pending_bets: BTreeMap<PendingBetId, PendingBet>,
    matched_bets: BTreeMap<MatchedBetId, MatchedBet>,
    games: BTreeMap<GameId, Game>,
    bet_uuid_history: BTreeSet<Uuid>,
    betting_property: BettingProperty,
    dgp: DynamicGlobalProperties,
    virtual_ops: Vec<VirtualOperation>,
    next_pending_bet_id: u64,
    next_matched_bet_id: u64,
    next_game_id: u64,
}

/// The chain database. All reads and writes of betting state go through
/// here; mutations are reversible via the undo stack.
#[derive(Debug, Clone)]
pub struct Database {
    state: State,
    undo_stack: Vec<State>,
}

impl Database {
    pub fn new(moderator: AccountName, genesis_time: DateTime<Utc>) -> Self {
        Database {
            state: State {
                accounts: BTreeMap::new(),
                pending_bets: BTreeMap::new(),
                matched_bets: BTreeMap::new(),
                games: BTreeMap::new(),
                bet_uuid_history: BTreeSet::new(),
                betting_property: BettingProperty { moderator },
                dgp: DynamicGlobalProperties {
                    head_block_num: 0,
                    head_block_time: genesis_time,
                    betting_stats: BettingStats::default(),
                },
                virtual_ops: Vec::new(),
                next_pending_bet_id: 0,
                next_matched_bet_id: 0,
                next_game_id: 0,
            },
            undo_stack: Vec::new(),
        }
    }

    // ========================================================================
    // UNDO STACK
    // ========================================================================

    /// Open an undo session: snapshot the state as it is right now.
    pub fn begin_undo(&mut self) {
        self.undo_stack.push(self.state.clone());
    }

    /// Close the innermost session keeping its mutations.
    pub fn commit_undo(&mut self) {
        self.undo_stack.pop();
    }

    /// Close the innermost session reverting every mutation made inside it.
    pub fn undo(&mut self) {
        if let Some(snapshot) = self.undo_stack.pop() {
            self.state = snapshot;
        }
    }

    // ========================================================================
    // GLOBAL PROPERTIES
    // ========================================================================

    pub fn dgp(&self) -> &DynamicGlobalProperties {
        &self.state.dgp
    }

    pub fn update_dgp(&mut self, f: impl FnOnce(&mut DynamicGlobalProperties)) {
        f(&mut self.state.dgp);
    }

    pub fn head_block_time(&self) -> DateTime<Utc> {
        self.state.dgp.head_block_time
    }

    pub fn betting_property(&self) -> &BettingProperty {
        &self.state.betting_property
    }

    // ========================================================================
    // ACCOUNTS (ledger operations live in account.rs)
    // ========================================================================

    pub(crate) fn accounts(&self) -> &BTreeMap<AccountName, Account> {
        &self.state.accounts
    }

    pub(crate) fn accounts_mut(&mut self) -> &mut BTreeMap<AccountName, Account> {
        &mut self.state.accounts
    }

    // ========================================================================
    // BET UUID HISTORY
    // ========================================================================

    pub fn bet_uuid_known(&self, uuid: &Uuid) -> bool {
        self.state.bet_uuid_history.contains(uuid)
    }

    pub fn record_bet_uuid(&mut self, uuid: Uuid) -> Result<(), ChainError> {
        if !self.state.bet_uuid_history.insert(uuid) {
            return Err(ChainError::DuplicateUuid(uuid));
        }
        Ok(())
    }

    pub fn bet_uuid_history_len(&self) -> usize {
        self.state.bet_uuid_history.len()
    }

    // ========================================================================
    // GAMES
    // ========================================================================

    pub fn create_game(
        &mut self,
        uuid: Uuid,
        name: String,
        start_time: DateTime<Utc>,
        auto_resolve_time: DateTime<Utc>,
        markets: BTreeSet<Market>,
    ) -> GameId {
        let id = GameId(self.state.next_game_id);
        self.state.next_game_id += 1;
        self.state.games.insert(
            id,
            Game {
                id,
                uuid,
                name,
                status: GameStatus::Created,
                start_time,
                auto_resolve_time,
                markets,
                results: BTreeSet::new(),
            },
        );
        id
    }

    pub fn game(&self, id: GameId) -> Result<&Game, ChainError> {
        self.state
            .games
            .get(&id)
            .ok_or_else(|| ChainError::InvariantViolation(format!("no game with id {}", id)))
    }

    pub fn game_by_uuid(&self, uuid: &Uuid) -> Result<&Game, ChainError> {
        self.state
            .games
            .values()
            .find(|g| g.uuid == *uuid)
            .ok_or(ChainError::UnknownGame(*uuid))
    }

    pub fn game_exists(&self, uuid: &Uuid) -> bool {
        self.state.games.values().any(|g| g.uuid == *uuid)
    }

    pub fn update_game(
        &mut self,
        id: GameId,
        f: impl FnOnce(&mut Game),
    ) -> Result<(), ChainError> {
        let game = self
            .state
            .games
            .get_mut(&id)
            .ok_or_else(|| ChainError::InvariantViolation(format!("no game with id {}", id)))?;
        f(game);
        Ok(())
    }

    pub fn remove_game(&mut self, id: GameId) {
        self.state.games.remove(&id);
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.state.games.values()
    }

    /// Games whose auto-resolve deadline has elapsed, in id order. The order
    /// must be deterministic for replay consistency.
    pub fn games_to_auto_resolve(&self, head_time: DateTime<Utc>) -> Vec<GameId> {
        self.state
            .games
            .values()
            .filter(|g| g.auto_resolve_time <= head_time)
            .map(|g| g.id)
            .collect()
    }

    // ========================================================================
    // PENDING BETS
    // ========================================================================

    pub fn create_pending_bet(
        &mut self,
        game: GameId,
        market: Market,
        data: BetData,
    ) -> PendingBetId {
        let id = PendingBetId(self.state.next_pending_bet_id);
        self.state.next_pending_bet_id += 1;
        self.state.pending_bets.insert(
            id,
            PendingBet {
                id,
                game,
                market,
                data,
            },
        );
        id
    }

    pub fn pending_bet(&self, id: PendingBetId) -> Result<&PendingBet, ChainError> {
        self.state.pending_bets.get(&id).ok_or_else(|| {
            ChainError::InvariantViolation(format!("no pending bet with id {}", id))
        })
    }

    pub fn pending_bet_by_uuid(&self, uuid: &Uuid) -> Option<&PendingBet> {
        self.state.pending_bets.values().find(|b| b.data.uuid == *uuid)
    }

    pub fn update_pending_bet(
        &mut self,
        id: PendingBetId,
        f: impl FnOnce(&mut PendingBet),
    ) -> Result<(), ChainError> {
        let bet = self.state.pending_bets.get_mut(&id).ok_or_else(|| {
            ChainError::InvariantViolation(format!("no pending bet with id {}", id))
        })?;
        f(bet);
        Ok(())
    }

    pub fn remove_pending_bet(&mut self, id: PendingBetId) {
        self.state.pending_bets.remove(&id);
    }

    pub fn pending_bets(&self) -> impl Iterator<Item = &PendingBet> {
        self.state.pending_bets.values()
    }

    /// Pending bets of a game in (market, id) order.
    pub fn pending_bets_by_game(&self, game: GameId) -> Vec<PendingBetId> {
        let mut keyed: Vec<(Market, PendingBetId)> = self
            .state
            .pending_bets
            .values()
            .filter(|b| b.game == game)
            .map(|b| (b.market, b.id))
            .collect();
        keyed.sort();
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    /// Pending bets of a game in (created, id) order.
    pub fn pending_bets_by_game_ordered_by_created(&self, game: GameId) -> Vec<PendingBetId> {
        let mut keyed: Vec<(DateTime<Utc>, PendingBetId)> = self
            .state
            .pending_bets
            .values()
            .filter(|b| b.game == game)
            .map(|b| (b.data.created, b.id))
            .collect();
        keyed.sort();
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    /// Pending bets of a game with the given kind, in id order.
    pub fn pending_bets_by_game_and_kind(&self, game: GameId, kind: BetKind) -> Vec<PendingBetId> {
        self.state
            .pending_bets
            .values()
            .filter(|b| b.game == game && b.data.kind == kind)
            .map(|b| b.id)
            .collect()
    }

    /// Pending bets of a game owned by a better, in id order.
    pub fn pending_bets_by_game_and_better(
        &self,
        game: GameId,
        better: &str,
    ) -> Vec<PendingBetId> {
        self.state
            .pending_bets
            .values()
            .filter(|b| b.game == game && b.data.better == better)
            .map(|b| b.id)
            .collect()
    }

    pub fn has_pending_bets(&self, game: GameId) -> bool {
        self.state.pending_bets.values().any(|b| b.game == game)
    }

    // ========================================================================
    // MATCHED BETS
    // ========================================================================

    pub fn create_matched_bet(
        &mut self,
        game: GameId,
        market: Market,
        bet1_data: BetData,
        bet2_data: BetData,
    ) -> MatchedBetId {
        let id = MatchedBetId(self.state.next_matched_bet_id);
        self.state.next_matched_bet_id += 1;
        self.state.matched_bets.insert(
            id,
            MatchedBet {
                id,
                game,
                market,
                bet1_data,
                bet2_data,
            },
        );
        id
    }

    pub fn matched_bet(&self, id: MatchedBetId) -> Result<&MatchedBet, ChainError> {
        self.state.matched_bets.get(&id).ok_or_else(|| {
            ChainError::InvariantViolation(format!("no matched bet with id {}", id))
        })
    }

    pub fn remove_matched_bet(&mut self, id: MatchedBetId) {
        self.state.matched_bets.remove(&id);
    }

    pub fn matched_bets(&self) -> impl Iterator<Item = &MatchedBet> {
        self.state.matched_bets.values()
    }

    /// Matched bets of a game in (market, id) order.
    pub fn matched_bets_by_game(&self, game: GameId) -> Vec<MatchedBetId> {
        let mut keyed: Vec<(Market, MatchedBetId)> = self
            .state
            .matched_bets
            .values()
            .filter(|b| b.game == game)
            .map(|b| (b.market, b.id))
            .collect();
        keyed.sort();
        keyed.into_iter().map(|(_, id)| id).collect()
    }

    pub fn has_matched_bets(&self, game: GameId) -> bool {
        self.state.matched_bets.values().any(|b| b.game == game)
    }

    // ========================================================================
    // VIRTUAL OPERATIONS
    // ========================================================================

    pub fn push_virtual_op(&mut self, op: VirtualOperation) {
        self.state.virtual_ops.push(op);
    }

    pub fn virtual_ops(&self) -> &[VirtualOperation] {
        &self.state.virtual_ops
    }

    pub fn drain_virtual_ops(&mut self) -> Vec<VirtualOperation> {
        std::mem::take(&mut self.state.virtual_ops)
    }

    // ========================================================================
    // STATISTICS
    // ========================================================================

    /// Diagnostic snapshot of table sizes and escrow volumes.
    pub fn stats(&self) -> serde_json::Value {
        serde_json::json!({
            "accounts": self.state.accounts.len(),
            "pending_bets": self.state.pending_bets.len(),
            "matched_bets": self.state.matched_bets.len(),
            "games": self.state.games.len(),
            "bet_uuids_seen": self.state.bet_uuid_history.len(),
            "pending_bets_volume": self.state.dgp.betting_stats.pending_bets_volume.to_string(),
            "matched_bets_volume": self.state.dgp.betting_stats.matched_bets_volume.to_string(),
        })
    }
}
