// ============================================================================
// TEST HELPERS - shared fixtures for the betting integration suites
// ============================================================================
#![allow(dead_code)]

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use wagerbook::protocol::config::BLOCK_INTERVAL_SECS;
use wagerbook::{
    Asset, BetKind, BettingService, Chain, Database, GameId, Genesis, Market, Odds,
    PendingBetId, Wincase,
};

pub const MODERATOR: &str = "moderator";
pub const ACTORS: [&str; 4] = ["alice", "bob", "carol", "dave"];

/// Deterministic name-based uuids, so tests replay identically.
pub fn uuid_of(name: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

pub fn genesis_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub fn block_interval() -> Duration {
    Duration::seconds(BLOCK_INTERVAL_SECS)
}

/// Every actor starts with 1000 SCR; the moderator holds no coins.
pub fn genesis() -> Genesis {
    let mut accounts: Vec<(String, Asset)> = ACTORS
        .iter()
        .map(|name| (name.to_string(), Asset::from_scr(1000)))
        .collect();
    accounts.push((MODERATOR.to_string(), Asset::ZERO));
    Genesis {
        moderator: MODERATOR.to_string(),
        genesis_time: genesis_time(),
        accounts,
    }
}

/// Route service logs through the test writer; repeated calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn test_db() -> Database {
    init_tracing();
    genesis().build().unwrap()
}

pub fn test_chain() -> Chain {
    init_tracing();
    Chain::new(&genesis()).unwrap()
}

/// A game starting one hour after head time, auto-resolving one hour after
/// that.
pub fn create_game(db: &mut Database, name: &str, markets: &[Market]) -> GameId {
    let start = db.head_block_time() + Duration::hours(1);
    db.create_game(
        uuid_of(name),
        name.to_string(),
        start,
        start + Duration::hours(1),
        markets.iter().copied().collect::<BTreeSet<Market>>(),
    )
}

pub fn post_bet(
    db: &mut Database,
    better: &str,
    game: GameId,
    bet_name: &str,
    wincase: Wincase,
    odds: (u32, u32),
    stake_scr: i64,
    kind: BetKind,
) -> PendingBetId {
    let odds = Odds::new(odds.0, odds.1).unwrap();
    BettingService::new(db)
        .create_pending_bet(
            better,
            Asset::from_scr(stake_scr),
            odds,
            wincase,
            game,
            uuid_of(bet_name),
            kind,
        )
        .unwrap()
}

pub fn pending_volume(db: &Database) -> Asset {
    db.pending_bets().map(|b| b.data.stake).sum()
}

pub fn matched_volume(db: &Database) -> Asset {
    db.matched_bets()
        .map(|b| b.bet1_data.stake + b.bet2_data.stake)
        .sum()
}

/// The store-wide invariants that must hold after every committed operation:
/// stats equal the table sums, every bet sits on the market of its wincase,
/// matched legs are inverses, and the uuid history covers every live bet.
pub fn assert_betting_invariants(db: &Database) {
    let stats = db.dgp().betting_stats;
    assert_eq!(
        stats.pending_bets_volume,
        pending_volume(db),
        "pending volume stat diverged from the pending store"
    );
    assert_eq!(
        stats.matched_bets_volume,
        matched_volume(db),
        "matched volume stat diverged from the matched store"
    );

    for bet in db.pending_bets() {
        assert_eq!(bet.market, bet.data.wincase.market());
        assert!(db.bet_uuid_known(&bet.data.uuid));
    }
    for bet in db.matched_bets() {
        assert_eq!(bet.market, bet.bet1_data.wincase.market());
        assert_eq!(bet.bet2_data.wincase, bet.bet1_data.wincase.inverse());
        assert!(db.bet_uuid_known(&bet.bet1_data.uuid));
        assert!(db.bet_uuid_known(&bet.bet2_data.uuid));
    }
}
