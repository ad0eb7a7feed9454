//! Betting service tests: volume accounting, matching, and the three
//! cancellation shapes (refund, re-queue, market intersection).

mod common;

use chrono::Duration;

use common::*;
use wagerbook::{
    Asset, BetKind, BettingService, CancelledBetKind, ChainError, Market, Odds,
    VirtualOperation, Wincase,
};

// ============================================================================
// CREATION
// ============================================================================

#[test]
fn posting_a_bet_escrows_the_stake() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (3, 1),
        500,
        BetKind::Live,
    );

    assert_eq!(db.balance("alice"), Asset::from_scr(500));
    assert_eq!(db.dgp().betting_stats.pending_bets_volume, Asset::from_scr(500));
    assert!(db.bet_uuid_known(&uuid_of("b1")));
    assert_betting_invariants(&db);
}

#[test]
fn posting_a_bet_with_a_seen_uuid_is_rejected() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);
    post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (3, 1),
        100,
        BetKind::Live,
    );

    let err = BettingService::new(&mut db)
        .create_pending_bet(
            "bob",
            Asset::from_scr(100),
            Odds::new(3, 1).unwrap(),
            Wincase::GoalHomeNo,
            game,
            uuid_of("b1"),
            BetKind::Live,
        )
        .unwrap_err();
    assert_eq!(err, ChainError::DuplicateUuid(uuid_of("b1")));
}

#[test]
fn posting_a_bet_beyond_the_balance_mutates_nothing() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    let err = BettingService::new(&mut db)
        .create_pending_bet(
            "alice",
            Asset::from_scr(2000),
            Odds::new(2, 1).unwrap(),
            Wincase::GoalHomeYes,
            game,
            uuid_of("b1"),
            BetKind::Live,
        )
        .unwrap_err();

    assert_eq!(
        err,
        ChainError::InsufficientFunds {
            have: Asset::from_scr(1000),
            need: Asset::from_scr(2000),
        }
    );
    assert_eq!(db.balance("alice"), Asset::from_scr(1000));
    assert_eq!(db.pending_bets().count(), 0);
    assert!(!db.bet_uuid_known(&uuid_of("b1")));
    assert_eq!(db.dgp().betting_stats.pending_bets_volume, Asset::ZERO);
}

// ============================================================================
// CANCELLATION ROUND-TRIP
// ============================================================================

#[test]
fn cancel_returns_the_stake_and_leaves_only_the_uuid_behind() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);
    let id = post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (3, 1),
        500,
        BetKind::Live,
    );

    BettingService::new(&mut db).cancel_pending_bet(id).unwrap();

    assert_eq!(db.balance("alice"), Asset::from_scr(1000));
    assert_eq!(db.pending_bets().count(), 0);
    assert_eq!(db.dgp().betting_stats.pending_bets_volume, Asset::ZERO);
    // The uuid history is monotone: a cancelled uuid can never be replayed.
    assert!(db.bet_uuid_known(&uuid_of("b1")));

    assert_eq!(
        db.virtual_ops(),
        &[VirtualOperation::BetCancelled {
            game_uuid: uuid_of("derby"),
            better: "alice".into(),
            bet_uuid: uuid_of("b1"),
            stake: Asset::from_scr(500),
            kind: CancelledBetKind::Pending,
        }]
    );
    assert_betting_invariants(&db);
}

#[test]
fn cancel_bets_refunds_pending_and_matched_alike() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    let b1 = post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (2, 1),
        100,
        BetKind::Live,
    );
    let b2 = post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::GoalHomeNo,
        (2, 1),
        100,
        BetKind::Live,
    );
    post_bet(
        &mut db,
        "carol",
        game,
        "b3",
        Wincase::GoalHomeYes,
        (2, 1),
        30,
        BetKind::Live,
    );

    BettingService::new(&mut db)
        .match_pending_bets(b1, b2, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap();

    BettingService::new(&mut db).cancel_bets(game).unwrap();

    for name in ["alice", "bob", "carol"] {
        assert_eq!(db.balance(name), Asset::from_scr(1000), "{} not refunded", name);
    }
    assert_eq!(db.pending_bets().count(), 0);
    assert_eq!(db.matched_bets().count(), 0);
    assert_eq!(db.dgp().betting_stats.pending_bets_volume, Asset::ZERO);
    assert_eq!(db.dgp().betting_stats.matched_bets_volume, Asset::ZERO);
    assert_betting_invariants(&db);

    let matched_cancels = db
        .virtual_ops()
        .iter()
        .filter(|op| {
            matches!(
                op,
                VirtualOperation::BetCancelled {
                    kind: CancelledBetKind::Matched,
                    ..
                }
            )
        })
        .count();
    assert_eq!(matched_cancels, 2);
}

// ============================================================================
// MATCHING
// ============================================================================

#[test]
fn a_full_match_drains_both_pending_bets() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    let b1 = post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (2, 1),
        100,
        BetKind::Live,
    );
    let b2 = post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::GoalHomeNo,
        (2, 1),
        100,
        BetKind::Live,
    );

    BettingService::new(&mut db)
        .match_pending_bets(b1, b2, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap();

    assert_eq!(db.pending_bets().count(), 0);
    assert_eq!(db.matched_bets().count(), 1);
    assert_eq!(db.dgp().betting_stats.pending_bets_volume, Asset::ZERO);
    assert_eq!(db.dgp().betting_stats.matched_bets_volume, Asset::from_scr(200));
    assert_betting_invariants(&db);
}

#[test]
fn a_partial_match_leaves_the_residue_pending() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    let b1 = post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (2, 1),
        250,
        BetKind::Live,
    );
    let b2 = post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::GoalHomeNo,
        (2, 1),
        100,
        BetKind::Live,
    );

    BettingService::new(&mut db)
        .match_pending_bets(b1, b2, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap();

    let residue = db.pending_bet(b1).unwrap();
    assert_eq!(residue.data.stake, Asset::from_scr(150));
    assert_eq!(db.dgp().betting_stats.pending_bets_volume, Asset::from_scr(150));
    assert_eq!(db.dgp().betting_stats.matched_bets_volume, Asset::from_scr(200));
    assert_betting_invariants(&db);
}

#[test]
fn mismatched_stakes_are_rejected() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    let b1 = post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (3, 1),
        100,
        BetKind::Live,
    );
    let b2 = post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::GoalHomeNo,
        (3, 2),
        100,
        BetKind::Live,
    );

    // 3/1 against 100 needs 200 on the other side, not 100.
    let err = BettingService::new(&mut db)
        .match_pending_bets(b1, b2, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap_err();
    assert!(matches!(err, ChainError::InvariantViolation(_)));
    assert_betting_invariants(&db);
}

// ============================================================================
// TIME-PARTITIONED CANCEL
// ============================================================================

#[test]
fn legs_created_after_the_cutoff_are_refunded() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);
    let placed_at = db.head_block_time();

    let b1 = post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (2, 1),
        100,
        BetKind::Live,
    );
    let b2 = post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::GoalHomeNo,
        (2, 1),
        100,
        BetKind::Live,
    );
    BettingService::new(&mut db)
        .match_pending_bets(b1, b2, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap();

    // Cutoff at the creation instant: both legs fall on the refund side.
    BettingService::new(&mut db)
        .cancel_bets_created_after(game, placed_at)
        .unwrap();

    assert_eq!(db.balance("alice"), Asset::from_scr(1000));
    assert_eq!(db.balance("bob"), Asset::from_scr(1000));
    assert_eq!(db.pending_bets().count(), 0);
    assert_eq!(db.matched_bets().count(), 0);
    assert_eq!(db.dgp().betting_stats.matched_bets_volume, Asset::ZERO);
    assert_betting_invariants(&db);
}

#[test]
fn legs_created_before_the_cutoff_return_to_the_book_and_coalesce() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);
    let placed_at = db.head_block_time();

    // Alice's single 200 SCR offer is consumed by two partial matches, so
    // the matched store holds two bets with identical alice legs of 100.
    let a = post_bet(
        &mut db,
        "alice",
        game,
        "a",
        Wincase::GoalHomeYes,
        (2, 1),
        200,
        BetKind::Live,
    );
    let b1 = post_bet(
        &mut db,
        "bob",
        game,
        "bob-1",
        Wincase::GoalHomeNo,
        (2, 1),
        100,
        BetKind::Live,
    );
    let b2 = post_bet(
        &mut db,
        "bob",
        game,
        "bob-2",
        Wincase::GoalHomeNo,
        (2, 1),
        100,
        BetKind::Live,
    );
    BettingService::new(&mut db)
        .match_pending_bets(a, b1, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap();
    BettingService::new(&mut db)
        .match_pending_bets(a, b2, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap();
    assert_eq!(db.pending_bets().count(), 0);
    assert_eq!(db.matched_bets().count(), 2);

    BettingService::new(&mut db)
        .cancel_bets_created_after(game, placed_at + Duration::seconds(1))
        .unwrap();

    // No balances move on a restore; the stakes were already held.
    assert_eq!(db.balance("alice"), Asset::from_scr(800));
    assert_eq!(db.balance("bob"), Asset::from_scr(800));

    // Identical restored legs coalesce into a single record per side.
    assert_eq!(db.pending_bets().count(), 2);
    let alice_bet = db
        .pending_bets()
        .find(|b| b.data.better == "alice")
        .unwrap();
    assert_eq!(alice_bet.data.stake, Asset::from_scr(200));
    assert_eq!(alice_bet.data.wincase, Wincase::GoalHomeYes);
    assert_eq!(alice_bet.data.bet_odds, Odds::new(2, 1).unwrap());
    assert_eq!(alice_bet.data.created, placed_at);
    assert_eq!(alice_bet.data.kind, BetKind::Live);

    assert_eq!(db.dgp().betting_stats.pending_bets_volume, Asset::from_scr(400));
    assert_eq!(db.dgp().betting_stats.matched_bets_volume, Asset::ZERO);

    let restores = db
        .virtual_ops()
        .iter()
        .filter(|op| matches!(op, VirtualOperation::BetRestored { .. }))
        .count();
    assert_eq!(restores, 4);
    assert_betting_invariants(&db);
}

// ============================================================================
// MARKET-PARTITIONED CANCEL
// ============================================================================

#[test]
fn only_bets_of_cancelled_markets_are_touched() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::ResultHome, Market::Total(2500)]);

    post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::ResultHomeYes,
        (2, 1),
        100,
        BetKind::Live,
    );
    post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::TotalOver(2500),
        (2, 1),
        100,
        BetKind::Live,
    );

    let cancelled = [Market::Total(2500)].into_iter().collect();
    BettingService::new(&mut db)
        .cancel_bets_by_markets(game, &cancelled)
        .unwrap();

    assert_eq!(db.balance("bob"), Asset::from_scr(1000));
    assert_eq!(db.balance("alice"), Asset::from_scr(900));
    assert_eq!(db.pending_bets().count(), 1);
    assert_eq!(
        db.pending_bets().next().unwrap().data.better,
        "alice".to_string()
    );
    assert_betting_invariants(&db);
}

#[test]
fn matched_bets_of_cancelled_markets_are_refunded_not_requeued() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::ResultHome, Market::Total(2500)]);

    let b1 = post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::TotalOver(2500),
        (2, 1),
        100,
        BetKind::Live,
    );
    let b2 = post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::TotalUnder(2500),
        (2, 1),
        100,
        BetKind::Live,
    );
    BettingService::new(&mut db)
        .match_pending_bets(b1, b2, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap();

    let cancelled = [Market::Total(2500)].into_iter().collect();
    BettingService::new(&mut db)
        .cancel_bets_by_markets(game, &cancelled)
        .unwrap();

    assert_eq!(db.balance("alice"), Asset::from_scr(1000));
    assert_eq!(db.balance("bob"), Asset::from_scr(1000));
    assert_eq!(db.pending_bets().count(), 0);
    assert_eq!(db.matched_bets().count(), 0);
    assert_betting_invariants(&db);
}

// ============================================================================
// KIND-SELECTIVE CANCEL
// ============================================================================

#[test]
fn cancelling_by_kind_spares_the_other_kind() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (2, 1),
        100,
        BetKind::NonLive,
    );
    post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::GoalHomeNo,
        (2, 1),
        100,
        BetKind::Live,
    );

    BettingService::new(&mut db)
        .cancel_pending_bets_by_kind(game, BetKind::NonLive)
        .unwrap();

    assert_eq!(db.balance("alice"), Asset::from_scr(1000));
    assert_eq!(db.balance("bob"), Asset::from_scr(900));
    assert_eq!(db.pending_bets().count(), 1);
    assert_betting_invariants(&db);
}

// ============================================================================
// GAME REMOVAL GUARDS
// ============================================================================

#[test]
fn a_game_with_pending_bets_cannot_be_removed() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);
    post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (2, 1),
        100,
        BetKind::Live,
    );

    let err = BettingService::new(&mut db).cancel_game(game).unwrap_err();
    assert_eq!(err, ChainError::GameHasBets(uuid_of("derby")));
    assert!(db.game_exists(&uuid_of("derby")));
}

#[test]
fn a_game_with_matched_bets_cannot_be_removed() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    let b1 = post_bet(
        &mut db,
        "alice",
        game,
        "b1",
        Wincase::GoalHomeYes,
        (2, 1),
        100,
        BetKind::Live,
    );
    let b2 = post_bet(
        &mut db,
        "bob",
        game,
        "b2",
        Wincase::GoalHomeNo,
        (2, 1),
        100,
        BetKind::Live,
    );
    BettingService::new(&mut db)
        .match_pending_bets(b1, b2, Asset::from_scr(100), Asset::from_scr(100))
        .unwrap();
    // The pending store is empty now; only the matched store blocks removal.
    assert_eq!(db.pending_bets().count(), 0);

    let err = BettingService::new(&mut db).cancel_game(game).unwrap_err();
    assert_eq!(err, ChainError::GameHasBets(uuid_of("derby")));
}

#[test]
fn an_empty_game_is_removed() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    BettingService::new(&mut db).cancel_game(game).unwrap();
    assert!(!db.game_exists(&uuid_of("derby")));
}
