//! Winners query tests: per-market settlement figures over a finished game.

mod common;

use std::collections::BTreeSet;

use chrono::Duration;

use common::*;
use wagerbook::{
    game_winners, Asset, BetData, BetKind, ChainError, Database, GameId, GameStatus, Market, Odds,
    Wincase,
};

fn leg(db: &Database, name: &str, wincase: Wincase, stake_scr: i64) -> BetData {
    BetData {
        uuid: uuid_of(name),
        better: name.to_string(),
        stake: Asset::from_scr(stake_scr),
        bet_odds: Odds::new(2, 1).unwrap(),
        wincase,
        kind: BetKind::Live,
        created: db.head_block_time(),
    }
}

/// A finished game with matched bets over five markets, three of which have
/// posted results.
fn finished_game(db: &mut Database) -> GameId {
    let start = db.head_block_time() + Duration::hours(1);
    let game = db.create_game(
        uuid_of("derby"),
        "derby".into(),
        start,
        start + Duration::hours(1),
        BTreeSet::from([
            Market::Handicap(500),
            Market::Handicap(1000),
            Market::CorrectScore { home: 3, away: 3 },
            Market::GoalHome,
            Market::Total(2000),
        ]),
    );

    let legs = [
        (
            Market::Handicap(500),
            leg(db, "m1b1", Wincase::HandicapOver(500), 1000),
            leg(db, "m1b2", Wincase::HandicapUnder(500), 500),
        ),
        (
            Market::Handicap(1000),
            leg(db, "m2b1", Wincase::HandicapOver(1000), 2000),
            leg(db, "m2b2", Wincase::HandicapUnder(1000), 1000),
        ),
        (
            Market::CorrectScore { home: 3, away: 3 },
            leg(db, "m3b1", Wincase::CorrectScoreYes { home: 3, away: 3 }, 3000),
            leg(db, "m3b2", Wincase::CorrectScoreNo { home: 3, away: 3 }, 1500),
        ),
        (
            Market::GoalHome,
            leg(db, "m4b1", Wincase::GoalHomeYes, 4000),
            leg(db, "m4b2", Wincase::GoalHomeNo, 2000),
        ),
        (
            Market::Total(2000),
            leg(db, "m5b1", Wincase::TotalOver(2000), 5000),
            leg(db, "m5b2", Wincase::TotalUnder(2000), 2500),
        ),
    ];
    for (market, bet1, bet2) in legs {
        db.create_matched_bet(game, market, bet1, bet2);
    }

    db.update_game(game, |g| {
        g.status = GameStatus::Finished;
        g.results = BTreeSet::from([
            Wincase::HandicapUnder(500),
            Wincase::CorrectScoreYes { home: 3, away: 3 },
            Wincase::GoalHomeNo,
        ]);
    })
    .unwrap();
    game
}

#[test]
fn winners_carry_profit_and_income_per_settled_market() {
    let mut db = test_db();
    finished_game(&mut db);

    let winners = game_winners(&db, &uuid_of("derby")).unwrap();

    // Markets without a posted result stay unsettled.
    assert_eq!(winners.len(), 3);

    assert_eq!(winners[0].market, Market::Handicap(500));
    assert_eq!(winners[0].profit, Asset::from_scr(1000));
    assert_eq!(winners[0].income, Asset::from_scr(1500));
    assert_eq!(winners[0].winner.uuid, uuid_of("m1b2"));
    assert_eq!(winners[0].winner.wincase, Wincase::HandicapUnder(500));
    assert_eq!(winners[0].loser.uuid, uuid_of("m1b1"));

    assert_eq!(winners[1].market, Market::CorrectScore { home: 3, away: 3 });
    assert_eq!(winners[1].profit, Asset::from_scr(1500));
    assert_eq!(winners[1].income, Asset::from_scr(4500));
    assert_eq!(winners[1].winner.uuid, uuid_of("m3b1"));
    assert_eq!(winners[1].loser.uuid, uuid_of("m3b2"));

    assert_eq!(winners[2].market, Market::GoalHome);
    assert_eq!(winners[2].profit, Asset::from_scr(4000));
    assert_eq!(winners[2].income, Asset::from_scr(6000));
    assert_eq!(winners[2].winner.uuid, uuid_of("m4b2"));
    assert_eq!(winners[2].winner.wincase, Wincase::GoalHomeNo);
    assert_eq!(winners[2].loser.uuid, uuid_of("m4b1"));
}

#[test]
fn an_unknown_game_has_no_winners() {
    let db = test_db();
    assert_eq!(
        game_winners(&db, &uuid_of("phantom")),
        Err(ChainError::UnknownGame(uuid_of("phantom")))
    );
}

#[test]
fn winners_are_not_available_before_the_game_finishes() {
    let mut db = test_db();
    let game = create_game(&mut db, "derby", &[Market::GoalHome]);

    assert!(matches!(
        game_winners(&db, &uuid_of("derby")),
        Err(ChainError::InvalidGameState {
            status: GameStatus::Created,
            ..
        })
    ));

    db.update_game(game, |g| g.status = GameStatus::Started).unwrap();
    assert!(matches!(
        game_winners(&db, &uuid_of("derby")),
        Err(ChainError::InvalidGameState {
            status: GameStatus::Started,
            ..
        })
    ));
}
