//! Outcome (wincase) and market tagged unions.
//!
//! Every wincase maps to exactly one market, and two wincases share a market
//! iff they are inverses of each other. Threshold parameters are expressed in
//! thousandths of a goal: 500 is the 0.5 line, 2000 the 2.0 line.

use serde::{Deserialize, Serialize};

/// One side of a market.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Wincase {
    ResultHomeYes,
    ResultHomeNo,
    ResultDrawYes,
    ResultDrawNo,
    ResultAwayYes,
    ResultAwayNo,
    RoundHomeYes,
    RoundHomeNo,
    HandicapOver(i16),
    HandicapUnder(i16),
    CorrectScoreHomeYes,
    CorrectScoreHomeNo,
    CorrectScoreDrawYes,
    CorrectScoreDrawNo,
    CorrectScoreAwayYes,
    CorrectScoreAwayNo,
    CorrectScoreYes { home: u16, away: u16 },
    CorrectScoreNo { home: u16, away: u16 },
    GoalHomeYes,
    GoalHomeNo,
    GoalBothYes,
    GoalBothNo,
    GoalAwayYes,
    GoalAwayNo,
    TotalOver(u16),
    TotalUnder(u16),
    TotalGoalsHomeOver(u16),
    TotalGoalsHomeUnder(u16),
    TotalGoalsAwayOver(u16),
    TotalGoalsAwayUnder(u16),
}

/// The equivalence class a wincase belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Market {
    ResultHome,
    ResultDraw,
    ResultAway,
    Round,
    Handicap(i16),
    CorrectScoreHome,
    CorrectScoreDraw,
    CorrectScoreAway,
    CorrectScore { home: u16, away: u16 },
    GoalHome,
    GoalBoth,
    GoalAway,
    Total(u16),
    TotalGoalsHome(u16),
    TotalGoalsAway(u16),
}

impl Wincase {
    /// The market this wincase belongs to. Pure and total.
    pub fn market(&self) -> Market {
        use Wincase::*;
        match *self {
            ResultHomeYes | ResultHomeNo => Market::ResultHome,
            ResultDrawYes | ResultDrawNo => Market::ResultDraw,
            ResultAwayYes | ResultAwayNo => Market::ResultAway,
            RoundHomeYes | RoundHomeNo => Market::Round,
            HandicapOver(t) | HandicapUnder(t) => Market::Handicap(t),
            CorrectScoreHomeYes | CorrectScoreHomeNo => Market::CorrectScoreHome,
            CorrectScoreDrawYes | CorrectScoreDrawNo => Market::CorrectScoreDraw,
            CorrectScoreAwayYes | CorrectScoreAwayNo => Market::CorrectScoreAway,
            CorrectScoreYes { home, away } | CorrectScoreNo { home, away } => {
                Market::CorrectScore { home, away }
            }
            GoalHomeYes | GoalHomeNo => Market::GoalHome,
            GoalBothYes | GoalBothNo => Market::GoalBoth,
            GoalAwayYes | GoalAwayNo => Market::GoalAway,
            TotalOver(t) | TotalUnder(t) => Market::Total(t),
            TotalGoalsHomeOver(t) | TotalGoalsHomeUnder(t) => Market::TotalGoalsHome(t),
            TotalGoalsAwayOver(t) | TotalGoalsAwayUnder(t) => Market::TotalGoalsAway(t),
        }
    }

    /// The opposing side of the same market.
    pub fn inverse(&self) -> Wincase {
        use Wincase::*;
        match *self {
            ResultHomeYes => ResultHomeNo,
            ResultHomeNo => ResultHomeYes,
            ResultDrawYes => ResultDrawNo,
            ResultDrawNo => ResultDrawYes,
            ResultAwayYes => ResultAwayNo,
            ResultAwayNo => ResultAwayYes,
            RoundHomeYes => RoundHomeNo,
            RoundHomeNo => RoundHomeYes,
            HandicapOver(t) => HandicapUnder(t),
            HandicapUnder(t) => HandicapOver(t),
            CorrectScoreHomeYes => CorrectScoreHomeNo,
            CorrectScoreHomeNo => CorrectScoreHomeYes,
            CorrectScoreDrawYes => CorrectScoreDrawNo,
            CorrectScoreDrawNo => CorrectScoreDrawYes,
            CorrectScoreAwayYes => CorrectScoreAwayNo,
            CorrectScoreAwayNo => CorrectScoreAwayYes,
            CorrectScoreYes { home, away } => CorrectScoreNo { home, away },
            CorrectScoreNo { home, away } => CorrectScoreYes { home, away },
            GoalHomeYes => GoalHomeNo,
            GoalHomeNo => GoalHomeYes,
            GoalBothYes => GoalBothNo,
            GoalBothNo => GoalBothYes,
            GoalAwayYes => GoalAwayNo,
            GoalAwayNo => GoalAwayYes,
            TotalOver(t) => TotalUnder(t),
            TotalUnder(t) => TotalOver(t),
            TotalGoalsHomeOver(t) => TotalGoalsHomeUnder(t),
            TotalGoalsHomeUnder(t) => TotalGoalsHomeOver(t),
            TotalGoalsAwayOver(t) => TotalGoalsAwayUnder(t),
            TotalGoalsAwayUnder(t) => TotalGoalsAwayOver(t),
        }
    }
}

impl Market {
    /// Both sides of this market.
    pub fn wincases(&self) -> (Wincase, Wincase) {
        use Wincase::*;
        match *self {
            Market::ResultHome => (ResultHomeYes, ResultHomeNo),
            Market::ResultDraw => (ResultDrawYes, ResultDrawNo),
            Market::ResultAway => (ResultAwayYes, ResultAwayNo),
            Market::Round => (RoundHomeYes, RoundHomeNo),
            Market::Handicap(t) => (HandicapOver(t), HandicapUnder(t)),
            Market::CorrectScoreHome => (CorrectScoreHomeYes, CorrectScoreHomeNo),
            Market::CorrectScoreDraw => (CorrectScoreDrawYes, CorrectScoreDrawNo),
            Market::CorrectScoreAway => (CorrectScoreAwayYes, CorrectScoreAwayNo),
            Market::CorrectScore { home, away } => {
                (CorrectScoreYes { home, away }, CorrectScoreNo { home, away })
            }
            Market::GoalHome => (GoalHomeYes, GoalHomeNo),
            Market::GoalBoth => (GoalBothYes, GoalBothNo),
            Market::GoalAway => (GoalAwayYes, GoalAwayNo),
            Market::Total(t) => (TotalOver(t), TotalUnder(t)),
            Market::TotalGoalsHome(t) => (TotalGoalsHomeOver(t), TotalGoalsHomeUnder(t)),
            Market::TotalGoalsAway(t) => (TotalGoalsAwayOver(t), TotalGoalsAwayUnder(t)),
        }
    }
}
