//! Betting core: the lifecycle service, operation evaluators, and the
//! winners query.

pub mod evaluators;
pub mod service;
pub mod winners;

pub use evaluators::apply_operation;
pub use service::BettingService;
pub use winners::{game_winners, BetOutcome, MarketWinner};
