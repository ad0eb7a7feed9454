//! Betting value types: wincases, markets and their validation.

pub mod market;
pub mod validation;

pub use market::{Market, Wincase};
