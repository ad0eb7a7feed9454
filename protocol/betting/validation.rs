//! Boundary validation helpers shared by operation checks.

use crate::errors::ChainError;
use crate::protocol::betting::market::{Market, Wincase};
use crate::protocol::config::{
    MAX_ACCOUNT_NAME_LENGTH, MAX_GAME_NAME_LENGTH, MIN_ACCOUNT_NAME_LENGTH,
};

/// Threshold lines sit on halves: 500 = 0.5, 2500 = 2.5.
const THRESHOLD_STEP: i32 = 500;

pub fn validate_account_name(name: &str) -> Result<(), ChainError> {
    if name.len() < MIN_ACCOUNT_NAME_LENGTH || name.len() > MAX_ACCOUNT_NAME_LENGTH {
        return Err(ChainError::Validation(format!(
            "account name '{}' must be {}..{} characters",
            name, MIN_ACCOUNT_NAME_LENGTH, MAX_ACCOUNT_NAME_LENGTH
        )));
    }
    let mut chars = name.chars();
    let first = chars.next().unwrap_or('0');
    if !first.is_ascii_lowercase() {
        return Err(ChainError::Validation(format!(
            "account name '{}' must start with a lowercase letter",
            name
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(ChainError::Validation(format!(
            "account name '{}' contains invalid characters",
            name
        )));
    }
    Ok(())
}

pub fn validate_market(market: &Market) -> Result<(), ChainError> {
    match *market {
        Market::Handicap(t) => {
            if t as i32 % THRESHOLD_STEP != 0 {
                return Err(ChainError::Validation(format!(
                    "handicap threshold {} is not a multiple of {}",
                    t, THRESHOLD_STEP
                )));
            }
        }
        Market::Total(t) | Market::TotalGoalsHome(t) | Market::TotalGoalsAway(t) => {
            if t == 0 || t as i32 % THRESHOLD_STEP != 0 {
                return Err(ChainError::Validation(format!(
                    "total threshold {} must be a positive multiple of {}",
                    t, THRESHOLD_STEP
                )));
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn validate_wincase(wincase: &Wincase) -> Result<(), ChainError> {
    validate_market(&wincase.market())
}

pub fn validate_markets<'a, I: IntoIterator<Item = &'a Market>>(
    markets: I,
) -> Result<(), ChainError> {
    for market in markets {
        validate_market(market)?;
    }
    Ok(())
}

pub fn validate_wincases<'a, I: IntoIterator<Item = &'a Wincase>>(
    wincases: I,
) -> Result<(), ChainError> {
    for wincase in wincases {
        validate_wincase(wincase)?;
    }
    Ok(())
}

pub fn validate_game_name(name: &str) -> Result<(), ChainError> {
    if name.is_empty() {
        return Err(ChainError::Validation("game name is empty".into()));
    }
    if name.len() > MAX_GAME_NAME_LENGTH {
        return Err(ChainError::Validation(format!(
            "game name longer than {} characters",
            MAX_GAME_NAME_LENGTH
        )));
    }
    Ok(())
}
