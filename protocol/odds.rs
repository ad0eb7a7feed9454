//! Exact rational odds.
//!
//! Odds are stored as a reduced fraction and never touch floating point.
//! The accepted range is [`MIN_ODDS`, `MIN_ODDS.inverted()`]; the constructor
//! rejects everything outside it, so a constructed `Odds` is always valid.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ChainError;
use crate::protocol::asset::Asset;
use crate::protocol::config::{MIN_ODDS_DENOMINATOR, MIN_ODDS_NUMERATOR};

/// A reduced fraction strictly greater than one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Odds {
    numerator: u32,
    denominator: u32,
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl Odds {
    /// The smallest accepted odds, 1001/1000.
    pub const MIN: Odds = Odds {
        numerator: MIN_ODDS_NUMERATOR,
        denominator: MIN_ODDS_DENOMINATOR,
    };

    /// Build odds from a raw fraction, reducing it and checking the range.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, ChainError> {
        if numerator == 0 || denominator == 0 {
            return Err(ChainError::Validation(
                "odds numerator and denominator must be greater than zero".into(),
            ));
        }
        if numerator <= denominator {
            return Err(ChainError::Validation(
                "odds must be greater than one".into(),
            ));
        }

        let d = gcd(numerator, denominator);
        let odds = Odds {
            numerator: numerator / d,
            denominator: denominator / d,
        };

        let max = Odds::MIN.inverted();
        if odds < Odds::MIN || odds > max {
            return Err(ChainError::Validation(format!(
                "odds {} outside the accepted range [{}, {}]",
                odds,
                Odds::MIN,
                max
            )));
        }

        Ok(odds)
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Odds of the opposing side of the same market: n/d maps to n/(n-d).
    pub fn inverted(&self) -> Odds {
        Odds {
            numerator: self.numerator,
            denominator: self.numerator - self.denominator,
        }
    }

    /// The stake the opposing side must pledge against `stake` at these odds.
    ///
    /// Exact integer math, truncating: stake * (n - d) / d.
    pub fn opposite_stake(&self, stake: Asset) -> Asset {
        let num = (self.numerator - self.denominator) as i128;
        let den = self.denominator as i128;
        Asset::from_units((stake.amount as i128 * num / den) as i64)
    }
}

impl PartialOrd for Odds {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Odds {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.numerator as u64 * other.denominator as u64;
        let rhs = other.numerator as u64 * self.denominator as u64;
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduces_on_construction() {
        let odds = Odds::new(4, 2).unwrap();
        assert_eq!(odds.numerator(), 2);
        assert_eq!(odds.denominator(), 1);
    }

    #[test]
    fn rejects_degenerate_fractions() {
        assert!(Odds::new(0, 1).is_err());
        assert!(Odds::new(1, 0).is_err());
        assert!(Odds::new(1, 1).is_err());
        assert!(Odds::new(1, 10).is_err());
    }

    #[test]
    fn enforces_range() {
        assert!(Odds::new(1001, 1000).is_ok());
        assert!(Odds::new(10001, 10000).is_err());
        assert!(Odds::new(1001, 1).is_ok());
        assert!(Odds::new(1002, 1).is_err());
    }

    #[test]
    fn inversion() {
        let three_to_one = Odds::new(3, 1).unwrap();
        assert_eq!(three_to_one.inverted(), Odds::new(3, 2).unwrap());
        // Even money is its own inverse.
        let evens = Odds::new(2, 1).unwrap();
        assert_eq!(evens.inverted(), evens);
        assert_eq!(Odds::MIN.inverted(), Odds::new(1001, 1).unwrap());
    }

    #[test]
    fn total_order_by_value() {
        let a = Odds::new(3, 2).unwrap();
        let b = Odds::new(2, 1).unwrap();
        let c = Odds::new(4, 2).unwrap();
        assert!(a < b);
        assert_eq!(b, c);
        assert!(b >= a);
    }

    #[test]
    fn opposite_stake_is_exact() {
        let evens = Odds::new(2, 1).unwrap();
        assert_eq!(evens.opposite_stake(Asset::from_scr(100)), Asset::from_scr(100));

        let three_to_one = Odds::new(3, 1).unwrap();
        assert_eq!(
            three_to_one.opposite_stake(Asset::from_scr(100)),
            Asset::from_scr(200)
        );

        // 3/2: opposing side pledges half.
        let short = Odds::new(3, 2).unwrap();
        assert_eq!(short.opposite_stake(Asset::from_scr(100)), Asset::from_scr(50));
    }
}
