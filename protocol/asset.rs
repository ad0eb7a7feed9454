//! Exact integer amounts of the native coin.
//!
//! All bet math runs on `Asset` values; no floating point ever reaches
//! persistent state. The symbol is fixed to SCR with 9 decimal places, so a
//! plain `i64` of indivisible units is enough.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

use crate::protocol::config::{CURRENCY_PRECISION, CURRENCY_SYMBOL, UNITS_PER_SCR};

/// An amount of SCR in indivisible units (10^-9 SCR).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Asset {
    pub amount: i64,
}

impl Asset {
    pub const ZERO: Asset = Asset { amount: 0 };

    /// Construct from raw units.
    pub const fn from_units(amount: i64) -> Self {
        Asset { amount }
    }

    /// Construct from whole SCR.
    pub const fn from_scr(scr: i64) -> Self {
        Asset {
            amount: scr * UNITS_PER_SCR,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_negative(&self) -> bool {
        self.amount < 0
    }

    pub fn checked_add(self, rhs: Asset) -> Option<Asset> {
        self.amount.checked_add(rhs.amount).map(Asset::from_units)
    }

    pub fn checked_sub(self, rhs: Asset) -> Option<Asset> {
        self.amount.checked_sub(rhs.amount).map(Asset::from_units)
    }
}

impl Add for Asset {
    type Output = Asset;
    fn add(self, rhs: Asset) -> Asset {
        Asset::from_units(self.amount + rhs.amount)
    }
}

impl Sub for Asset {
    type Output = Asset;
    fn sub(self, rhs: Asset) -> Asset {
        Asset::from_units(self.amount - rhs.amount)
    }
}

impl AddAssign for Asset {
    fn add_assign(&mut self, rhs: Asset) {
        self.amount += rhs.amount;
    }
}

impl SubAssign for Asset {
    fn sub_assign(&mut self, rhs: Asset) {
        self.amount -= rhs.amount;
    }
}

impl Neg for Asset {
    type Output = Asset;
    fn neg(self) -> Asset {
        Asset::from_units(-self.amount)
    }
}

impl Mul<i64> for Asset {
    type Output = Asset;
    fn mul(self, rhs: i64) -> Asset {
        Asset::from_units(self.amount * rhs)
    }
}

impl Div<i64> for Asset {
    type Output = Asset;
    fn div(self, rhs: i64) -> Asset {
        Asset::from_units(self.amount / rhs)
    }
}

impl Sum for Asset {
    fn sum<I: Iterator<Item = Asset>>(iter: I) -> Asset {
        iter.fold(Asset::ZERO, |acc, a| acc + a)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.amount < 0 { "-" } else { "" };
        let abs = self.amount.unsigned_abs();
        let whole = abs / UNITS_PER_SCR as u64;
        let frac = abs % UNITS_PER_SCR as u64;
        write!(
            f,
            "{}{}.{:0width$} {}",
            sign,
            whole,
            frac,
            CURRENCY_SYMBOL,
            width = CURRENCY_PRECISION as usize
        )
    }
}
