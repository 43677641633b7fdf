//! Calendar month keys and month-index arithmetic
//!
//! Months are addressed by a plain integer index (`year * 12 + month - 1`) so
//! that shifting by a fixed number of months never has to reason about year
//! boundaries. `chrono` is only used to materialise the first-of-month date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest year accepted from raw observations
pub const MIN_YEAR: i32 = 1;

/// Largest year accepted from raw observations
pub const MAX_YEAR: i32 = 9999;

/// Days in a normalized month for the 30/360 seasonality convention
pub const NORMALIZED_MONTH_DAYS: f64 = 30.0;

/// Days in a normalized year for the 30/360 seasonality convention
pub const NORMALIZED_YEAR_DAYS: f64 = 360.0;

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    /// Calendar year
    pub year: i32,
    /// Month of year (1-12)
    pub month: u32,
}

impl MonthKey {
    /// Create a key without range checks
    pub const fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Continuous month index: `year * 12 + month - 1`
    pub fn index(&self) -> i64 {
        self.year as i64 * 12 + self.month as i64 - 1
    }

    /// Decode a month index back into (year, month)
    pub fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: (index.rem_euclid(12) + 1) as u32,
        }
    }

    /// Key `months` later (negative moves backward)
    pub fn shift(&self, months: i64) -> Self {
        Self::from_index(self.index() + months)
    }

    /// Signed number of months from `self` to `other`
    pub fn months_until(&self, other: MonthKey) -> i64 {
        other.index() - self.index()
    }

    /// Next calendar month
    pub fn succ(&self) -> Self {
        self.shift(1)
    }

    /// Whether the month lies in 1-12
    pub fn is_valid_month(&self) -> bool {
        (1..=12).contains(&self.month)
    }

    /// Number of days in this month, leap-year aware
    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// First day of the month, `None` outside chrono's representable range
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Inclusive range of keys from `self` through `last`
    pub fn through(self, last: MonthKey) -> impl Iterator<Item = MonthKey> {
        (self.index()..=last.index()).map(MonthKey::from_index)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in the given month; 0 for an invalid month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days in the given calendar year
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_index_round_trip_across_year_boundary() {
        let jan = MonthKey::new(2021, 1);
        assert_eq!(jan.shift(-1), MonthKey::new(2020, 12));
        assert_eq!(jan.shift(-10), MonthKey::new(2020, 3));
        assert_eq!(MonthKey::new(2020, 3).shift(10), jan);
        assert_eq!(MonthKey::new(2020, 12).succ(), jan);
    }

    #[test]
    fn test_conception_offset_matches_formula() {
        // conception month index = year*12 + month - 1 - 10
        let birth = MonthKey::new(2021, 1);
        let idx = 2021_i64 * 12 + 1 - 1 - 10;
        assert_eq!(birth.shift(-10), MonthKey::from_index(idx));
        assert_eq!(MonthKey::from_index(idx), MonthKey::new(2020, 3));
    }

    #[test]
    fn test_days_in_month_leap_years() {
        assert_eq!(days_in_month(2020, 2), 29);
        assert_eq!(days_in_month(2021, 2), 28);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2020, 1), 31);
        assert_eq!(days_in_month(2020, 4), 30);
        assert_eq!(days_in_month(2020, 13), 0);
        assert_eq!(days_in_year(2020), 366);
        assert_eq!(days_in_year(2021), 365);
    }

    #[test]
    fn test_days_in_month_agrees_with_chrono() {
        for year in [1899, 1900, 1996, 2000, 2023, 2024] {
            for month in 1..=12 {
                let key = MonthKey::new(year, month);
                let next = key.succ().first_day().unwrap();
                let span = next.signed_duration_since(key.first_day().unwrap()).num_days();
                assert_eq!(span as u32, key.days_in_month(), "{}", key);
            }
        }
    }

    #[test]
    fn test_through_is_inclusive_and_ordered() {
        let months: Vec<_> = MonthKey::new(2019, 11).through(MonthKey::new(2020, 2)).collect();
        assert_eq!(
            months,
            vec![
                MonthKey::new(2019, 11),
                MonthKey::new(2019, 12),
                MonthKey::new(2020, 1),
                MonthKey::new(2020, 2),
            ]
        );
        assert_eq!(MonthKey::new(2020, 5).first_day().unwrap().day(), 1);
        assert_eq!(MonthKey::new(2020, 5).to_string(), "2020-05");
    }
}
