//! Inclusive calendar-date range used to filter transaction screens

use chrono::{Months, NaiveDate};
use custweb_client::DateRangeQuery;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `[from, to]`, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl FilterRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// `[today - months, today]`; month arithmetic clamps to the last valid day
    pub fn last_months(today: NaiveDate, months: u32) -> Self {
        let from = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    /// Parse two `YYYY-MM-DD` strings
    pub fn parse(from: &str, to: &str) -> CoreResult<Self> {
        let parse = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| CoreError::InvalidRange {
                message: format!("'{}' is not a YYYY-MM-DD date", value),
            })
        };
        Ok(Self {
            from: parse(from)?,
            to: parse(to)?,
        })
    }

    /// A reversed range selects nothing
    pub fn is_empty(&self) -> bool {
        self.from > self.to
    }

    /// `YYYY-MM-DD` keys of both bounds, compared lexicographically against
    /// the first ten characters of a transaction timestamp
    pub fn bounds(&self) -> (String, String) {
        (
            self.from.format(DATE_FORMAT).to_string(),
            self.to.format(DATE_FORMAT).to_string(),
        )
    }

    /// Whether a `YYYY-MM-DD` key falls inside the range
    pub fn contains_key(&self, date_key: &str) -> bool {
        let (from, to) = self.bounds();
        date_key >= from.as_str() && date_key <= to.as_str()
    }

    pub fn to_query(&self) -> DateRangeQuery {
        DateRangeQuery {
            from: self.from,
            to: self.to,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        let (from, to) = self.bounds();
        format!("{} 至 {}", from, to)
    }
}

impl std::fmt::Display for FilterRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (from, to) = self.bounds();
        write!(f, "{}..{}", from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_months() {
        let range = FilterRange::last_months(date(2024, 6, 15), 1);
        assert_eq!(range.from, date(2024, 5, 15));
        assert_eq!(range.to, date(2024, 6, 15));
    }

    #[test]
    fn test_last_months_clamps_month_end() {
        let range = FilterRange::last_months(date(2024, 3, 31), 1);
        assert_eq!(range.from, date(2024, 2, 29));
    }

    #[test]
    fn test_parse() {
        let range = FilterRange::parse("2024-01-01", " 2024-02-28 ").unwrap();
        assert_eq!(range, FilterRange::new(date(2024, 1, 1), date(2024, 2, 28)));
        assert!(matches!(
            FilterRange::parse("2024/01/01", "2024-02-28"),
            Err(CoreError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_contains_key_is_inclusive() {
        let range = FilterRange::new(date(2024, 1, 1), date(2024, 2, 28));
        assert!(range.contains_key("2024-01-01"));
        assert!(range.contains_key("2024-02-28"));
        assert!(!range.contains_key("2023-12-31"));
        assert!(!range.contains_key("2024-02-29"));
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let range = FilterRange::new(date(2024, 6, 1), date(2024, 5, 1));
        assert!(range.is_empty());
        assert!(!range.contains_key("2024-05-15"));
    }

    #[test]
    fn test_display() {
        let range = FilterRange::new(date(2024, 1, 1), date(2024, 2, 28));
        assert_eq!(range.to_string(), "2024-01-01..2024-02-28");
        assert_eq!(range.description(), "2024-01-01 至 2024-02-28");
    }
}
