//! Per-screen transaction cache keyed by transaction id

use std::collections::HashSet;

use custweb_client::TransactionRecord;

use crate::range::FilterRange;

/// Append-only set of records, first write wins per id
#[derive(Debug, Clone, Default)]
pub struct TransactionCache {
    records: Vec<TransactionRecord>,
    ids: HashSet<String>,
}

impl TransactionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from a fetch result, dropping repeated ids
    pub fn from_records(records: Vec<TransactionRecord>) -> Self {
        let mut cache = Self::new();
        cache.merge(records);
        cache
    }

    /// Add every fetched record whose id is not cached yet.
    ///
    /// Existing entries are never overwritten or removed; returns how many
    /// records were inserted.
    pub fn merge<I>(&mut self, fetched: I) -> usize
    where
        I: IntoIterator<Item = TransactionRecord>,
    {
        let before = self.records.len();
        for record in fetched {
            if self.ids.insert(record.id.clone()) {
                self.records.push(record);
            }
        }
        self.records.len() - before
    }

    /// Records whose date key lies in `range`, ascending by timestamp text.
    ///
    /// Ties keep cache order.
    pub fn filter(&self, range: &FilterRange) -> Vec<TransactionRecord> {
        if range.is_empty() {
            return Vec::new();
        }
        let (from, to) = range.bounds();
        let mut selected: Vec<TransactionRecord> = self
            .records
            .iter()
            .filter(|record| {
                let key = record.date_key();
                key >= from.as_str() && key <= to.as_str()
            })
            .cloned()
            .collect();
        selected.sort_by(|a, b| a.time.cmp(&b.time));
        selected
    }

    pub fn get(&self, id: &str) -> Option<&TransactionRecord> {
        if !self.ids.contains(id) {
            return None;
        }
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use custweb_client::SequenceTag;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn record(id: &str, time: &str, amount: &str) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            time: time.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            sequence: SequenceTag::Number(1),
            customer_id: None,
        }
    }

    fn range(from: &str, to: &str) -> FilterRange {
        FilterRange::new(
            NaiveDate::parse_from_str(from, "%Y-%m-%d").unwrap(),
            NaiveDate::parse_from_str(to, "%Y-%m-%d").unwrap(),
        )
    }

    #[test]
    fn test_merge_is_first_write_wins() {
        let mut cache = TransactionCache::from_records(vec![record("a", "2024-01-05T10:00:00Z", "10.00")]);

        let inserted = cache.merge(vec![
            record("a", "2024-01-05T10:00:00Z", "99.00"),
            record("b", "2024-02-10T10:00:00Z", "5.00"),
        ]);

        assert_eq!(inserted, 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap().amount, Decimal::from_str("10.00").unwrap());
    }

    #[test]
    fn test_merge_empty_is_noop() {
        let mut cache = TransactionCache::from_records(vec![record("a", "2024-01-05T10:00:00Z", "1")]);
        assert_eq!(cache.merge(Vec::new()), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let fetched = vec![
            record("a", "2024-01-05T10:00:00Z", "1"),
            record("b", "2024-01-06T10:00:00Z", "2"),
        ];
        let mut once = TransactionCache::new();
        once.merge(fetched.clone());
        let mut twice = once.clone();
        twice.merge(fetched);
        assert_eq!(once.records(), twice.records());
    }

    #[test]
    fn test_from_records_drops_repeated_ids() {
        let cache = TransactionCache::from_records(vec![
            record("a", "2024-01-05T10:00:00Z", "1"),
            record("a", "2024-01-06T10:00:00Z", "2"),
        ]);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().time, "2024-01-05T10:00:00Z");
    }

    #[test]
    fn test_filter_inclusive_bounds() {
        let cache = TransactionCache::from_records(vec![
            record("a", "2024-01-01T00:00:00Z", "1"),
            record("b", "2024-02-28T23:59:59Z", "2"),
            record("c", "2024-02-29T00:00:00Z", "3"),
            record("d", "2023-12-31T23:59:59Z", "4"),
        ]);

        let ids: Vec<String> = cache
            .filter(&range("2024-01-01", "2024-02-28"))
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_filter_uses_date_prefix_not_instant() {
        // Local-offset timestamps are compared by their written date
        let cache = TransactionCache::from_records(vec![record("a", "2024-03-01T01:00:00+08:00", "1")]);
        assert_eq!(cache.filter(&range("2024-03-01", "2024-03-01")).len(), 1);
        assert!(cache.filter(&range("2024-02-29", "2024-02-29")).is_empty());
    }

    #[test]
    fn test_filter_sorts_by_time() {
        let cache = TransactionCache::from_records(vec![
            record("late", "2024-01-20T00:00:00Z", "1"),
            record("early", "2024-01-02T00:00:00Z", "1"),
            record("mid", "2024-01-10T00:00:00Z", "1"),
        ]);
        let ids: Vec<String> = cache
            .filter(&range("2024-01-01", "2024-01-31"))
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_filter_reversed_range() {
        let cache = TransactionCache::from_records(vec![record("a", "2024-05-15T00:00:00Z", "1")]);
        assert!(cache.filter(&range("2024-06-01", "2024-05-01")).is_empty());
    }

    #[test]
    fn test_filter_empty_cache() {
        let cache = TransactionCache::new();
        assert!(cache.filter(&range("2024-01-01", "2024-12-31")).is_empty());
    }
}
