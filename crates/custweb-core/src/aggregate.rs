//! Count and total of a transaction selection

use custweb_client::TransactionRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary shown under a transaction table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub total_amount: Decimal,
}

impl Summary {
    /// Total formatted with exactly two decimals
    pub fn total_display(&self) -> String {
        custweb_utils::format_amount(self.total_amount)
    }
}

/// Sum amounts exactly in decimal arithmetic
pub fn aggregate<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    records.into_iter().fold(Summary::default(), |acc, record| Summary {
        count: acc.count + 1,
        total_amount: acc.total_amount.saturating_add(record.amount),
    })
}
