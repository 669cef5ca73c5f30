//! Rendered view frames, notices and the sinks that receive them

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};
use custweb_client::TransactionRecord;
use serde::Serialize;
use tokio::sync::watch;

use crate::aggregate::{aggregate, Summary};
use crate::range::FilterRange;

/// One table row as shown on a transaction screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRow {
    pub id: String,
    /// Timestamp in the server's local time zone
    pub time: String,
    /// Amount with two decimals
    pub amount: String,
    pub sequence: String,
}

impl TransactionRow {
    pub fn from_record(record: &TransactionRecord) -> Self {
        Self {
            id: record.id.clone(),
            time: localize_time(&record.time),
            amount: custweb_utils::format_amount(record.amount),
            sequence: record.sequence.to_string(),
        }
    }
}

/// RFC 3339 timestamps are shown in local time; anything else as sent
pub fn localize_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// A complete render of a transaction screen
#[derive(Debug, Clone, Serialize)]
pub struct ViewFrame {
    /// Increases by one with every render of the screen
    pub version: u64,
    pub range: FilterRange,
    pub rows: Vec<TransactionRow>,
    pub summary: Summary,
    /// `summary.total_amount` with two decimals
    pub total_display: String,
}

impl ViewFrame {
    pub fn build(version: u64, range: FilterRange, records: &[TransactionRecord]) -> Self {
        let summary = aggregate(records);
        Self {
            version,
            range,
            rows: records.iter().map(TransactionRow::from_record).collect(),
            total_display: summary.total_display(),
            summary,
        }
    }

    pub fn row_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Non-blocking message shown next to a screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

/// Receiver of frames and notices for one screen.
///
/// Calls happen synchronously from the synchronizer; implementations must
/// not block.
pub trait ViewSink: Send + Sync {
    fn render(&self, frame: &ViewFrame);

    fn notify(&self, notice: &Notice);
}

/// Sink that keeps the newest frame and queued notices for polling clients
pub struct FrameBuffer {
    latest: watch::Sender<Option<ViewFrame>>,
    notices: Mutex<Vec<Notice>>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            latest,
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Version of the newest frame, 0 before the first render
    pub fn version(&self) -> u64 {
        self.latest.borrow().as_ref().map(|frame| frame.version).unwrap_or(0)
    }

    pub fn latest(&self) -> Option<ViewFrame> {
        self.latest.borrow().clone()
    }

    /// The newest frame if its version is greater than `since`
    pub fn newer_than(&self, since: u64) -> Option<ViewFrame> {
        self.latest
            .borrow()
            .as_ref()
            .filter(|frame| frame.version > since)
            .cloned()
    }

    /// Wait until a frame newer than `since` is rendered
    pub async fn wait_newer_than(&self, since: u64) -> Option<ViewFrame> {
        let mut receiver = self.latest.subscribe();
        loop {
            let newer = receiver
                .borrow_and_update()
                .as_ref()
                .filter(|frame| frame.version > since)
                .cloned();
            if newer.is_some() {
                return newer;
            }
            if receiver.changed().await.is_err() {
                return None;
            }
        }
    }

    /// Drain queued notices
    pub fn take_notices(&self) -> Vec<Notice> {
        let mut notices = self.notices.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *notices)
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewSink for FrameBuffer {
    fn render(&self, frame: &ViewFrame) {
        self.latest.send_modify(|latest| {
            let newer = latest.as_ref().map_or(true, |current| frame.version > current.version);
            if newer {
                *latest = Some(frame.clone());
            }
        });
    }

    fn notify(&self, notice: &Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use custweb_client::SequenceTag;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    fn record(id: &str, time: &str, amount: &str) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            time: time.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            sequence: SequenceTag::Number(7),
            customer_id: None,
        }
    }

    fn range() -> FilterRange {
        FilterRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    fn frame(version: u64) -> ViewFrame {
        ViewFrame::build(version, range(), &[])
    }

    #[test]
    fn test_row_formatting() {
        let row = TransactionRow::from_record(&record("a", "not-a-timestamp", "10.5"));
        assert_eq!(row.time, "not-a-timestamp");
        assert_eq!(row.amount, "10.50");
        assert_eq!(row.sequence, "7");
    }

    #[test]
    fn test_localize_time_parses_rfc3339() {
        let shown = localize_time("2024-01-05T10:00:00Z");
        assert_eq!(shown.len(), "2024-01-05 10:00:00".len());
        assert!(shown.starts_with("2024-01-0"));
    }

    #[test]
    fn test_frame_summary() {
        let records = vec![
            record("a", "2024-01-05T10:00:00Z", "10.50"),
            record("b", "2024-01-06T10:00:00Z", "-3.25"),
            record("c", "2024-01-07T10:00:00Z", "7.00"),
        ];
        let frame = ViewFrame::build(1, range(), &records);
        assert_eq!(frame.summary.count, 3);
        assert_eq!(frame.total_display, "14.25");
        assert_eq!(frame.row_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_frame_buffer_keeps_newest() {
        let buffer = FrameBuffer::new();
        assert_eq!(buffer.version(), 0);
        assert!(buffer.newer_than(0).is_none());

        buffer.render(&frame(2));
        buffer.render(&frame(1));
        assert_eq!(buffer.version(), 2);
        assert!(buffer.newer_than(1).is_some());
        assert!(buffer.newer_than(2).is_none());
    }

    #[test]
    fn test_frame_buffer_notices_drain() {
        let buffer = FrameBuffer::new();
        buffer.notify(&Notice::error("failed"));
        buffer.notify(&Notice::info("ok"));

        let notices = buffer.take_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].level, NoticeLevel::Error);
        assert!(buffer.take_notices().is_empty());
    }

    #[tokio::test]
    async fn test_wait_newer_than() {
        let buffer = Arc::new(FrameBuffer::new());
        buffer.render(&frame(1));

        let waiter = {
            let buffer = buffer.clone();
            tokio::spawn(async move { buffer.wait_newer_than(1).await })
        };
        tokio::task::yield_now().await;
        buffer.render(&frame(2));

        let frame = waiter.await.unwrap().unwrap();
        assert_eq!(frame.version, 2);
    }
}
