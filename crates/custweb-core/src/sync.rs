//! Incremental synchronization of one customer's transaction screen.
//!
//! A screen shows `filter(cache, current_range)`. Changing the range renders
//! immediately from the cache, then a range-scoped fetch fills in records
//! the cache has not seen and re-renders against whatever range is current
//! when the fetch completes. Fetches only ever add to the cache, so
//! completions arriving out of order never lose or corrupt data.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Local;
use custweb_client::{ClientResult, SourceRef, TransactionRecord};
use tokio::task::JoinHandle;

use crate::cache::TransactionCache;
use crate::error::CoreError;
use crate::range::FilterRange;
use crate::view::{Notice, ViewFrame, ViewSink};

const LOG_TARGET: &str = "custweb::sync";

/// Result of a fetch-and-render step
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// Fetched records were merged and the screen re-rendered
    Rendered { inserted: usize, frame: ViewFrame },
    /// The fetch failed or timed out; the cache is unchanged
    Failed { error: CoreError },
}

impl SyncOutcome {
    pub fn frame(&self) -> Option<&ViewFrame> {
        match self {
            SyncOutcome::Rendered { frame, .. } => Some(frame),
            SyncOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

struct SyncState {
    cache: TransactionCache,
    current_range: FilterRange,
    version: u64,
}

/// Transaction screen state for a single customer
pub struct TransactionViewSync {
    customer_id: String,
    source: SourceRef,
    sink: Arc<dyn ViewSink>,
    request_timeout: Duration,
    state: Mutex<SyncState>,
}

impl TransactionViewSync {
    pub fn new(
        customer_id: impl Into<String>,
        source: SourceRef,
        sink: Arc<dyn ViewSink>,
        initial_range: FilterRange,
        request_timeout: Duration,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            source,
            sink,
            request_timeout,
            state: Mutex::new(SyncState {
                cache: TransactionCache::new(),
                current_range: initial_range,
                version: 0,
            }),
        }
    }

    /// Screen starting on `[today - window_months, today]` in local time
    pub fn starting_today(
        customer_id: impl Into<String>,
        source: SourceRef,
        sink: Arc<dyn ViewSink>,
        window_months: u32,
        request_timeout: Duration,
    ) -> Self {
        let today = Local::now().date_naive();
        let range = FilterRange::last_months(today, window_months);
        Self::new(customer_id, source, sink, range, request_timeout)
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn current_range(&self) -> FilterRange {
        self.lock_state().current_range
    }

    pub fn cached_count(&self) -> usize {
        self.lock_state().cache.len()
    }

    /// Copy of every cached record, in insertion order
    pub fn cached_records(&self) -> Vec<TransactionRecord> {
        self.lock_state().cache.records().to_vec()
    }

    fn lock_state(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Render `filter(cache, current_range)` as the next frame.
    ///
    /// Called with the state lock held so frames reach the sink in version
    /// order.
    fn render_locked(&self, state: &mut SyncState) -> ViewFrame {
        state.version += 1;
        let records = state.cache.filter(&state.current_range);
        let frame = ViewFrame::build(state.version, state.current_range, &records);
        self.sink.render(&frame);
        frame
    }

    /// Re-render the current range without fetching
    pub fn refresh(&self) -> ViewFrame {
        let mut state = self.lock_state();
        self.render_locked(&mut state)
    }

    async fn fetch<F>(&self, operation: &str, request: F) -> Result<Vec<TransactionRecord>, CoreError>
    where
        F: Future<Output = ClientResult<Vec<TransactionRecord>>>,
    {
        match tokio::time::timeout(self.request_timeout, request).await {
            Ok(Ok(records)) => Ok(records),
            Ok(Err(e)) => Err(CoreError::network(operation, &e)),
            Err(_) => Err(CoreError::NetworkFailure {
                operation: operation.to_string(),
                message: format!("no response within {:?}", self.request_timeout),
            }),
        }
    }

    /// Fetch the customer's full transaction list into the cache and render
    /// the current range.
    ///
    /// Runs once when a screen opens. The result is merged rather than
    /// assigned so records from a reconciliation that finished first survive.
    pub async fn initial_load(&self) -> SyncOutcome {
        log::debug!(target: LOG_TARGET, "Initial load for customer {}", self.customer_id);

        let fetched = self
            .fetch("initial load", self.source.list_transactions(&self.customer_id))
            .await;

        match fetched {
            Ok(records) => {
                let fetched_count = records.len();
                let mut state = self.lock_state();
                let inserted = state.cache.merge(records);
                let frame = self.render_locked(&mut state);
                log::info!(
                    target: LOG_TARGET,
                    "Loaded {} transactions for customer {} ({} new, {} shown)",
                    fetched_count,
                    self.customer_id,
                    inserted,
                    frame.rows.len()
                );
                SyncOutcome::Rendered { inserted, frame }
            }
            Err(error) => {
                error.log(&format!("initial load for customer {}", self.customer_id));
                self.sink.notify(&Notice::error(format!("无法获取交易记录：{}", failure_message(&error))));
                // Leave the loading state; nothing was merged, so the view is
                // whatever the cache already held for the current range
                self.refresh();
                SyncOutcome::Failed { error }
            }
        }
    }

    /// Step 1: make `range` current and render it from the cache alone
    pub fn show(&self, range: FilterRange) -> ViewFrame {
        let mut state = self.lock_state();
        state.current_range = range;
        self.render_locked(&mut state)
    }

    /// Step 2: fetch `range` from the service, merge, and re-render
    /// against the range current at completion time.
    ///
    /// On failure nothing is merged, the last frame stays authoritative and
    /// a notice is emitted.
    pub async fn reconcile(&self, range: FilterRange) -> SyncOutcome {
        log::debug!(
            target: LOG_TARGET,
            "Reconciling {} for customer {}",
            range,
            self.customer_id
        );

        let fetched = self
            .fetch(
                "range fetch",
                self.source.list_transactions_in_range(&self.customer_id, range.to_query()),
            )
            .await;

        match fetched {
            Ok(records) => {
                let mut state = self.lock_state();
                let inserted = state.cache.merge(records);
                let superseded = state.current_range != range;
                let frame = self.render_locked(&mut state);
                if superseded {
                    log::debug!(
                        target: LOG_TARGET,
                        "Reconciliation for {} finished after range moved to {}",
                        range,
                        frame.range
                    );
                }
                log::debug!(
                    target: LOG_TARGET,
                    "Merged {} new transactions for customer {} ({} cached)",
                    inserted,
                    self.customer_id,
                    state.cache.len()
                );
                SyncOutcome::Rendered { inserted, frame }
            }
            Err(error) => {
                error.log(&format!("reconciling {} for customer {}", range, self.customer_id));
                self.sink.notify(&Notice::error(format!(
                    "无法更新 {} 的交易记录：{}",
                    range.description(),
                    failure_message(&error)
                )));
                SyncOutcome::Failed { error }
            }
        }
    }

    /// Both steps in order; returns the reconciliation outcome
    pub async fn apply_filter(&self, range: FilterRange) -> SyncOutcome {
        self.show(range);
        self.reconcile(range).await
    }

    /// Run step 2 on the tokio runtime
    pub fn spawn_reconcile(self: &Arc<Self>, range: FilterRange) -> JoinHandle<SyncOutcome> {
        let sync = Arc::clone(self);
        tokio::spawn(async move { sync.reconcile(range).await })
    }

    /// Run the initial load on the tokio runtime
    pub fn spawn_initial_load(self: &Arc<Self>) -> JoinHandle<SyncOutcome> {
        let sync = Arc::clone(self);
        tokio::spawn(async move { sync.initial_load().await })
    }
}

fn failure_message(error: &CoreError) -> String {
    match error {
        CoreError::NetworkFailure { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use custweb_client::{ClientError, DateRangeQuery, SequenceTag, TransactionSource};
    use rust_decimal::Decimal;
    use std::collections::VecDeque;
    use std::str::FromStr;
    use tokio::sync::oneshot;

    fn record(id: &str, time: &str, amount: &str) -> TransactionRecord {
        TransactionRecord {
            id: id.to_string(),
            time: time.to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            sequence: SequenceTag::Number(1),
            customer_id: Some("c1".to_string()),
        }
    }

    fn range(from: &str, to: &str) -> FilterRange {
        FilterRange::parse(from, to).unwrap()
    }

    #[derive(Default)]
    struct FakeSource {
        records: Vec<TransactionRecord>,
        fail_full: bool,
        fail_range: bool,
        delay: Option<Duration>,
        gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
        range_calls: Mutex<Vec<DateRangeQuery>>,
    }

    impl FakeSource {
        fn with_records(records: Vec<TransactionRecord>) -> Self {
            Self { records, ..Default::default() }
        }

        fn range_call_count(&self) -> usize {
            self.range_calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TransactionSource for FakeSource {
        async fn list_transactions(&self, _customer_id: &str) -> ClientResult<Vec<TransactionRecord>> {
            if self.fail_full {
                return Err(ClientError::Request { message: "connection refused".to_string() });
            }
            Ok(self.records.clone())
        }

        async fn list_transactions_in_range(
            &self,
            _customer_id: &str,
            query: DateRangeQuery,
        ) -> ClientResult<Vec<TransactionRecord>> {
            self.range_calls.lock().unwrap().push(query);
            let gate = self.gates.lock().unwrap().pop_front();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail_range {
                return Err(ClientError::Status { status: 500, message: "database unavailable".to_string() });
            }
            let range = FilterRange::new(query.from, query.to);
            Ok(self
                .records
                .iter()
                .filter(|r| range.contains_key(r.date_key()))
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<ViewFrame>>,
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingSink {
        fn frames(&self) -> Vec<ViewFrame> {
            self.frames.lock().unwrap().clone()
        }

        fn last_frame(&self) -> ViewFrame {
            self.frames.lock().unwrap().last().cloned().expect("no frame rendered")
        }

        fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl ViewSink for RecordingSink {
        fn render(&self, frame: &ViewFrame) {
            self.frames.lock().unwrap().push(frame.clone());
        }

        fn notify(&self, notice: &Notice) {
            self.notices.lock().unwrap().push(notice.clone());
        }
    }

    fn server_records() -> Vec<TransactionRecord> {
        vec![
            record("A", "2024-01-05T10:00:00Z", "10.50"),
            record("B", "2024-02-10T10:00:00Z", "-3.25"),
            record("C", "2024-03-01T10:00:00Z", "7.00"),
        ]
    }

    fn setup(source: FakeSource, initial: FilterRange) -> (Arc<TransactionViewSync>, Arc<FakeSource>, Arc<RecordingSink>) {
        let source = Arc::new(source);
        let sink = Arc::new(RecordingSink::default());
        let sync = Arc::new(TransactionViewSync::new(
            "c1",
            source.clone(),
            sink.clone(),
            initial,
            Duration::from_secs(5),
        ));
        (sync, source, sink)
    }

    #[tokio::test]
    async fn test_initial_load_renders_current_range() {
        let (sync, _, sink) = setup(
            FakeSource::with_records(server_records()),
            range("2024-02-01", "2024-03-01"),
        );

        let outcome = sync.initial_load().await;
        let frame = outcome.frame().unwrap();
        assert_eq!(frame.row_ids(), vec!["B", "C"]);
        assert_eq!(frame.total_display, "3.75");
        assert_eq!(sync.cached_count(), 3);
        assert_eq!(sink.frames().len(), 1);
        assert!(sink.notices().is_empty());
    }

    #[tokio::test]
    async fn test_initial_load_failure_leaves_cache_empty() {
        let source = FakeSource { fail_full: true, ..FakeSource::with_records(server_records()) };
        let (sync, _, sink) = setup(source, range("2024-01-01", "2024-12-31"));

        let outcome = sync.initial_load().await;
        assert!(outcome.is_failed());
        assert_eq!(sync.cached_count(), 0);

        // an empty frame replaces the loading state
        let frames = sink.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].version, 1);
        assert_eq!(frames[0].range, range("2024-01-01", "2024-12-31"));
        assert!(frames[0].rows.is_empty());
        assert_eq!(frames[0].total_display, "0.00");

        let notices = sink.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_filter_after_failed_initial_load_fills_view() {
        let source = FakeSource { fail_full: true, ..FakeSource::with_records(server_records()) };
        let (sync, _, sink) = setup(source, range("2024-01-01", "2024-12-31"));
        sync.initial_load().await;

        let outcome = sync.apply_filter(range("2024-01-01", "2024-02-29")).await;
        assert_eq!(outcome.frame().unwrap().row_ids(), vec!["A", "B"]);
        assert_eq!(sink.frames().len(), 3);
    }

    #[tokio::test]
    async fn test_filter_renders_cache_then_reconciled_view() {
        let (sync, _, sink) = setup(
            FakeSource::with_records(server_records()),
            range("2024-06-01", "2024-06-30"),
        );

        let target = range("2024-01-01", "2024-02-28");
        let outcome = sync.apply_filter(target).await;

        let frames = sink.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].version, 1);
        assert!(frames[0].rows.is_empty());
        assert_eq!(frames[0].summary.count, 0);

        assert_eq!(frames[1].version, 2);
        assert_eq!(frames[1].row_ids(), vec!["A", "B"]);
        assert_eq!(frames[1].total_display, "7.25");
        assert!(matches!(outcome, SyncOutcome::Rendered { inserted: 2, .. }));
    }

    #[tokio::test]
    async fn test_step_one_uses_cached_records() {
        let (sync, _, sink) = setup(
            FakeSource::with_records(server_records()),
            range("2024-01-01", "2024-01-31"),
        );
        sync.initial_load().await;

        let frame = sync.show(range("2024-02-01", "2024-03-31"));
        assert_eq!(frame.row_ids(), vec!["B", "C"]);
        assert_eq!(sink.last_frame().version, frame.version);
        assert_eq!(sync.current_range(), range("2024-02-01", "2024-03-31"));
    }

    #[tokio::test]
    async fn test_stale_reconciliation_renders_current_range() {
        let (gate_tx, gate_rx) = oneshot::channel();
        let source = FakeSource::with_records(server_records());
        source.gates.lock().unwrap().push_back(gate_rx);
        let (sync, source, sink) = setup(source, range("2024-06-01", "2024-06-30"));

        let r1 = range("2024-01-01", "2024-01-31");
        let r2 = range("2024-02-01", "2024-02-29");

        let first = {
            let sync = sync.clone();
            tokio::spawn(async move { sync.apply_filter(r1).await })
        };
        while source.range_call_count() == 0 {
            tokio::task::yield_now().await;
        }

        let second = sync.apply_filter(r2).await;
        assert_eq!(second.frame().unwrap().row_ids(), vec!["B"]);

        gate_tx.send(()).unwrap();
        let first = first.await.unwrap();

        let last = sink.last_frame();
        assert_eq!(last.range, r2);
        assert_eq!(last.row_ids(), vec!["B"]);
        assert_eq!(first.frame().unwrap().version, last.version);

        // R1's records were still merged
        let cached: Vec<String> = sync.cached_records().into_iter().map(|r| r.id).collect();
        assert_eq!(cached, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_reconcile_failure_keeps_step_one_frame() {
        let source = FakeSource { fail_range: true, ..FakeSource::with_records(server_records()) };
        let (sync, _, sink) = setup(source, range("2024-01-01", "2024-01-31"));
        sync.initial_load().await;
        let cached_before = sync.cached_records();

        let outcome = sync.apply_filter(range("2024-02-01", "2024-02-29")).await;
        assert!(matches!(
            outcome,
            SyncOutcome::Failed { error: CoreError::NetworkFailure { .. } }
        ));

        assert_eq!(sync.cached_records(), cached_before);
        let last = sink.last_frame();
        assert_eq!(last.version, 2);
        assert_eq!(last.row_ids(), vec!["B"]);

        let notices = sink.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("database unavailable"));
        assert!(notices[0].message.contains("2024-02-01 至 2024-02-29"));
    }

    #[tokio::test]
    async fn test_reconcile_timeout_is_failure() {
        let source = FakeSource { delay: Some(Duration::from_secs(30)), ..FakeSource::with_records(server_records()) };
        let source = Arc::new(source);
        let sink = Arc::new(RecordingSink::default());
        let sync = TransactionViewSync::new(
            "c1",
            source,
            sink.clone(),
            range("2024-01-01", "2024-01-31"),
            Duration::from_millis(50),
        );

        let outcome = sync.apply_filter(range("2024-01-01", "2024-03-31")).await;
        assert!(outcome.is_failed());
        assert_eq!(sync.cached_count(), 0);
        assert_eq!(sink.frames().len(), 1);
        assert_eq!(sink.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_reversed_range_is_empty_not_error() {
        let (sync, _, sink) = setup(
            FakeSource::with_records(server_records()),
            range("2024-01-01", "2024-12-31"),
        );
        sync.initial_load().await;

        let outcome = sync.apply_filter(range("2024-06-01", "2024-05-01")).await;
        let frame = outcome.frame().unwrap();
        assert!(frame.rows.is_empty());
        assert_eq!(frame.summary.count, 0);
        assert_eq!(frame.total_display, "0.00");
        assert!(sink.notices().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_fetches_do_not_duplicate() {
        let (sync, _, _) = setup(
            FakeSource::with_records(server_records()),
            range("2024-01-01", "2024-12-31"),
        );
        sync.initial_load().await;
        sync.apply_filter(range("2024-01-01", "2024-02-28")).await;
        sync.apply_filter(range("2024-01-01", "2024-03-31")).await;

        let mut ids: Vec<String> = sync.cached_records().into_iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_spawn_reconcile() {
        let (sync, _, sink) = setup(
            FakeSource::with_records(server_records()),
            range("2024-01-01", "2024-01-31"),
        );

        let target = range("2024-03-01", "2024-03-31");
        sync.show(target);
        let outcome = sync.spawn_reconcile(target).await.unwrap();
        assert_eq!(outcome.frame().unwrap().row_ids(), vec!["C"]);
        assert_eq!(sink.last_frame().row_ids(), vec!["C"]);
    }
}
