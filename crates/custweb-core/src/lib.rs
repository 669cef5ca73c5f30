//! Console business logic: transaction screen synchronization, customer
//! totals and generator requests.
//!
//! Remote data is reached through the `custweb-client` traits; rendering
//! goes through [`ViewSink`].

pub mod aggregate;
pub mod cache;
pub mod customers;
pub mod error;
pub mod generator;
pub mod range;
pub mod sync;
pub mod view;

pub use aggregate::{aggregate, Summary};
pub use cache::TransactionCache;
pub use customers::{summarize_customers, CustomerForm, CustomerSummary};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use generator::{GenerationRequest, DEFAULT_MAX_TRANSACTIONS};
pub use range::FilterRange;
pub use sync::{SyncOutcome, TransactionViewSync};
pub use view::{localize_time, FrameBuffer, Notice, NoticeLevel, TransactionRow, ViewFrame, ViewSink};

pub use custweb_client::{Customer, Gender, TransactionRecord};
