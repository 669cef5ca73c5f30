//! Clients for the remote customer, transaction and generator services
//!
//! The console never owns customer or transaction data. Everything it shows
//! comes through the traits below; `http` provides the reqwest-backed
//! implementations.

use async_trait::async_trait;
use std::sync::Arc;

pub mod error;
pub mod http;
pub mod models;

pub use error::{ClientError, ClientResult};
pub use http::{GeneratorClient, ServiceClient};
pub use models::{
    Customer, CustomerUpdate, DateRangeQuery, ErrorResponse, Gender, NewCustomer, SequenceTag,
    TransactionRecord,
};

// ==================== Service Traits ====================

/// Source of transaction records for one customer
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// All transactions of a customer, no date bounds
    async fn list_transactions(&self, customer_id: &str) -> ClientResult<Vec<TransactionRecord>>;

    /// Transactions whose date the service considers inside `range`
    async fn list_transactions_in_range(
        &self,
        customer_id: &str,
        range: DateRangeQuery,
    ) -> ClientResult<Vec<TransactionRecord>>;
}

/// Customer records
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn list_customers(&self) -> ClientResult<Vec<Customer>>;

    async fn customer(&self, customer_id: &str) -> ClientResult<Customer>;

    async fn create_customer(&self, customer: &NewCustomer) -> ClientResult<()>;

    async fn update_customer(&self, customer_id: &str, update: &CustomerUpdate) -> ClientResult<()>;
}

/// Synthetic data generation
#[async_trait]
pub trait DataGenerator: Send + Sync {
    async fn generate_customers(&self, num: u32) -> ClientResult<()>;

    async fn generate_transactions(&self, transactions_num: u32, customers_num: u32) -> ClientResult<()>;
}

/// Shared handle types
pub type SourceRef = Arc<dyn TransactionSource>;
pub type DirectoryRef = Arc<dyn CustomerDirectory>;
pub type GeneratorRef = Arc<dyn DataGenerator>;
