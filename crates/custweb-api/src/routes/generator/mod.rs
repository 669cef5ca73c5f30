//! Generator routes - Synthetic customers and transactions

pub mod api;
pub mod page;

pub use api::{htmx_generate_customers, htmx_generate_transactions};
pub use page::page_generate;
