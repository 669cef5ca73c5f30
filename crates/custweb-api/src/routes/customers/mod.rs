//! Customer routes - Customer list, create and edit
//!
//! Structure:
//! - api.rs: Form submissions (HTMX)
//! - page.rs: Full page rendering

pub mod api;
pub mod page;

pub use api::{htmx_customer_store, htmx_customer_update};
pub use page::{page_customer_edit, page_customer_new, page_customers};
