//! Transaction screen routes
//!
//! Opening `/customers/:id/transactions` registers a screen. The page then
//! talks to `/screens/:screen/*`: a filter submission answers with the
//! cached view right away and reconciles in the background, and the view
//! endpoint is polled for newer frames.
//!
//! Structure:
//! - api.rs: Filter, poll and close endpoints, JSON state and filter
//! - page.rs: Screen page and frame rendering

pub mod api;
pub mod page;

pub use api::{api_screen, api_screen_filter, htmx_screen_close, htmx_screen_filter, htmx_screen_view};
pub use page::{page_customer_transactions, render_screen_view};
