//! Route modules for the console server
//!
//! - customers: Customer list with yearly totals, create and edit forms
//! - transactions: Transaction screens (open, filter, poll, close)
//! - generator: Synthetic data generation
//! - settings: Settings page
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints and HTMX partial responses
//! - page.rs: HTMX page rendering

pub mod customers;
pub mod generator;
pub mod settings;
pub mod transactions;

use std::collections::HashMap;

/// Parse a positive integer form field
pub(crate) fn form_u32(form: &HashMap<String, String>, field: &str) -> Result<u32, String> {
    let raw = form.get(field).map(|s| s.trim()).unwrap_or("");
    raw.parse::<u32>()
        .map_err(|_| format!("{} 必须是正整数", field))
}
