//! Customer list totals and customer form handling

use std::sync::Arc;
use std::time::Duration;

use custweb_client::{Customer, CustomerUpdate, Gender, NewCustomer, SourceRef};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::aggregate::{aggregate, Summary};
use crate::error::{CoreError, CoreResult};
use crate::range::FilterRange;

/// A customer list row
#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub customer: Customer,
    /// `None` when the customer's transactions could not be fetched
    pub total: Option<Summary>,
}

impl CustomerSummary {
    pub fn total_display(&self) -> String {
        self.total
            .map(|summary| summary.total_display())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Sum each customer's transactions in `range`, at most `max_in_flight`
/// fetches at a time. Output keeps the input order.
pub async fn summarize_customers(
    source: SourceRef,
    customers: Vec<Customer>,
    range: FilterRange,
    request_timeout: Duration,
    max_in_flight: usize,
) -> Vec<CustomerSummary> {
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks = JoinSet::new();
    for (index, customer) in customers.iter().enumerate() {
        let source = source.clone();
        let permits = permits.clone();
        let customer_id = customer.id.clone();
        tasks.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return (index, None);
            };
            let fetched = tokio::time::timeout(
                request_timeout,
                source.list_transactions_in_range(&customer_id, range.to_query()),
            )
            .await;
            let total = match fetched {
                Ok(Ok(records)) => {
                    let in_range: Vec<_> = records
                        .into_iter()
                        .filter(|record| range.contains_key(record.date_key()))
                        .collect();
                    Some(aggregate(&in_range))
                }
                Ok(Err(e)) => {
                    log::warn!(target: "custweb::sync", "Total for customer {} unavailable: {}", customer_id, e);
                    None
                }
                Err(_) => {
                    log::warn!(target: "custweb::sync", "Total for customer {} timed out", customer_id);
                    None
                }
            };
            (index, total)
        });
    }

    let mut totals: Vec<Option<Summary>> = vec![None; customers.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, total)) => totals[index] = total,
            Err(e) => log::error!(target: "custweb::sync", "Customer total task failed: {}", e),
        }
    }

    customers
        .into_iter()
        .zip(totals)
        .map(|(customer, total)| CustomerSummary { customer, total })
        .collect()
}

/// Customer form as submitted by the console
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub gender: String,
}

impl CustomerForm {
    fn required(field: &str, value: &str) -> CoreResult<String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(CoreError::InvalidInput {
                field: field.to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(value.to_string())
    }

    fn gender(&self) -> CoreResult<Gender> {
        self.gender.parse::<Gender>().map_err(|reason| CoreError::InvalidInput {
            field: "gender".to_string(),
            reason,
        })
    }

    pub fn into_new_customer(self) -> CoreResult<NewCustomer> {
        Ok(NewCustomer {
            name: Self::required("name", &self.name)?,
            email: Self::required("email", &self.email)?,
            password: Self::required("password", &self.password)?,
            gender: self.gender()?,
        })
    }

    /// Password is not part of an update
    pub fn into_update(self) -> CoreResult<CustomerUpdate> {
        Ok(CustomerUpdate {
            name: Self::required("name", &self.name)?,
            email: Self::required("email", &self.email)?,
            gender: self.gender()?,
        })
    }
}
