//! Validated requests to the synthetic data generator

use custweb_client::DataGenerator;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// Largest batch the generator accepts in one request
pub const DEFAULT_MAX_TRANSACTIONS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationRequest {
    Customers { num: u32 },
    Transactions { transactions_num: u32, customers_num: u32 },
}

impl GenerationRequest {
    pub fn customers(num: u32) -> CoreResult<Self> {
        if num == 0 {
            return Err(CoreError::InvalidInput {
                field: "num".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(GenerationRequest::Customers { num })
    }

    pub fn transactions(transactions_num: u32, customers_num: u32, max_transactions: u32) -> CoreResult<Self> {
        if transactions_num == 0 {
            return Err(CoreError::InvalidInput {
                field: "transactions_num".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if transactions_num > max_transactions {
            return Err(CoreError::InvalidInput {
                field: "transactions_num".to_string(),
                reason: format!("单次最多只能产生{}笔资料", max_transactions),
            });
        }
        if customers_num == 0 {
            return Err(CoreError::InvalidInput {
                field: "customers_num".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(GenerationRequest::Transactions { transactions_num, customers_num })
    }

    /// Send the request; failures carry the generator's error text
    pub async fn submit(&self, generator: &dyn DataGenerator) -> CoreResult<()> {
        let result = match *self {
            GenerationRequest::Customers { num } => generator.generate_customers(num).await,
            GenerationRequest::Transactions { transactions_num, customers_num } => {
                generator.generate_transactions(transactions_num, customers_num).await
            }
        };
        result.map_err(|e| CoreError::network("data generation", &e))?;
        log::info!(target: "custweb::sync", "Generator accepted {:?}", self);
        Ok(())
    }

    /// Confirmation text shown after a successful request
    pub fn success_message(&self) -> String {
        match self {
            GenerationRequest::Customers { num } => format!("已产生 {} 位客户", num),
            GenerationRequest::Transactions { transactions_num, customers_num } => {
                format!("已为 {} 位客户产生 {} 笔交易", customers_num, transactions_num)
            }
        }
    }
}
