use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::models::{Customer, CustomerUpdate, DateRangeQuery, ErrorResponse, NewCustomer, TransactionRecord};
use crate::{CustomerDirectory, DataGenerator, TransactionSource};

/// Build the shared reqwest client with a request timeout
fn build_http_client(timeout: Duration) -> ClientResult<HttpClient> {
    HttpClient::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ClientError::Request { message: format!("Failed to build HTTP client: {}", e) })
}

fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Turn a non-success response into a `ClientError`.
///
/// Both services answer errors with `{"error": "..."}`; anything else is
/// passed through as raw text.
async fn handle_error_response(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let body_text = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ErrorResponse>(&body_text) {
        Ok(ErrorResponse { error: Some(error), .. }) => error,
        Ok(ErrorResponse { message: Some(message), .. }) => message,
        _ => body_text,
    };

    if status >= 500 {
        log::warn!(target: "custweb::client", "Server error {}: {}", status, message);
    }

    ClientError::Status { status, message }
}

async fn expect_success(response: reqwest::Response) -> ClientResult<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(handle_error_response(response).await)
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
    let response = expect_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ClientError::Decode { message: format!("Failed to parse response: {}", e) })
}

/// Client for the customer and transaction API
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http_client: HttpClient,
    base_url: String,
}

impl ServiceClient {
    /// Create a client against `base_url`, e.g. `http://localhost:8080`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn customer_url(&self, customer_id: &str, suffix: &str) -> String {
        join_url(
            &self.base_url,
            &format!("/customers/{}{}", urlencoding::encode(customer_id), suffix),
        )
    }
}

#[async_trait]
impl TransactionSource for ServiceClient {
    /// GET /customers/{id}/transactions
    async fn list_transactions(&self, customer_id: &str) -> ClientResult<Vec<TransactionRecord>> {
        let url = self.customer_url(customer_id, "/transactions");
        log::debug!(target: "custweb::client", "GET {}", url);

        let response = self.http_client.get(&url).send().await?;
        decode(response).await
    }

    /// GET /customers/{id}/transactions/date
    ///
    /// The range goes out both as a JSON body and as `from`/`to` query
    /// parameters; services differ in which one they read.
    async fn list_transactions_in_range(
        &self,
        customer_id: &str,
        range: DateRangeQuery,
    ) -> ClientResult<Vec<TransactionRecord>> {
        let url = self.customer_url(customer_id, "/transactions/date");
        let from = range.from.format("%Y-%m-%d").to_string();
        let to = range.to.format("%Y-%m-%d").to_string();
        log::debug!(target: "custweb::client", "GET {} [{} .. {}]", url, from, to);

        let response = self
            .http_client
            .get(&url)
            .query(&[("from", from.as_str()), ("to", to.as_str())])
            .json(&range)
            .send()
            .await?;
        decode(response).await
    }
}

#[async_trait]
impl CustomerDirectory for ServiceClient {
    /// GET /customers
    async fn list_customers(&self) -> ClientResult<Vec<Customer>> {
        let url = join_url(&self.base_url, "/customers");
        let response = self.http_client.get(&url).send().await?;
        decode(response).await
    }

    /// GET /customers/{id}
    async fn customer(&self, customer_id: &str) -> ClientResult<Customer> {
        let url = self.customer_url(customer_id, "");
        let response = self.http_client.get(&url).send().await?;
        decode(response).await
    }

    /// POST /customers
    async fn create_customer(&self, customer: &NewCustomer) -> ClientResult<()> {
        let url = join_url(&self.base_url, "/customers");
        let response = self.http_client.post(&url).json(customer).send().await?;
        expect_success(response).await.map(|_| ())
    }

    /// PUT /customers/{id}
    async fn update_customer(&self, customer_id: &str, update: &CustomerUpdate) -> ClientResult<()> {
        let url = self.customer_url(customer_id, "");
        let response = self.http_client.put(&url).json(update).send().await?;
        expect_success(response).await.map(|_| ())
    }
}

/// Client for the synthetic data generator
#[derive(Debug, Clone)]
pub struct GeneratorClient {
    http_client: HttpClient,
    base_url: String,
}

impl GeneratorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl DataGenerator for GeneratorClient {
    /// POST /generate/customer?num=N
    async fn generate_customers(&self, num: u32) -> ClientResult<()> {
        let url = join_url(&self.base_url, "/generate/customer");
        let response = self
            .http_client
            .post(&url)
            .query(&[("num", num)])
            .send()
            .await?;
        expect_success(response).await.map(|_| ())
    }

    /// POST /generate/transactions?transactions_num=N&customers_num=M
    async fn generate_transactions(&self, transactions_num: u32, customers_num: u32) -> ClientResult<()> {
        let url = join_url(&self.base_url, "/generate/transactions");
        let response = self
            .http_client
            .post(&url)
            .query(&[("transactions_num", transactions_num), ("customers_num", customers_num)])
            .send()
            .await?;
        expect_success(response).await.map(|_| ())
    }
}
