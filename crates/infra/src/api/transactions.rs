use financeflow_domain::{
    ApiError, CreateTransactionRequest, Transaction, TransactionFilter, UpdateTransactionRequest,
};
use serde_json::Value;
use tracing::{debug, instrument};

use super::segment;
use crate::http::HttpClient;

/// Query for `GET /transactions/summary/stats`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryQuery {
    pub portfolio_id: Option<String>,
    /// Look-back window; the server accepts 1 to 365.
    pub period_days: u32,
}

impl Default for SummaryQuery {
    fn default() -> Self {
        Self { portfolio_id: None, period_days: 30 }
    }
}

impl SummaryQuery {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::with_capacity(2);
        if let Some(portfolio_id) = &self.portfolio_id {
            query.push(("portfolio_id".to_string(), portfolio_id.clone()));
        }
        query.push(("period_days".to_string(), self.period_days.to_string()));
        query
    }
}

#[derive(Debug, Clone)]
pub struct TransactionApi {
    client: HttpClient,
}

impl TransactionApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// # Errors
    /// Any client error.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, ApiError> {
        let transactions: Vec<Transaction> =
            self.client.get_with_query("/transactions", filter.to_query()).await?;
        debug!(count = transactions.len(), "Transactions listed");
        Ok(transactions)
    }

    /// # Errors
    /// Any client error.
    pub async fn get(&self, id: &str) -> Result<Transaction, ApiError> {
        self.client.get(&format!("/transactions/{}", segment(id))).await
    }

    /// # Errors
    /// Any client error.
    pub async fn create(&self, request: &CreateTransactionRequest) -> Result<Transaction, ApiError> {
        self.client.post("/transactions", request).await
    }

    /// # Errors
    /// Any client error.
    pub async fn update(
        &self,
        id: &str,
        request: &UpdateTransactionRequest,
    ) -> Result<Transaction, ApiError> {
        self.client.patch(&format!("/transactions/{}", segment(id)), request).await
    }

    /// # Errors
    /// Any client error.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete::<Value>(&format!("/transactions/{}", segment(id))).await.map(drop)
    }

    /// Create several transactions in one request.
    ///
    /// # Errors
    /// Any client error.
    pub async fn bulk_create(
        &self,
        requests: &[CreateTransactionRequest],
    ) -> Result<Vec<Transaction>, ApiError> {
        let created: Vec<Transaction> = self.client.post("/transactions/bulk", requests).await?;
        debug!(requested = requests.len(), created = created.len(), "Bulk transactions created");
        Ok(created)
    }

    /// Aggregate statistics, passed through undecoded.
    ///
    /// # Errors
    /// Any client error.
    pub async fn summary(&self, query: &SummaryQuery) -> Result<Value, ApiError> {
        self.client.get_with_query("/transactions/summary/stats", query.to_query()).await
    }
}
