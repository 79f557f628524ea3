//! Market data, watchlist and price alert endpoints.

use financeflow_domain::constants::DEFAULT_NEWS_LIMIT;
use financeflow_domain::{
    Alert, ApiError, CreateAlertRequest, HistoricalPrice, HistoricalQuery, MarketQuote, MoverKind,
    NewsArticle, SymbolSearchResult, UpdateAlertRequest, WatchlistItem,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::segment;
use crate::http::HttpClient;

/// Query for `GET /market-data/search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSearch {
    pub query: String,
    /// `stock`, `etf`, `bond` or `crypto`.
    pub kind: Option<String>,
    pub limit: Option<u32>,
}

impl SymbolSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![("query".to_string(), self.query.clone())];
        if let Some(kind) = &self.kind {
            query.push(("type".to_string(), kind.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone)]
pub struct MarketApi {
    client: HttpClient,
}

impl MarketApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Latest quotes for `symbols`.
    ///
    /// # Errors
    /// Any client error.
    #[instrument(skip(self), fields(count = symbols.len()))]
    pub async fn quotes(&self, symbols: &[String]) -> Result<Vec<MarketQuote>, ApiError> {
        self.client.post("/market-data/quotes", &json!({ "symbols": symbols })).await
    }

    /// # Errors
    /// Any client error.
    pub async fn historical(&self, query: &HistoricalQuery) -> Result<Vec<HistoricalPrice>, ApiError> {
        self.client.get_with_query("/market-data/historical", query.to_query()).await
    }

    /// # Errors
    /// Any client error.
    pub async fn search(&self, search: &SymbolSearch) -> Result<Vec<SymbolSearchResult>, ApiError> {
        self.client.get_with_query("/market-data/search", search.to_query()).await
    }

    /// Index levels and market breadth, passed through undecoded.
    ///
    /// # Errors
    /// Any client error.
    pub async fn summary(&self) -> Result<Value, ApiError> {
        self.client.get("/market-data/summary").await
    }

    /// # Errors
    /// Any client error.
    pub async fn top_movers(&self, kind: MoverKind) -> Result<Vec<MarketQuote>, ApiError> {
        self.client.get(&format!("/market-data/movers/{kind}")).await
    }

    /// Latest headlines, optionally narrowed to `symbols`. `limit` defaults
    /// to 20.
    ///
    /// # Errors
    /// Any client error.
    pub async fn news(
        &self,
        symbols: &[String],
        limit: Option<u32>,
    ) -> Result<Vec<NewsArticle>, ApiError> {
        self.client.get_with_query("/market-data/news", news_query(symbols, limit)).await
    }

    /* ---------------------------------------------------------------------- */
    /* Watchlist                                                              */
    /* ---------------------------------------------------------------------- */

    /// # Errors
    /// Any client error.
    pub async fn watchlist(&self) -> Result<Vec<WatchlistItem>, ApiError> {
        self.client.get("/watchlist").await
    }

    /// # Errors
    /// Any client error.
    pub async fn add_to_watchlist(&self, symbol: &str) -> Result<Value, ApiError> {
        let added = self.client.post("/watchlist", &json!({ "symbol": symbol })).await?;
        debug!(symbol, "Added to watchlist");
        Ok(added)
    }

    /// # Errors
    /// Any client error.
    pub async fn remove_from_watchlist(&self, symbol: &str) -> Result<(), ApiError> {
        self.client.delete::<Value>(&format!("/watchlist/{}", segment(symbol))).await.map(drop)
    }

    /* ---------------------------------------------------------------------- */
    /* Alerts                                                                 */
    /* ---------------------------------------------------------------------- */

    /// # Errors
    /// Any client error.
    pub async fn alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.client.get("/alerts").await
    }

    /// # Errors
    /// Any client error.
    pub async fn create_alert(&self, request: &CreateAlertRequest) -> Result<Alert, ApiError> {
        self.client.post("/alerts", request).await
    }

    /// # Errors
    /// Any client error.
    pub async fn update_alert(
        &self,
        id: &str,
        request: &UpdateAlertRequest,
    ) -> Result<Alert, ApiError> {
        self.client.patch(&format!("/alerts/{}", segment(id)), request).await
    }

    /// Enable or disable an alert.
    ///
    /// # Errors
    /// Any client error.
    pub async fn toggle_alert(&self, id: &str, active: bool) -> Result<Value, ApiError> {
        self.client
            .patch(&format!("/alerts/{}/toggle", segment(id)), &json!({ "active": active }))
            .await
    }

    /// # Errors
    /// Any client error.
    pub async fn delete_alert(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete::<Value>(&format!("/alerts/{}", segment(id))).await.map(drop)
    }
}

fn news_query(symbols: &[String], limit: Option<u32>) -> Vec<(String, String)> {
    let mut query = Vec::with_capacity(2);
    if !symbols.is_empty() {
        query.push(("symbols".to_string(), symbols.join(",")));
    }
    query.push(("limit".to_string(), limit.unwrap_or(DEFAULT_NEWS_LIMIT).to_string()));
    query
}
