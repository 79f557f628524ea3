//! Market data, watchlist and alert models.

use serde::{Deserialize, Serialize};

use crate::impl_wire_string_conversions;
use crate::utils::serde::{flexible_f64, flexible_opt_f64};

/// Latest quote for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketQuote {
    pub symbol: String,
    #[serde(deserialize_with = "flexible_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub change: f64,
    #[serde(default, alias = "change_percent", deserialize_with = "flexible_f64")]
    pub change_percent: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub volume: f64,
    #[serde(default, alias = "market_cap", deserialize_with = "flexible_opt_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, alias = "pe_ratio", deserialize_with = "flexible_opt_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(default, alias = "dividend_yield", deserialize_with = "flexible_opt_f64")]
    pub dividend_yield: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPrice {
    pub date: String,
    #[serde(deserialize_with = "flexible_f64")]
    pub open: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub high: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub low: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub close: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub volume: f64,
    #[serde(default, alias = "adjusted_close", deserialize_with = "flexible_opt_f64")]
    pub adjusted_close: Option<f64>,
}

/// Query for `GET /market-data/historical`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalQuery {
    pub symbol: String,
    /// `1d`, `5d`, `1mo`, `3mo`, `6mo`, `1y`, `2y`, `5y`, `10y` or `max`.
    pub period: String,
    /// `1m` through `1mo`.
    pub interval: String,
}

impl HistoricalQuery {
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("symbol".to_string(), self.symbol.clone()),
            ("period".to_string(), self.period.clone()),
            ("interval".to_string(), self.interval.clone()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSearchResult {
    pub symbol: String,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    #[serde(default)]
    pub id: Option<String>,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "current_price", deserialize_with = "flexible_opt_f64")]
    pub current_price: Option<f64>,
    #[serde(default, alias = "change_percent", deserialize_with = "flexible_opt_f64")]
    pub change_percent: Option<f64>,
    #[serde(default, alias = "added_at")]
    pub added_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    PriceAbove,
    PriceBelow,
    PercentChange,
    PortfolioValue,
    AllocationDrift,
}

impl_wire_string_conversions!(AlertType {
    PriceAbove => "price_above",
    PriceBelow => "price_below",
    PercentChange => "percent_change",
    PortfolioValue => "portfolio_value",
    AllocationDrift => "allocation_drift",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertOperator {
    GreaterThan,
    LessThan,
    Equals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCondition {
    pub operator: AlertOperator,
    #[serde(deserialize_with = "flexible_f64")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    #[serde(default, alias = "portfolio_id")]
    pub portfolio_id: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(rename = "type", alias = "alert_type")]
    pub alert_type: AlertType,
    #[serde(default)]
    pub condition: Option<AlertCondition>,
    #[serde(default, alias = "is_active")]
    pub is_active: bool,
    #[serde(default, alias = "is_triggered")]
    pub is_triggered: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "triggered_at")]
    pub triggered_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAlertRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub condition: AlertCondition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Partial alert update for `PATCH /alerts/{id}`. Unset fields are left
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAlertRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<AlertCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Ranking used by `GET /market-data/movers/{kind}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoverKind {
    Gainers,
    Losers,
    Active,
}

impl_wire_string_conversions!(MoverKind {
    Gainers => "gainers",
    Losers => "losers",
    Active => "active",
});

/// One entry of the market news feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub symbols: Vec<String>,
    #[serde(default, alias = "published_at")]
    pub published_at: Option<String>,
}
