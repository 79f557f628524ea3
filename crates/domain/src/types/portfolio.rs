//! Portfolio, asset and transaction models.
//!
//! Response models are camelCase with snake_case aliases; request bodies are
//! snake_case, the form the API validates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::impl_wire_string_conversions;
use crate::utils::serde::{flexible_f64, flexible_opt_f64};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    Stock,
    Etf,
    Bond,
    Crypto,
    Commodity,
    RealEstate,
    Cash,
}

impl_wire_string_conversions!(AssetType {
    Stock => "stock",
    Etf => "etf",
    Bond => "bond",
    Crypto => "crypto",
    Commodity => "commodity",
    RealEstate => "real_estate",
    Cash => "cash",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Buy,
    Sell,
    Dividend,
    Split,
    Transfer,
}

impl_wire_string_conversions!(TransactionType {
    Buy => "buy",
    Sell => "sell",
    Dividend => "dividend",
    Split => "split",
    Transfer => "transfer",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "JPY")]
    Jpy,
    #[serde(rename = "CAD")]
    Cad,
    #[serde(rename = "AUD")]
    Aud,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    #[serde(default, alias = "user_id")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default, alias = "total_value", deserialize_with = "flexible_f64")]
    pub total_value: f64,
    #[serde(default, alias = "total_cost", deserialize_with = "flexible_f64")]
    pub total_cost: f64,
    #[serde(default, alias = "day_change", deserialize_with = "flexible_f64")]
    pub day_change: f64,
    #[serde(default, alias = "day_change_percent", deserialize_with = "flexible_f64")]
    pub day_change_percent: f64,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub allocation: Vec<AssetAllocation>,
    #[serde(default)]
    pub performance: Option<PerformanceData>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at")]
    pub updated_at: Option<String>,
}

impl Portfolio {
    /// Unrealized gain/loss across the portfolio.
    #[must_use]
    pub fn unrealized_gain_loss(&self) -> f64 {
        self.total_value - self.total_cost
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    #[serde(default, alias = "portfolio_id")]
    pub portfolio_id: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "asset_type")]
    pub asset_type: AssetType,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(deserialize_with = "flexible_f64")]
    pub quantity: f64,
    #[serde(default, alias = "average_cost", deserialize_with = "flexible_f64")]
    pub average_cost: f64,
    #[serde(default, alias = "current_price", deserialize_with = "flexible_f64")]
    pub current_price: f64,
    #[serde(default, alias = "market_value", deserialize_with = "flexible_f64")]
    pub market_value: f64,
    #[serde(default, alias = "total_cost", deserialize_with = "flexible_f64")]
    pub total_cost: f64,
    #[serde(default, alias = "unrealized_gain_loss", deserialize_with = "flexible_f64")]
    pub unrealized_gain_loss: f64,
    #[serde(default, alias = "day_change", deserialize_with = "flexible_f64")]
    pub day_change: f64,
    #[serde(default, alias = "day_change_percent", deserialize_with = "flexible_f64")]
    pub day_change_percent: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub weight: f64,
    #[serde(default, alias = "dividend_yield", deserialize_with = "flexible_opt_f64")]
    pub dividend_yield: Option<f64>,
    #[serde(default, alias = "pe_ratio", deserialize_with = "flexible_opt_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(default, alias = "market_cap", deserialize_with = "flexible_opt_f64")]
    pub market_cap: Option<f64>,
    #[serde(default, alias = "last_price_update")]
    pub last_price_update: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetAllocation {
    #[serde(alias = "asset_type")]
    pub asset_type: AssetType,
    #[serde(deserialize_with = "flexible_f64")]
    pub value: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub percentage: f64,
    #[serde(default, deserialize_with = "flexible_opt_f64")]
    pub target: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePeriod {
    #[serde(rename = "return", alias = "return_value", deserialize_with = "flexible_f64")]
    pub return_value: f64,
    #[serde(alias = "return_percent", deserialize_with = "flexible_f64")]
    pub return_percent: f64,
    #[serde(alias = "start_value", deserialize_with = "flexible_f64")]
    pub start_value: f64,
    #[serde(alias = "end_value", deserialize_with = "flexible_f64")]
    pub end_value: f64,
    #[serde(alias = "start_date")]
    pub start_date: String,
    #[serde(alias = "end_date")]
    pub end_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceData {
    #[serde(default, alias = "total_return", deserialize_with = "flexible_f64")]
    pub total_return: f64,
    #[serde(default, alias = "total_return_percent", deserialize_with = "flexible_f64")]
    pub total_return_percent: f64,
    #[serde(default, alias = "annualized_return", deserialize_with = "flexible_f64")]
    pub annualized_return: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub volatility: f64,
    #[serde(default, alias = "sharpe_ratio", deserialize_with = "flexible_f64")]
    pub sharpe_ratio: f64,
    #[serde(default, alias = "max_drawdown", deserialize_with = "flexible_f64")]
    pub max_drawdown: f64,
    #[serde(default, alias = "one_day")]
    pub one_day: Option<PerformancePeriod>,
    #[serde(default, alias = "one_month")]
    pub one_month: Option<PerformancePeriod>,
    #[serde(default, alias = "one_year")]
    pub one_year: Option<PerformancePeriod>,
    #[serde(default)]
    pub inception: Option<PerformancePeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(default, alias = "portfolio_id")]
    pub portfolio_id: String,
    #[serde(default, alias = "asset_id")]
    pub asset_id: String,
    #[serde(alias = "transaction_type")]
    pub transaction_type: TransactionType,
    pub symbol: String,
    #[serde(deserialize_with = "flexible_f64")]
    pub quantity: f64,
    #[serde(deserialize_with = "flexible_f64")]
    pub price: f64,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub fees: f64,
    #[serde(default, alias = "total_amount", deserialize_with = "flexible_f64")]
    pub total_amount: f64,
    #[serde(alias = "transaction_date")]
    pub transaction_date: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, alias = "created_at")]
    pub created_at: Option<String>,
}

/// One entry of the recent-activity feed (shape varies by activity kind).
pub type Activity = Value;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePortfolioRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub currency: Currency,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePortfolioRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddAssetRequest {
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAssetRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One entry of `PATCH /portfolios/{id}/assets/bulk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkAssetUpdate {
    pub id: String,
    #[serde(flatten)]
    pub changes: UpdateAssetRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub asset_id: String,
    pub transaction_type: TransactionType,
    pub symbol: String,
    pub quantity: f64,
    pub price: f64,
    #[serde(default)]
    pub fees: f64,
    pub transaction_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Query filter for `GET /transactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub portfolio_id: Option<String>,
    pub asset_id: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TransactionFilter {
    /// Query-string pairs for the set fields, in a stable order.
    #[must_use]
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                query.push((key.to_string(), value));
            }
        };
        push("portfolio_id", self.portfolio_id.clone());
        push("asset_id", self.asset_id.clone());
        push("transaction_type", self.transaction_type.map(|t| t.to_string()));
        push("start_date", self.start_date.clone());
        push("end_date", self.end_date.clone());
        push("page", self.page.map(|p| p.to_string()));
        push("limit", self.limit.map(|l| l.to_string()));
        query
    }
}
