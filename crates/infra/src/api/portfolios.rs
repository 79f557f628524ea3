use std::collections::BTreeMap;

use financeflow_domain::{
    Activity, AddAssetRequest, ApiError, Asset, AssetAllocation, BulkAssetUpdate,
    CreatePortfolioRequest, PerformanceData, Portfolio, UpdateAssetRequest, UpdatePortfolioRequest,
};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use super::segment;
use crate::http::HttpClient;

/// Optional sections embedded in portfolio responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortfolioInclude {
    pub assets: bool,
    pub performance: bool,
    pub analytics: bool,
}

impl PortfolioInclude {
    fn to_query(self, with_analytics: bool) -> Vec<(String, String)> {
        let mut query = vec![
            ("include_assets".to_string(), self.assets.to_string()),
            ("include_performance".to_string(), self.performance.to_string()),
        ];
        if with_analytics {
            query.push(("include_analytics".to_string(), self.analytics.to_string()));
        }
        query
    }
}

/// `/portfolios` and `/portfolios/{id}/assets`.
#[derive(Debug, Clone)]
pub struct PortfolioApi {
    client: HttpClient,
}

impl PortfolioApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// # Errors
    /// Any client error.
    #[instrument(skip(self))]
    pub async fn list(&self, include: PortfolioInclude) -> Result<Vec<Portfolio>, ApiError> {
        let portfolios: Vec<Portfolio> =
            self.client.get_with_query("/portfolios", include.to_query(false)).await?;
        debug!(count = portfolios.len(), "Portfolios listed");
        Ok(portfolios)
    }

    /// # Errors
    /// `ApiError::Client` with status 404 for an unknown id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str, include: PortfolioInclude) -> Result<Portfolio, ApiError> {
        let path = format!("/portfolios/{}", segment(id));
        self.client.get_with_query(&path, include.to_query(true)).await
    }

    /// # Errors
    /// Any client error.
    pub async fn create(&self, request: &CreatePortfolioRequest) -> Result<Portfolio, ApiError> {
        let portfolio: Portfolio = self.client.post("/portfolios", request).await?;
        debug!(portfolio_id = %portfolio.id, "Portfolio created");
        Ok(portfolio)
    }

    /// # Errors
    /// Any client error.
    pub async fn update(
        &self,
        id: &str,
        request: &UpdatePortfolioRequest,
    ) -> Result<Portfolio, ApiError> {
        self.client.patch(&format!("/portfolios/{}", segment(id)), request).await
    }

    /// # Errors
    /// Any client error.
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete::<Value>(&format!("/portfolios/{}", segment(id))).await.map(drop)
    }

    /// # Errors
    /// Any client error.
    pub async fn allocation(&self, id: &str) -> Result<Vec<AssetAllocation>, ApiError> {
        self.client.get(&format!("/portfolios/{}/allocation", segment(id))).await
    }

    /// # Errors
    /// Any client error.
    pub async fn performance(&self, id: &str) -> Result<PerformanceData, ApiError> {
        self.client.get(&format!("/portfolios/{}/performance", segment(id))).await
    }

    /// Risk and return analytics for `period` (for example `1y`), passed
    /// through undecoded.
    ///
    /// # Errors
    /// Any client error.
    pub async fn analytics(&self, id: &str, period: Option<&str>) -> Result<Value, ApiError> {
        let query = period.map(|p| vec![("period".to_string(), p.to_string())]).unwrap_or_default();
        self.client.get_with_query(&format!("/portfolios/{}/analytics", segment(id)), query).await
    }

    /// Ask the server to rebalance towards `target` (percentage per asset
    /// class or symbol), or towards the stored targets when `None`.
    ///
    /// # Errors
    /// Any client error.
    #[instrument(skip(self, target))]
    pub async fn rebalance(
        &self,
        id: &str,
        target: Option<&BTreeMap<String, f64>>,
    ) -> Result<Value, ApiError> {
        let path = format!("/portfolios/{}/rebalance", segment(id));
        let plan = self.client.post(&path, &json!({ "targetAllocation": target })).await?;
        debug!(portfolio_id = id, "Rebalance requested");
        Ok(plan)
    }

    /// Latest activity across the user's portfolios. The server caps `limit`
    /// at 50.
    ///
    /// # Errors
    /// Any client error.
    pub async fn recent_activities(&self, limit: Option<u32>) -> Result<Vec<Activity>, ApiError> {
        let query = limit.map(|l| vec![("limit".to_string(), l.to_string())]).unwrap_or_default();
        self.client.get_with_query("/portfolios/recent-activities", query).await
    }

    /* ---------------------------------------------------------------------- */
    /* Assets                                                                 */
    /* ---------------------------------------------------------------------- */

    /// # Errors
    /// Any client error.
    pub async fn assets(&self, portfolio_id: &str) -> Result<Vec<Asset>, ApiError> {
        self.client.get(&format!("/portfolios/{}/assets", segment(portfolio_id))).await
    }

    /// # Errors
    /// `ApiError::Client` with status 404 for an unknown asset.
    pub async fn asset(&self, portfolio_id: &str, asset_id: &str) -> Result<Asset, ApiError> {
        let path = format!("/portfolios/{}/assets/{}", segment(portfolio_id), segment(asset_id));
        self.client.get(&path).await
    }

    /// # Errors
    /// Any client error.
    pub async fn add_asset(
        &self,
        portfolio_id: &str,
        request: &AddAssetRequest,
    ) -> Result<Asset, ApiError> {
        let path = format!("/portfolios/{}/assets", segment(portfolio_id));
        let asset: Asset = self.client.post(&path, request).await?;
        debug!(portfolio_id, symbol = %asset.symbol, "Asset added");
        Ok(asset)
    }

    /// # Errors
    /// Any client error.
    pub async fn update_asset(
        &self,
        portfolio_id: &str,
        asset_id: &str,
        request: &UpdateAssetRequest,
    ) -> Result<Asset, ApiError> {
        let path = format!("/portfolios/{}/assets/{}", segment(portfolio_id), segment(asset_id));
        self.client.patch(&path, request).await
    }

    /// Apply several asset updates in one request. The result is passed
    /// through undecoded.
    ///
    /// # Errors
    /// Any client error.
    pub async fn bulk_update_assets(
        &self,
        portfolio_id: &str,
        updates: &[BulkAssetUpdate],
    ) -> Result<Value, ApiError> {
        let path = format!("/portfolios/{}/assets/bulk", segment(portfolio_id));
        let result = self.client.patch(&path, &json!({ "updates": updates })).await?;
        debug!(portfolio_id, count = updates.len(), "Bulk asset update applied");
        Ok(result)
    }

    /// # Errors
    /// Any client error.
    pub async fn remove_asset(&self, portfolio_id: &str, asset_id: &str) -> Result<(), ApiError> {
        let path = format!("/portfolios/{}/assets/{}", segment(portfolio_id), segment(asset_id));
        self.client.delete::<Value>(&path).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_flags_become_query_pairs() {
        let include = PortfolioInclude { assets: true, ..PortfolioInclude::default() };
        assert_eq!(
            include.to_query(false),
            vec![
                ("include_assets".to_string(), "true".to_string()),
                ("include_performance".to_string(), "false".to_string()),
            ]
        );
        assert_eq!(include.to_query(true).len(), 3);
    }
}
