//! Report generation models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /reports/generate`.
///
/// `options` are merged into the top level of the body next to `type` and
/// `portfolioId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "portfolioId")]
    pub portfolio_id: String,
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

impl ReportRequest {
    /// Request a `kind` report (for example `performance`) without options.
    #[must_use]
    pub fn new(kind: impl Into<String>, portfolio_id: impl Into<String>) -> Self {
        Self { kind: kind.into(), portfolio_id: portfolio_id.into(), options: Map::new() }
    }

    /// Add one generator option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Server-side progress of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportState {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl ReportState {
    /// `true` once the report will not change again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A queued or finished report as returned by `generate` and `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportJob {
    #[serde(alias = "reportId", alias = "report_id")]
    pub id: String,
    #[serde(default = "pending")]
    pub status: ReportState,
    #[serde(default, alias = "download_url")]
    pub download_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

fn pending() -> ReportState {
    ReportState::Pending
}
