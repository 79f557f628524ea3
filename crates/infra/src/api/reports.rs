//! Report generation and download endpoints.

use financeflow_domain::{ApiError, ReportJob, ReportRequest};
use tracing::{debug, instrument};

use super::segment;
use crate::http::HttpClient;

/// `/reports`: queue, poll and fetch generated reports.
#[derive(Debug, Clone)]
pub struct ReportApi {
    client: HttpClient,
}

impl ReportApi {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Queue a report for a portfolio.
    ///
    /// # Errors
    /// Any client error.
    #[instrument(skip(self, request), fields(kind = %request.kind, portfolio_id = %request.portfolio_id))]
    pub async fn generate(&self, request: &ReportRequest) -> Result<ReportJob, ApiError> {
        let job: ReportJob = self.client.post("/reports/generate", request).await?;
        debug!(report_id = %job.id, status = ?job.status, "Report queued");
        Ok(job)
    }

    /// # Errors
    /// `ApiError::Client` with status 404 for an unknown id.
    pub async fn status(&self, report_id: &str) -> Result<ReportJob, ApiError> {
        self.client.get(&format!("/reports/{}/status", segment(report_id))).await
    }

    /// Raw bytes of a finished report. Writing them anywhere is up to the
    /// caller.
    ///
    /// # Errors
    /// Any client error; a report that is not ready yet surfaces as the
    /// server's client error.
    #[instrument(skip(self))]
    pub async fn download(&self, report_id: &str) -> Result<Vec<u8>, ApiError> {
        let bytes = self.client.download(&Self::download_path(report_id)).await?;
        debug!(report_id, size = bytes.len(), "Report downloaded");
        Ok(bytes)
    }

    fn download_path(report_id: &str) -> String {
        format!("/reports/{}/download", segment(report_id))
    }
}
