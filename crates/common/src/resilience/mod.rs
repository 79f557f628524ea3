//! Retry support for transient failures
//!
//! - [`retry`]: generic executor, backoff strategies and stock policies
//! - [`TransientApiErrors`]: the request policy of the API client, which
//!   re-issues only connectivity failures and 5xx responses

pub mod retry;

use financeflow_domain::ApiError;

pub use retry::{
    policies, BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryExecutor, RetryOutcome, RetryPolicy, RetryResult,
};

/// Retry policy over [`ApiError`]: `Network` and `Server` errors retry with
/// the configured backoff, everything else stops immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientApiErrors;

impl RetryPolicy<ApiError> for TransientApiErrors {
    fn should_retry(&self, error: &ApiError, _attempt: u32) -> RetryDecision {
        if error.is_retryable() {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_api_errors_retry() {
        let policy = TransientApiErrors;
        assert_eq!(policy.should_retry(&ApiError::network("reset"), 1), RetryDecision::Retry);
        assert_eq!(
            policy.should_retry(&ApiError::from_response(503, ""), 2),
            RetryDecision::Retry
        );
        assert_eq!(policy.should_retry(&ApiError::from_response(404, ""), 1), RetryDecision::Stop);
        assert_eq!(policy.should_retry(&ApiError::from_response(401, ""), 1), RetryDecision::Stop);
        assert_eq!(
            policy.should_retry(&ApiError::Timeout { timeout_ms: 10_000 }, 1),
            RetryDecision::Stop
        );
    }
}
