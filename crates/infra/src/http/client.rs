use std::future::Future;
use std::sync::Arc;

use financeflow_common::{RetryConfig, RetryError, RetryExecutor, TokenStore, TransientApiErrors};
use financeflow_core::{
    Navigator, NoopNavigator, Notifier, RefreshCoordinator, TokenRefresher, TracingNotifier,
};
use financeflow_domain::{ApiError, AuthSettings, ClientConfig, FinanceFlowError};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use super::envelope::decode_as;
use super::pipeline::{apply_retry, attach_auth, handle_auth_error, stamp_request};
use super::refresher::HttpTokenRefresher;
use super::request::PendingRequest;
use super::transport::Transport;

pub const NETWORK_ERROR_TITLE: &str = "Network Error";
pub const NETWORK_ERROR_MESSAGE: &str = "Please check your internet connection";

/// Authenticated API client.
///
/// Cheap to clone; clones share the token store, the refresh coordinator
/// and the connection pool.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Transport,
    store: Arc<TokenStore>,
    coordinator: Arc<RefreshCoordinator>,
    refresher: Arc<dyn TokenRefresher>,
    retry: RetryExecutor<TransientApiErrors>,
    notifier: Arc<dyn Notifier>,
    auth: AuthSettings,
}

impl HttpClient {
    /// Start building a client over `store`.
    pub fn builder(config: &ClientConfig, store: Arc<TokenStore>) -> HttpClientBuilder {
        HttpClientBuilder {
            config: config.clone(),
            store,
            notifier: None,
            navigator: None,
            refresher: None,
        }
    }

    /// Store the client reads bearer tokens from.
    #[must_use]
    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.inner.store
    }

    /// Single-flight refresh gate shared by every clone of this client.
    #[must_use]
    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.inner.coordinator
    }

    /// Refresh transport used by the coordinator.
    #[must_use]
    pub fn refresher(&self) -> Arc<dyn TokenRefresher> {
        Arc::clone(&self.inner.refresher)
    }

    /// Sink for user-facing failures.
    #[must_use]
    pub fn notifier(&self) -> Arc<dyn Notifier> {
        Arc::clone(&self.inner.notifier)
    }

    /// Proactive refresh settings from the client configuration.
    #[must_use]
    pub fn auth_settings(&self) -> &AuthSettings {
        &self.inner.auth
    }

    /// REST base URL requests are joined onto.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.inner.transport.base_url()
    }

    /// Run `request` through the full pipeline and return the undecoded
    /// payload.
    ///
    /// # Errors
    /// The terminal [`ApiError`] after retry and refresh recovery. A terminal
    /// `Network` error is also reported to the notifier.
    pub async fn request_raw(&self, request: PendingRequest) -> Result<Value, ApiError> {
        let transport = &self.inner.transport;
        self.execute(request, |attempt| async move { transport.send(&attempt).await }).await
    }

    /// Fetch a binary resource (report files) through the same auth, retry
    /// and refresh pipeline as JSON calls.
    ///
    /// # Errors
    /// See [`HttpClient::request_raw`].
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let request = PendingRequest::new(Method::GET, path).with_header("accept", "*/*");
        let transport = &self.inner.transport;
        self.execute(request, |attempt| async move { transport.send_bytes(&attempt).await }).await
    }

    async fn execute<T, F, Fut>(&self, request: PendingRequest, send: F) -> Result<T, ApiError>
    where
        F: Fn(PendingRequest) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let request = attach_auth(stamp_request(request), &self.inner.store.get());
        let method = request.method.clone();
        let path = request.path.clone();

        let result = match apply_retry(&request, &self.inner.retry, &send).await {
            Err(error) if error.is_auth() => {
                match handle_auth_error(request, error, &self.inner.coordinator).await {
                    Ok(replay) => apply_retry(&replay, &self.inner.retry, &send).await,
                    Err(error) => Err(error),
                }
            }
            other => other,
        };

        if let Err(error @ ApiError::Network { .. }) = &result {
            warn!(%method, %path, error = %error, "Request failed without a response");
            self.inner.notifier.show_error(NETWORK_ERROR_TITLE, NETWORK_ERROR_MESSAGE);
        }
        result
    }

    /// Run `request` and decode the payload into `T`.
    ///
    /// # Errors
    /// See [`HttpClient::request_raw`]; additionally `ApiError::Decode` when
    /// the payload does not match `T`.
    pub async fn send<T: DeserializeOwned>(&self, request: PendingRequest) -> Result<T, ApiError> {
        decode_as(self.request_raw(request).await?)
    }

    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(PendingRequest::new(Method::GET, path)).await
    }

    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.send(PendingRequest::new(Method::GET, path).with_query(query)).await
    }

    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(PendingRequest::new(Method::POST, path).with_body(encode(body)?)).await
    }

    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(PendingRequest::new(Method::PUT, path).with_body(encode(body)?)).await
    }

    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(PendingRequest::new(Method::PATCH, path).with_body(encode(body)?)).await
    }

    /// # Errors
    /// See [`HttpClient::send`].
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(PendingRequest::new(Method::DELETE, path)).await
    }
}

/// Serialize a request body.
pub(crate) fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|err| ApiError::Decode {
        message: format!("failed to encode request body: {err}"),
        body: String::new(),
    })
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.transport.base_url())
            .field("retry", self.inner.retry.config())
            .finish_non_exhaustive()
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    config: ClientConfig,
    store: Arc<TokenStore>,
    notifier: Option<Arc<dyn Notifier>>,
    navigator: Option<Arc<dyn Navigator>>,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Replace the HTTP refresh transport.
    #[must_use]
    pub fn refresher(mut self, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refresher = Some(refresher);
        self
    }

    /// # Errors
    /// `FinanceFlowError::Config` when the configuration is invalid.
    pub fn build(self) -> Result<HttpClient, FinanceFlowError> {
        self.config.validate()?;

        let transport = Transport::new(&self.config.api)?;
        let retry_config = RetryConfig::new()
            .max_attempts(self.config.retry.max_attempts)
            .linear_backoff(self.config.retry.base_delay())
            .build()
            .map_err(|err| match err {
                RetryError::InvalidConfiguration { message } => FinanceFlowError::Config(message),
                _ => FinanceFlowError::Config("invalid retry configuration".to_string()),
            })?;
        let retry = RetryExecutor::new(retry_config, TransientApiErrors);

        let refresher = self.refresher.unwrap_or_else(|| {
            Arc::new(HttpTokenRefresher::new(transport.clone(), retry.clone()))
        });
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator));
        let notifier = self.notifier.unwrap_or_else(|| Arc::new(TracingNotifier));

        let coordinator =
            Arc::new(RefreshCoordinator::new(Arc::clone(&self.store), Arc::clone(&refresher), navigator));

        Ok(HttpClient {
            inner: Arc::new(ClientInner {
                transport,
                store: self.store,
                coordinator,
                refresher,
                retry,
                notifier,
                auth: self.config.auth,
            }),
        })
    }
}
