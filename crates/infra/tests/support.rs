use std::sync::Arc;

use financeflow_common::testing::MockKeyValueStore;
use financeflow_common::TokenStore;
use financeflow_core::testing::{RecordingNavigator, RecordingNotifier};
use financeflow_domain::ClientConfig;
use financeflow_infra::HttpClient;
use wiremock::MockServer;

/// API prefix the harness mounts under, so path joining is exercised too.
pub const API_PREFIX: &str = "/api/v1";

/// HTTP client wired to a WireMock server with recording UI sinks.
pub struct HttpHarness {
    pub server: MockServer,
    pub client: HttpClient,
    pub store: Arc<TokenStore>,
    pub storage: Arc<MockKeyValueStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
}

impl HttpHarness {
    /// Harness with fast linear retry (3 attempts, 10ms base).
    pub async fn start() -> Self {
        Self::with_retry(3, 10).await
    }

    pub async fn with_retry(max_attempts: u32, base_delay_ms: u64) -> Self {
        let server = MockServer::start().await;
        let base_url = format!("{}{API_PREFIX}", server.uri());
        Self::build(server, &base_url, max_attempts, base_delay_ms)
    }

    /// Harness whose client points at `base_url` instead of the mock server.
    pub async fn against(base_url: &str) -> Self {
        let server = MockServer::start().await;
        Self::build(server, base_url, 3, 10)
    }

    fn build(server: MockServer, base_url: &str, max_attempts: u32, base_delay_ms: u64) -> Self {
        let mut config = ClientConfig::default();
        config.api.base_url = base_url.to_string();
        config.api.timeout_ms = 2_000;
        config.retry.max_attempts = max_attempts;
        config.retry.base_delay_ms = base_delay_ms;

        let storage = Arc::new(MockKeyValueStore::new());
        let store = Arc::new(TokenStore::new(storage.clone()));
        let notifier = Arc::new(RecordingNotifier::new());
        let navigator = Arc::new(RecordingNavigator::new());

        let client = HttpClient::builder(&config, Arc::clone(&store))
            .notifier(notifier.clone())
            .navigator(navigator.clone())
            .build()
            .expect("client should build");

        Self { server, client, store, storage, notifier, navigator }
    }

    /// Full mock path for an API-relative `path`.
    pub fn path(path: &str) -> String {
        format!("{API_PREFIX}{path}")
    }
}

/// A localhost URL nothing is listening on.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}{API_PREFIX}")
}
