//! Application constants
//!
//! Centralized location for the domain-level constants shared by the client
//! crates.

// Persisted key-value storage keys (all values are plain strings)
pub const STORAGE_KEY_ACCESS_TOKEN: &str = "accessToken";
pub const STORAGE_KEY_REFRESH_TOKEN: &str = "refreshToken";
pub const STORAGE_KEY_USER: &str = "user";
pub const STORAGE_KEY_THEME: &str = "theme";
pub const STORAGE_KEY_SIDEBAR_COLLAPSED: &str = "sidebarCollapsed";

// HTTP defaults
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = 1_000;

// Tracing headers stamped on every outbound request
pub const HEADER_REQUEST_TIME: &str = "X-Request-Time";
pub const HEADER_REQUEST_ID: &str = "X-Request-ID";

// Auth endpoints (relative to the API base URL)
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGIN_PATH: &str = "/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";

// Proactive refresh lead time and idle recheck interval
pub const DEFAULT_REFRESH_THRESHOLD_SECS: u64 = 300;
pub const DEFAULT_REFRESH_RECHECK_SECS: u64 = 60;

// Market data
pub const DEFAULT_NEWS_LIMIT: u32 = 20;

// Realtime defaults
pub const DEFAULT_WS_URL: &str = "ws://localhost:8000/ws";
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_WS_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const WS_TOKEN_QUERY_PARAM: &str = "token";

// Keychain
pub const DEFAULT_KEYCHAIN_SERVICE: &str = "FinanceFlow";
