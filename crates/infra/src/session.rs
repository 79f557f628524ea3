//! Sign-in lifecycle over the token store.
//!
//! [`Session`] is the only component that writes a freshly issued pair and
//! the user profile into the [`TokenStore`]; the refresh coordinator only
//! rotates tokens afterwards. While signed in, a background task rotates the
//! pair ahead of expiry when `auth.auto_refresh` is enabled.

use std::sync::Arc;

use financeflow_common::TokenStore;
use financeflow_core::{AutoRefresh, AutoRefreshConfig, Notifier, OnRefreshFailure};
use financeflow_domain::{
    ApiError, AuthResponse, ClientConfig, FinanceFlowError, LoginRequest, RegisterRequest, User,
};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::api::AuthApi;
use crate::http::HttpClient;

pub const LOGIN_SUCCESS_TITLE: &str = "Welcome back!";
pub const LOGIN_FAILED_TITLE: &str = "Login Failed";
pub const REGISTER_SUCCESS_TITLE: &str = "Account Created!";
pub const REGISTER_FAILED_TITLE: &str = "Registration Failed";
pub const LOGOUT_TITLE: &str = "Logged Out";

/// Authenticated session bound to one [`HttpClient`].
#[derive(Debug, Clone)]
pub struct Session {
    client: HttpClient,
    auth: AuthApi,
    auto_refresh: Arc<Mutex<Option<AutoRefresh>>>,
}

impl Session {
    /// Session over `client`, taking proactive refresh settings from it.
    pub fn new(client: HttpClient) -> Self {
        Self {
            auth: AuthApi::new(client.clone()),
            client,
            auto_refresh: Arc::new(Mutex::new(None)),
        }
    }

    /// Build a session persisting to the OS keychain under
    /// `config.storage.service_name`.
    ///
    /// # Errors
    /// `FinanceFlowError::Config` when the configuration is invalid.
    #[cfg(feature = "platform")]
    pub fn from_config(
        config: &ClientConfig,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn financeflow_core::Navigator>,
    ) -> Result<Self, FinanceFlowError> {
        let storage = Arc::new(financeflow_common::KeychainStore::new(
            config.storage.service_name.clone(),
        ));
        let store = Arc::new(TokenStore::new(storage));
        let client = HttpClient::builder(config, store)
            .notifier(notifier)
            .navigator(navigator)
            .build()?;
        Ok(Self::new(client))
    }

    /// Build a session over an in-memory store.
    ///
    /// # Errors
    /// `FinanceFlowError::Config` when the configuration is invalid.
    pub fn in_memory(config: &ClientConfig) -> Result<Self, FinanceFlowError> {
        let storage = Arc::new(financeflow_common::MemoryStore::new());
        let store = Arc::new(TokenStore::new(storage));
        Ok(Self::new(HttpClient::builder(config, store).build()?))
    }

    /// Client every API group of this session goes through.
    #[must_use]
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Authentication endpoints.
    #[must_use]
    pub fn auth(&self) -> &AuthApi {
        &self.auth
    }

    fn store(&self) -> &Arc<TokenStore> {
        self.client.token_store()
    }

    fn notifier(&self) -> Arc<dyn Notifier> {
        self.client.notifier()
    }

    /// Signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.store().user()
    }

    /// Both a user profile and an access token are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store().user().is_some() && self.store().access_token().is_some()
    }

    /// Whether the background refresh task is running.
    #[must_use]
    pub fn is_auto_refreshing(&self) -> bool {
        self.auto_refresh.lock().as_ref().is_some_and(|task| !task.is_finished())
    }

    fn start_auto_refresh(&self) {
        let settings = self.client.auth_settings();
        if !settings.auto_refresh {
            return;
        }
        let task = AutoRefresh::spawn(
            Arc::clone(self.client.coordinator()),
            AutoRefreshConfig::from(settings),
        );
        if let Some(previous) = self.auto_refresh.lock().replace(task) {
            previous.stop();
        }
    }

    /// Cancel the background refresh task, if any.
    pub fn stop_auto_refresh(&self) {
        if let Some(task) = self.auto_refresh.lock().take() {
            task.stop();
        }
    }

    /// Sign in and persist the issued tokens and profile.
    ///
    /// # Errors
    /// The [`ApiError`] from `/auth/login`, also reported to the notifier.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<User, ApiError> {
        let result = match self.auth.login(credentials).await {
            Ok(response) => self.establish(response),
            Err(err) => Err(err),
        };

        match result {
            Ok(user) => {
                info!(user_id = %user.id, "Signed in");
                self.start_auto_refresh();
                self.notifier().show_success(
                    LOGIN_SUCCESS_TITLE,
                    &format!("Good to see you again, {}", user.first_name),
                );
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Sign-in failed");
                self.notifier().show_error(LOGIN_FAILED_TITLE, &err.user_message());
                Err(err)
            }
        }
    }

    /// Create an account and sign in with it.
    ///
    /// # Errors
    /// The [`ApiError`] from `/auth/register`, also reported to the notifier.
    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(&self, registration: &RegisterRequest) -> Result<User, ApiError> {
        let result = match self.auth.register(registration).await {
            Ok(response) => self.establish(response),
            Err(err) => Err(err),
        };

        match result {
            Ok(user) => {
                info!(user_id = %user.id, "Account created");
                self.start_auto_refresh();
                self.notifier().show_success(
                    REGISTER_SUCCESS_TITLE,
                    &format!("Welcome to FinanceFlow, {}!", user.first_name),
                );
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Registration failed");
                self.notifier().show_error(REGISTER_FAILED_TITLE, &err.user_message());
                Err(err)
            }
        }
    }

    /// Revoke the refresh token server side, then clear local state.
    ///
    /// The server call is best effort: local tokens and profile are cleared
    /// whatever it returns.
    pub async fn logout(&self, notify: bool) {
        self.stop_auto_refresh();
        if let Some(refresh_token) = self.store().get().refresh_token() {
            if let Err(err) = self.auth.logout(refresh_token).await {
                warn!(error = %err, "Logout request failed, clearing local session anyway");
            }
        }

        self.store().clear();
        info!("Signed out");
        if notify {
            self.notifier().show_success(LOGOUT_TITLE, "You have been successfully logged out");
        }
    }

    /// Restore a previous session from storage.
    ///
    /// When both tokens and a profile were restored, the pair is rotated once
    /// through the refresh coordinator, joining any round a concurrent 401
    /// already started. A failed rotation led here keeps the restored
    /// session; the next 401 decides. Returns whether a session is active
    /// afterwards.
    pub async fn initialize(&self) -> bool {
        let store = self.store();
        let pair = store.load();

        if pair.refresh_token().is_none() {
            debug!("No stored session");
            return false;
        }
        if store.user().is_none() {
            debug!("Stored tokens without a profile, staying signed out");
            return false;
        }

        match self.client.coordinator().refresh_now(OnRefreshFailure::KeepSession).await {
            Ok(_) => info!("Restored session and rotated tokens"),
            Err(err) => {
                warn!(error = %err, "Token refresh during restore failed, keeping stored session");
            }
        }

        let active = self.is_authenticated();
        if active {
            self.start_auto_refresh();
        }
        active
    }

    fn establish(&self, response: AuthResponse) -> Result<User, ApiError> {
        let AuthResponse { user, tokens } = response;
        let pair = tokens.into_pair(None).ok_or_else(|| ApiError::Decode {
            message: "auth response carried no refresh token".to_string(),
            body: String::new(),
        })?;

        let store = self.store();
        store.set(pair);
        store.set_user(user.clone());
        Ok(user)
    }
}
