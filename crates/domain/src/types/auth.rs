//! Credential and authentication payload types.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::preferences::Theme;

/// Access/refresh token pair with an optional expiry.
///
/// Both tokens are present or both are absent; the constructors make a
/// partial pair unrepresentable. `Debug` never prints token values.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct TokenPair {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl TokenPair {
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
            expires_at,
        }
    }

    /// Build a pair whose expiry is `expires_in` seconds from now.
    ///
    /// An `expires_in` outside the representable time range yields a pair
    /// without a known expiry.
    #[must_use]
    pub fn from_expires_in(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        expires_in: Option<i64>,
    ) -> Self {
        let expires_at = expires_in
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
        Self::new(access_token, refresh_token, expires_at)
    }

    /// The `{null, null, null}` pair.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.access_token.is_none()
    }

    /// `Authorization` header value, when an access token is held.
    #[must_use]
    pub fn bearer(&self) -> Option<String> {
        self.access_token.as_ref().map(|token| format!("Bearer {token}"))
    }

    /// True when the pair expires within `threshold` from now.
    ///
    /// Pairs without a known expiry (restored from storage) never report
    /// expired; the server's 401 decides for those.
    #[must_use]
    pub fn is_expired(&self, threshold: Duration) -> bool {
        self.expires_at.is_some_and(|at| {
            Utc::now().checked_add_signed(threshold).map_or(true, |horizon| horizon >= at)
        })
    }

    /// Time left until the pair is `threshold` away from expiry.
    ///
    /// `None` when no expiry is known; zero when that point has passed.
    #[must_use]
    pub fn refresh_due_in(&self, threshold: std::time::Duration) -> Option<std::time::Duration> {
        let threshold = Duration::from_std(threshold).ok()?;
        let due = self.expires_at?.checked_sub_signed(threshold)?;
        Some((due - Utc::now()).to_std().unwrap_or(std::time::Duration::ZERO))
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Token payload returned by login, register and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken")]
    pub refresh_token: Option<String>,
    #[serde(default, alias = "tokenType")]
    pub token_type: Option<String>,
    #[serde(default, alias = "expiresIn")]
    pub expires_in: Option<i64>,
}

impl TokenResponse {
    /// Locate a token payload inside a refresh response.
    ///
    /// Accepts the flat shape, `{success, data: {...}}`, `{tokens: {...}}`
    /// and `{data: {tokens: {...}}}`. Returns `None` when no candidate
    /// carries a non-empty access token.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Option<Self> {
        let candidates = [
            Some(payload),
            payload.get("data"),
            payload.get("tokens"),
            payload.get("data").and_then(|data| data.get("tokens")),
        ];

        candidates
            .into_iter()
            .flatten()
            .filter(|candidate| candidate.is_object())
            .find_map(|candidate| serde_json::from_value::<Self>(candidate.clone()).ok())
            .filter(|response| !response.access_token.is_empty())
    }

    /// Convert into a [`TokenPair`], keeping `previous_refresh` when the
    /// response does not rotate the refresh token.
    #[must_use]
    pub fn into_pair(self, previous_refresh: Option<&str>) -> Option<TokenPair> {
        let refresh = self
            .refresh_token
            .filter(|token| !token.is_empty())
            .or_else(|| previous_refresh.map(String::from))?;
        Some(TokenPair::from_expires_in(self.access_token, refresh, self.expires_in))
    }
}

/// Body of `POST /auth/refresh`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into(), remember_me: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
    pub accept_terms: bool,
}

/// Login/register response: the profile plus a token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: TokenResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Partial profile update; `None` fields are omitted from the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
}

/// Authenticated user profile.
///
/// Serialized camelCase (the form persisted under the `user` key); the
/// snake_case spelling is accepted on input as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, alias = "first_name")]
    pub first_name: String,
    #[serde(default, alias = "last_name")]
    pub last_name: String,
    #[serde(default, alias = "avatar_url", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default = "default_true", alias = "is_active")]
    pub is_active: bool,
    #[serde(default, alias = "is_verified")]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<UserPreferences>,
    #[serde(default, alias = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, alias = "last_login_at", skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

impl User {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

fn default_true() -> bool {
    true
}

/// Server-side user preferences embedded in the profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default, alias = "preferred_currency", skip_serializing_if = "Option::is_none")]
    pub preferred_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(default, alias = "risk_tolerance", skip_serializing_if = "Option::is_none")]
    pub risk_tolerance: Option<String>,
    #[serde(default, alias = "email_notifications")]
    pub email_notifications: bool,
    #[serde(default, alias = "push_notifications")]
    pub push_notifications: bool,
    #[serde(default, alias = "portfolio_alerts")]
    pub portfolio_alerts: bool,
    #[serde(default, alias = "market_news")]
    pub market_news: bool,
}
