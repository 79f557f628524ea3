//! Credential and profile endpoints.
//!
//! Login and register carry no bearer token semantics of their own: a 401
//! from them means bad credentials and is returned as-is rather than routed
//! through the refresh coordinator.

use financeflow_domain::constants::{LOGIN_PATH, LOGOUT_PATH};
use financeflow_domain::{
    ApiError, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    RegisterRequest, ResetPasswordRequest, UpdateProfileRequest, User,
};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, instrument};

use crate::http::client::encode;
use crate::http::{decode_as, HttpClient, PendingRequest};

pub const REGISTER_PATH: &str = "/auth/register";
pub const PROFILE_PATH: &str = "/auth/profile";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
pub const CHANGE_PASSWORD_PATH: &str = "/auth/change-password";

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: HttpClient,
}

impl AuthApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a user and a token pair.
    ///
    /// Does not touch the token store; see [`Session`](crate::session::Session).
    ///
    /// # Errors
    /// `ApiError::Auth` for rejected credentials, otherwise any client error.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ApiError> {
        let request = PendingRequest::new(Method::POST, LOGIN_PATH)
            .with_body(encode(credentials)?)
            .without_auth_recovery();
        decode_as(self.client.request_raw(request).await?)
    }

    /// # Errors
    /// `ApiError::Validation` for rejected fields, otherwise any client error.
    #[instrument(skip_all, fields(email = %registration.email))]
    pub async fn register(&self, registration: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        let request = PendingRequest::new(Method::POST, REGISTER_PATH)
            .with_body(encode(registration)?)
            .without_auth_recovery();
        decode_as(self.client.request_raw(request).await?)
    }

    /// Revoke `refresh_token` server side.
    ///
    /// # Errors
    /// Any client error.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let request = PendingRequest::new(Method::POST, LOGOUT_PATH)
            .with_body(json!({ "refreshToken": refresh_token }));
        self.client.request_raw(request).await?;
        debug!("Server session revoked");
        Ok(())
    }

    /// Profile of the authenticated user.
    ///
    /// # Errors
    /// Any client error.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.get(PROFILE_PATH).await
    }

    /// # Errors
    /// Any client error.
    pub async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), ApiError> {
        let request = PendingRequest::new(Method::POST, FORGOT_PASSWORD_PATH)
            .with_body(encode(request)?)
            .without_auth_recovery();
        self.client.request_raw(request).await.map(drop)
    }

    /// # Errors
    /// Any client error.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), ApiError> {
        let request = PendingRequest::new(Method::POST, RESET_PASSWORD_PATH)
            .with_body(encode(request)?)
            .without_auth_recovery();
        self.client.request_raw(request).await.map(drop)
    }

    /// # Errors
    /// Any client error.
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), ApiError> {
        let request =
            PendingRequest::new(Method::PATCH, CHANGE_PASSWORD_PATH).with_body(encode(request)?);
        self.client.request_raw(request).await.map(drop)
    }

    /// # Errors
    /// Any client error.
    pub async fn update_profile(&self, update: &UpdateProfileRequest) -> Result<User, ApiError> {
        self.client.patch(PROFILE_PATH, update).await
    }
}
