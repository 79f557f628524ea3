//! Test fixture generators

use financeflow_domain::{TokenPair, User};

/// Complete pair with a one hour expiry.
#[must_use]
pub fn token_pair(access: &str, refresh: &str) -> TokenPair {
    TokenPair::from_expires_in(access, refresh, Some(3600))
}

/// Minimal active user profile.
#[must_use]
pub fn sample_user() -> User {
    User {
        id: "user-1".to_string(),
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        avatar_url: None,
        is_active: true,
        is_verified: true,
        preferences: None,
        created_at: Some("2024-01-01T00:00:00Z".to_string()),
        updated_at: None,
        last_login_at: None,
    }
}

/// `AuthResponse` JSON body as the login/register endpoints return it.
#[must_use]
pub fn auth_response_json(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "user": {
            "id": "user-1",
            "email": "ada@example.com",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "isActive": true,
            "isVerified": true
        },
        "tokens": {
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "bearer",
            "expires_in": 3600
        }
    })
}
