//! JWT access tokens issued to local users.

use crate::config::AuthSettings;
use crate::entities::Role;
use crate::errors::{Error, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the token holder
    pub sub: String,
    /// Role at the time the token was issued
    pub role: Role,
    /// Expiry as a unix timestamp
    pub exp: i64,
}

/// Signs a token for `username` valid for the configured number of minutes.
pub fn issue_token(settings: &AuthSettings, username: &str, role: Role) -> Result<String> {
    let exp = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::minutes(
            settings.access_token_expire_minutes,
        ))
        .unwrap_or_else(chrono::Utc::now)
        .timestamp();

    let claims = Claims {
        sub: username.to_string(),
        role,
        exp,
    };
    let key = EncodingKey::from_secret(settings.secret_key.as_bytes());
    encode(&Header::new(settings.algorithm), &claims, &key)
        .map_err(|e| Error::config(format!("Failed to sign access token: {e}")))
}

/// Verifies signature and expiry and returns the claims.
pub fn decode_token(settings: &AuthSettings, token: &str) -> Result<Claims> {
    let key = DecodingKey::from_secret(settings.secret_key.as_bytes());
    decode::<Claims>(token, &key, &Validation::new(settings.algorithm))
        .map(|data| data.claims)
        .map_err(|e| Error::authentication(format!("Invalid access token: {e}")))
}
