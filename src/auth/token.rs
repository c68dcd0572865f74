use crate::config::AuthSettings;
use crate::error::AppError;
use crate::models::user::{UserRole, UserView};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims encoded within an access token: the identity (subject id, email,
/// role) plus issue and expiry timestamps.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Generates a signed token for the given user.
///
/// Expiry is `token_ttl_days` from now (7 days by default). The signing
/// secret comes from [`AuthSettings`]; nothing is read from the environment
/// here.
pub fn generate_token(user: &UserView, auth: &AuthSettings) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let expiration = now
        .checked_add_signed(chrono::Duration::days(auth.token_ttl_days))
        .ok_or_else(|| AppError::InternalServerError("Token expiry overflow".into()))?;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a token string and decodes its claims.
///
/// Returns `Unauthorized("Token expired")` past expiry and
/// `Unauthorized("Invalid token")` for a bad signature or malformed token
/// (see the `From<jsonwebtoken::errors::Error>` impl on `AppError`).
pub fn verify_token(token: &str, auth: &AuthSettings) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(auth.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
