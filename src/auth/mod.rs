use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;
use crate::database::models::UserIdentity;

/// Session token payload. `sub` is the OAuth open id of the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_method: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(identity: UserIdentity, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: identity.open_id,
            name: identity.name,
            email: identity.email,
            login_method: identity.login_method,
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            open_id: self.sub.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            login_method: self.login_method.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// Signs a session token for `identity` using the configured secret and expiry
pub fn issue_session_token(security: &SecurityConfig, identity: UserIdentity) -> Result<String, JwtError> {
    let claims = Claims::new(identity, security.jwt_expiry_hours);
    generate_jwt(&security.jwt_secret, &claims)
}

pub fn generate_jwt(secret: &str, claims: &Claims) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verifies signature and expiry and returns the claims
pub fn validate_jwt(secret: &str, token: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(JwtError::InvalidToken("missing subject".to_string()));
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> UserIdentity {
        UserIdentity {
            open_id: "open-123".into(),
            name: Some("Test User".into()),
            email: Some("test@example.com".into()),
            login_method: Some("oauth".into()),
        }
    }

    #[test]
    fn token_round_trips_identity() {
        let security = crate::config::AppConfig::development().security;
        let token = issue_session_token(&security, identity()).unwrap();
        let claims = validate_jwt(&security.jwt_secret, &token).unwrap();
        assert_eq!(claims.identity(), identity());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let security = crate::config::AppConfig::development().security;
        let token = issue_session_token(&security, identity()).unwrap();
        assert!(matches!(validate_jwt("another-secret", &token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut claims = Claims::new(identity(), 1);
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = generate_jwt("s3cret", &claims).unwrap();
        assert!(matches!(validate_jwt("s3cret", &token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_refuses_to_sign() {
        let claims = Claims::new(identity(), 1);
        assert!(matches!(generate_jwt("", &claims), Err(JwtError::InvalidSecret)));
    }
}
