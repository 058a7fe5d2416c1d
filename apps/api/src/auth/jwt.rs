use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::store;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::admin::AdminRow;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

/// HS256 signing/verification keys derived from the configured secret.
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(config: &Config) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl: Duration::minutes(config.token_ttl_minutes),
        }
    }

    pub fn sign(&self, admin: &AdminRow) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: admin.id,
            username: admin.username.clone(),
            iat: now.timestamp() as usize,
            exp: (now + self.ttl).timestamp() as usize,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

/// Extracts the authenticated admin from the bearer token.
pub struct AuthAdmin(pub AdminRow);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::Unauthorized)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AppError::Unauthorized)?;

        let keys = JwtKeys::from_config(&state.config);
        let claims = keys.verify(token).map_err(|_| AppError::Unauthorized)?;

        let admin = store::get_admin_by_id(&state.db, claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !admin.is_active {
            return Err(AppError::Forbidden("Inactive admin".into()));
        }

        Ok(AuthAdmin(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(secret: &str, ttl_minutes: i64) -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            jwt_secret: secret.to_string(),
            token_ttl_minutes: ttl_minutes,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    fn test_admin() -> AdminRow {
        AdminRow {
            id: Uuid::new_v4(),
            username: "ops".to_string(),
            email: "ops@example.com".to_string(),
            hashed_password: "hash".to_string(),
            is_active: true,
            is_super_admin: false,
            last_login_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let keys = JwtKeys::from_config(&test_config("0123456789abcdef0123456789abcdef", 30));
        let admin = test_admin();
        let token = keys.sign(&admin).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, admin.id);
        assert_eq!(claims.username, "ops");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let keys = JwtKeys::from_config(&test_config("0123456789abcdef0123456789abcdef", 30));
        let other = JwtKeys::from_config(&test_config("fedcba9876543210fedcba9876543210", 30));
        let token = keys.sign(&test_admin()).expect("sign");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = JwtKeys::from_config(&test_config("0123456789abcdef0123456789abcdef", -10));
        let token = keys.sign(&test_admin()).expect("sign");
        assert!(keys.verify(&token).is_err());
    }
}
