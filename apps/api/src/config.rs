use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Constructed once in `main` and handed to `AppState`; no global singleton.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: validate_secret(require_env("JWT_SECRET")?)?,
            token_ttl_minutes: std::env::var("ACCESS_TOKEN_TTL_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<i64>()
                .context("ACCESS_TOKEN_TTL_MINUTES must be a whole number of minutes")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// JWTs are only as strong as their signing secret.
fn validate_secret(secret: String) -> Result<String> {
    if secret.len() < 32 {
        anyhow::bail!("JWT_SECRET must be at least 32 characters");
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_secret_rejected() {
        assert!(validate_secret("too-short".to_string()).is_err());
    }

    #[test]
    fn test_long_secret_accepted() {
        let secret = "0123456789abcdef0123456789abcdef".to_string();
        assert_eq!(validate_secret(secret.clone()).unwrap(), secret);
    }
}
