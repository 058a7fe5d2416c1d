//! Time-boxed opaque tokens granting anonymous edit access to one consultant.
//!
//! Revocation force-expires the link instead of deleting it, so every issued
//! link stays visible to the audit listing.

use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::access_link::AccessLinkRow;

pub const MIN_VALIDITY_HOURS: i64 = 1;
pub const MAX_VALIDITY_HOURS: i64 = 168;

/// 43 alphanumeric characters carry just over 256 bits of entropy.
const TOKEN_LEN: usize = 43;

pub fn generate_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub async fn issue_link(
    pool: &PgPool,
    consultant_id: Uuid,
    admin_id: Uuid,
    validity_hours: i64,
) -> Result<AccessLinkRow, AppError> {
    if !(MIN_VALIDITY_HOURS..=MAX_VALIDITY_HOURS).contains(&validity_hours) {
        return Err(AppError::Validation(
            "validity_hours must be between 1 and 168.".into(),
        ));
    }

    let consultant_exists: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM consultants WHERE id = $1")
            .bind(consultant_id)
            .fetch_optional(pool)
            .await?;
    if consultant_exists.is_none() {
        return Err(AppError::NotFound("Consultant not found.".into()));
    }

    let expires_at = Utc::now() + Duration::hours(validity_hours);
    let row = sqlx::query_as::<_, AccessLinkRow>(
        r#"
        INSERT INTO access_links (id, consultant_id, token, expires_at, created_by_admin_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(consultant_id)
    .bind(generate_token())
    .bind(expires_at)
    .bind(admin_id)
    .fetch_one(pool)
    .await?;

    info!(
        "Issued access link {} for consultant {} (valid {}h)",
        row.id, consultant_id, validity_hours
    );
    Ok(row)
}

/// Looks up a token and, when it is still live, stamps the usage markers and
/// returns the link. Unknown and expired tokens are both `None`; callers
/// cannot tell the two apart.
pub async fn validate_link(
    pool: &PgPool,
    token: &str,
) -> Result<Option<AccessLinkRow>, sqlx::Error> {
    let link: Option<AccessLinkRow> =
        sqlx::query_as("SELECT * FROM access_links WHERE token = $1")
            .bind(token)
            .fetch_optional(pool)
            .await?;
    let Some(link) = link else {
        return Ok(None);
    };

    if link.is_expired(Utc::now()) {
        return Ok(None);
    }

    // The used flag is informational, not a single-use gate.
    let link = sqlx::query_as::<_, AccessLinkRow>(
        r#"
        UPDATE access_links
        SET is_used = TRUE, last_accessed_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(link.id)
    .fetch_one(pool)
    .await?;

    Ok(Some(link))
}

/// Force-expires the link now. Returns false when the link does not exist.
pub async fn revoke_link(pool: &PgPool, link_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE access_links SET expires_at = now() WHERE id = $1")
        .bind(link_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_consultant_links(
    pool: &PgPool,
    consultant_id: Uuid,
) -> Result<Vec<AccessLinkRow>, sqlx::Error> {
    sqlx::query_as::<_, AccessLinkRow>(
        "SELECT * FROM access_links WHERE consultant_id = $1 ORDER BY created_at DESC",
    )
    .bind(consultant_id)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length() {
        assert_eq!(generate_token().len(), TOKEN_LEN);
    }

    #[test]
    fn test_token_is_url_safe() {
        let token = generate_token();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
