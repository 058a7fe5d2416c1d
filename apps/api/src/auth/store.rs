use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::errors::{is_unique_violation, AppError};
use crate::models::admin::AdminRow;

#[derive(Debug, Deserialize)]
pub struct AdminCreate {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub is_super_admin: bool,
}

pub async fn get_admin_by_id(pool: &PgPool, admin_id: Uuid) -> Result<Option<AdminRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE id = $1")
        .bind(admin_id)
        .fetch_optional(pool)
        .await
}

pub async fn get_admin_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<AdminRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminRow>("SELECT * FROM admins WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub async fn list_admins(pool: &PgPool) -> Result<Vec<AdminRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminRow>("SELECT * FROM admins ORDER BY created_at ASC, id ASC")
        .fetch_all(pool)
        .await
}

/// Creates an admin account. Duplicate username or email surfaces as a
/// conflict rather than a generic database failure.
pub async fn create_admin(pool: &PgPool, input: AdminCreate) -> Result<AdminRow, AppError> {
    let username = input.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::Validation("Username cannot be empty.".into()));
    }
    if input.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters.".into(),
        ));
    }

    let hashed = hash_password(&input.password)?;
    let row = sqlx::query_as::<_, AdminRow>(
        r#"
        INSERT INTO admins (id, username, email, hashed_password, is_super_admin)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&username)
    .bind(input.email.trim())
    .bind(&hashed)
    .bind(input.is_super_admin)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("An admin with this username or email already exists.".into())
        } else {
            AppError::Database(e)
        }
    })?;

    info!("Created admin account {}", row.username);
    Ok(row)
}

/// Verifies credentials and returns the admin when they match an active
/// account. Invalid username, wrong password, and inactive account are all
/// `None`; the caller reports a single uniform failure.
pub async fn authenticate_admin(
    pool: &PgPool,
    username: &str,
    password: &str,
) -> Result<Option<AdminRow>, AppError> {
    let Some(admin) = get_admin_by_username(pool, username).await? else {
        return Ok(None);
    };
    if !verify_password(password, &admin.hashed_password)? {
        return Ok(None);
    }
    if !admin.is_active {
        return Ok(None);
    }
    Ok(Some(admin))
}

pub async fn touch_last_login(pool: &PgPool, admin_id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE admins SET last_login_at = now(), updated_at = now() WHERE id = $1")
        .bind(admin_id)
        .execute(pool)
        .await?;
    Ok(())
}
