use std::collections::HashMap;

use anyhow::anyhow;
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::block::BlockRow;
use crate::models::consultant::ConsultantRow;
use crate::models::profile::ProfileRow;
use crate::profiles::assembler::{assemble_snapshot, dedup_block_ids};
use crate::profiles::customization::GeneralOverrides;

/// Shared profile content payload for create and update operations.
#[derive(Debug, Deserialize)]
pub struct ProfileContent {
    pub profile_name: String,
    pub selected_block_ids: Vec<Uuid>,
    #[serde(default)]
    pub customizations: HashMap<Uuid, Value>,
    #[serde(default)]
    pub general_customizations: GeneralOverrides,
}

#[derive(Debug, Deserialize)]
pub struct ProfileCreate {
    pub consultant_id: Uuid,
    #[serde(flatten)]
    pub content: ProfileContent,
}

fn normalized_profile_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Profile name cannot be empty.".into()));
    }
    Ok(trimmed.to_string())
}

fn validate_selection(selected_block_ids: &[Uuid]) -> Result<(), AppError> {
    if selected_block_ids.is_empty() {
        return Err(AppError::Validation(
            "selected_block_ids cannot be empty.".into(),
        ));
    }
    Ok(())
}

/// Assembles and persists a new profile snapshot. All validation happens
/// before the insert; any failure rolls the transaction back untouched.
pub async fn create_profile(
    pool: &PgPool,
    input: ProfileCreate,
    admin_id: Uuid,
) -> Result<ProfileRow, AppError> {
    let profile_name = normalized_profile_name(&input.content.profile_name)?;
    validate_selection(&input.content.selected_block_ids)?;

    let mut tx = pool.begin().await?;

    let consultant: Option<ConsultantRow> =
        sqlx::query_as("SELECT * FROM consultants WHERE id = $1")
            .bind(input.consultant_id)
            .fetch_optional(&mut *tx)
            .await?;
    let consultant = consultant.ok_or_else(|| AppError::NotFound("Consultant not found.".into()))?;

    let selected = dedup_block_ids(&input.content.selected_block_ids);
    let blocks: Vec<BlockRow> =
        sqlx::query_as("SELECT * FROM blocks WHERE consultant_id = $1 AND id = ANY($2)")
            .bind(consultant.id)
            .bind(&selected)
            .fetch_all(&mut *tx)
            .await?;

    let assembled = assemble_snapshot(
        &consultant,
        &blocks,
        &selected,
        &input.content.customizations,
        input.content.general_customizations,
        Utc::now(),
    )?;
    let profile_data = serde_json::to_string(&assembled.document).map_err(|e| anyhow!(e))?;

    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles (id, consultant_id, profile_name, selected_block_ids, profile_data, created_by_admin_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(consultant.id)
    .bind(&profile_name)
    .bind(&assembled.selected_block_ids)
    .bind(&profile_data)
    .bind(admin_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Created profile {} for consultant {}", row.id, consultant.id);
    Ok(row)
}

/// Rebuilds the snapshot from current live data and overwrites the stored
/// blob wholesale. Returns `None` when the profile does not exist.
pub async fn update_profile(
    pool: &PgPool,
    profile_id: Uuid,
    content: ProfileContent,
) -> Result<Option<ProfileRow>, AppError> {
    let profile_name = normalized_profile_name(&content.profile_name)?;
    validate_selection(&content.selected_block_ids)?;

    let mut tx = pool.begin().await?;

    let existing: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    let consultant: Option<ConsultantRow> =
        sqlx::query_as("SELECT * FROM consultants WHERE id = $1")
            .bind(existing.consultant_id)
            .fetch_optional(&mut *tx)
            .await?;
    let consultant = consultant.ok_or_else(|| AppError::NotFound("Consultant not found.".into()))?;

    let selected = dedup_block_ids(&content.selected_block_ids);
    let blocks: Vec<BlockRow> =
        sqlx::query_as("SELECT * FROM blocks WHERE consultant_id = $1 AND id = ANY($2)")
            .bind(consultant.id)
            .bind(&selected)
            .fetch_all(&mut *tx)
            .await?;

    let assembled = assemble_snapshot(
        &consultant,
        &blocks,
        &selected,
        &content.customizations,
        content.general_customizations,
        Utc::now(),
    )?;
    let profile_data = serde_json::to_string(&assembled.document).map_err(|e| anyhow!(e))?;

    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        UPDATE profiles
        SET profile_name = $2, selected_block_ids = $3, profile_data = $4, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(profile_id)
    .bind(&profile_name)
    .bind(&assembled.selected_block_ids)
    .bind(&profile_data)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Rebuilt snapshot for profile {profile_id}");
    Ok(Some(row))
}

/// Copies the stored snapshot blob and selection verbatim under a new name,
/// no recomputation, so the duplicate reflects the source as persisted, not
/// current live data.
pub async fn duplicate_profile(
    pool: &PgPool,
    profile_id: Uuid,
    new_profile_name: &str,
    admin_id: Uuid,
) -> Result<Option<ProfileRow>, AppError> {
    let profile_name = normalized_profile_name(new_profile_name)?;

    let mut tx = pool.begin().await?;

    let original: Option<ProfileRow> = sqlx::query_as("SELECT * FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(original) = original else {
        return Ok(None);
    };

    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        INSERT INTO profiles (id, consultant_id, profile_name, selected_block_ids, profile_data, created_by_admin_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(original.consultant_id)
    .bind(&profile_name)
    .bind(&original.selected_block_ids)
    .bind(&original.profile_data)
    .bind(admin_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    info!("Duplicated profile {profile_id} as {}", row.id);
    Ok(Some(row))
}

pub async fn get_profile(pool: &PgPool, profile_id: Uuid) -> Result<Option<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(profile_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_profiles(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        "SELECT * FROM profiles ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn get_consultant_profiles(
    pool: &PgPool,
    consultant_id: Uuid,
) -> Result<Vec<ProfileRow>, sqlx::Error> {
    sqlx::query_as::<_, ProfileRow>(
        "SELECT * FROM profiles WHERE consultant_id = $1 ORDER BY created_at DESC",
    )
    .bind(consultant_id)
    .fetch_all(pool)
    .await
}

/// Hard delete. Returns whether a row was removed.
pub async fn delete_profile(pool: &PgPool, profile_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
        .bind(profile_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_name_trimmed() {
        assert_eq!(normalized_profile_name("  Client XYZ  ").unwrap(), "Client XYZ");
    }

    #[test]
    fn test_blank_profile_name_rejected() {
        assert!(matches!(
            normalized_profile_name("   "),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_selection_rejected() {
        assert!(matches!(
            validate_selection(&[]),
            Err(AppError::Validation(_))
        ));
    }
}
