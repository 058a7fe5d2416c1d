use anyhow::anyhow;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::blocks::types::{BlockCreate, BlockUpdate};
use crate::errors::AppError;
use crate::models::block::{BlockRow, BLOCK_TYPES};

/// One entry of a reorder batch.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockOrder {
    pub id: Uuid,
    pub display_order: i32,
}

pub async fn create_block(
    pool: &PgPool,
    consultant_id: Uuid,
    input: BlockCreate,
) -> Result<BlockRow, AppError> {
    let title = input.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("Block title cannot be empty.".into()));
    }

    let data = input.payload.into_data();
    let json = serde_json::to_value(&data).map_err(|e| anyhow!(e))?;

    let row = sqlx::query_as::<_, BlockRow>(
        r#"
        INSERT INTO blocks (id, consultant_id, block_type, title, display_order, data)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(consultant_id)
    .bind(data.block_type_str())
    .bind(&title)
    .bind(input.display_order)
    .bind(&json)
    .fetch_one(pool)
    .await?;

    info!(
        "Created {} block {} for consultant {}",
        row.block_type, row.id, consultant_id
    );
    Ok(row)
}

pub async fn get_block(pool: &PgPool, block_id: Uuid) -> Result<Option<BlockRow>, sqlx::Error> {
    sqlx::query_as::<_, BlockRow>("SELECT * FROM blocks WHERE id = $1")
        .bind(block_id)
        .fetch_optional(pool)
        .await
}

/// Active blocks for a consultant, ordered for display; creation time breaks
/// ties between equal display orders (newest first).
pub async fn list_blocks(
    pool: &PgPool,
    consultant_id: Uuid,
    block_type: Option<&str>,
) -> Result<Vec<BlockRow>, AppError> {
    if let Some(block_type) = block_type {
        if !BLOCK_TYPES.contains(&block_type) {
            return Err(AppError::Validation(format!(
                "Unknown block_type '{block_type}'."
            )));
        }
    }

    let rows = sqlx::query_as::<_, BlockRow>(
        r#"
        SELECT * FROM blocks
        WHERE consultant_id = $1 AND is_active AND ($2::text IS NULL OR block_type = $2)
        ORDER BY display_order ASC, created_at DESC
        "#,
    )
    .bind(consultant_id)
    .bind(block_type)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn update_block(
    pool: &PgPool,
    block_id: Uuid,
    update: BlockUpdate,
) -> Result<Option<BlockRow>, AppError> {
    let mut tx = pool.begin().await?;

    let existing: Option<BlockRow> = sqlx::query_as("SELECT * FROM blocks WHERE id = $1")
        .bind(block_id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(existing) = existing else {
        return Ok(None);
    };

    let mut data = existing
        .decode_data()
        .map_err(|e| anyhow!("stored block {} has malformed data: {e}", existing.id))?;

    if let Some(patch) = update.data {
        if patch.block_type_str() != existing.block_type {
            return Err(AppError::Validation(
                "block_type of an existing block cannot be changed.".into(),
            ));
        }
        patch.apply(&mut data);
    }

    let title = match update.title {
        Some(title) => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(AppError::Validation("Block title cannot be empty.".into()));
            }
            title
        }
        None => existing.title,
    };
    let display_order = update.display_order.unwrap_or(existing.display_order);
    let json = serde_json::to_value(&data).map_err(|e| anyhow!(e))?;

    let row = sqlx::query_as::<_, BlockRow>(
        r#"
        UPDATE blocks
        SET title = $2, display_order = $3, data = $4, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(block_id)
    .bind(&title)
    .bind(display_order)
    .bind(&json)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(row))
}

/// Hard delete. Returns whether a row was removed.
pub async fn delete_block(pool: &PgPool, block_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM blocks WHERE id = $1")
        .bind(block_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Applies a batch of display-order changes in a single statement. Ids that do
/// not belong to the consultant are ignored rather than failing the batch.
pub async fn reorder_blocks(
    pool: &PgPool,
    consultant_id: Uuid,
    orders: &[BlockOrder],
) -> Result<(), sqlx::Error> {
    if orders.is_empty() {
        return Ok(());
    }

    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let positions: Vec<i32> = orders.iter().map(|o| o.display_order).collect();

    sqlx::query(
        r#"
        UPDATE blocks
        SET display_order = t.display_order, updated_at = now()
        FROM (SELECT UNNEST($2::uuid[]) AS id, UNNEST($3::int[]) AS display_order) AS t
        WHERE blocks.id = t.id AND blocks.consultant_id = $1
        "#,
    )
    .bind(consultant_id)
    .bind(&ids)
    .bind(&positions)
    .execute(pool)
    .await?;

    Ok(())
}
