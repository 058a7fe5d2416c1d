use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::jwt::AuthAdmin;
use crate::blocks::store;
use crate::blocks::store::BlockOrder;
use crate::blocks::types::{BlockCreate, BlockUpdate};
use crate::errors::AppError;
use crate::links::handlers::require_link;
use crate::models::block::BlockRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BlockTypeQuery {
    pub block_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockReorderRequest {
    pub block_orders: Vec<BlockOrder>,
}

async fn require_consultant(state: &AppState, consultant_id: Uuid) -> Result<(), AppError> {
    crate::consultants::store::get_consultant(&state.db, consultant_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Consultant not found".into()))
}

/// Admin routes (authenticated)

/// GET /api/v1/blocks/consultant/:consultant_id
pub async fn handle_list_blocks(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(consultant_id): Path<Uuid>,
    Query(query): Query<BlockTypeQuery>,
) -> Result<Json<Vec<BlockRow>>, AppError> {
    let blocks = store::list_blocks(&state.db, consultant_id, query.block_type.as_deref()).await?;
    Ok(Json(blocks))
}

/// POST /api/v1/blocks/consultant/:consultant_id
pub async fn handle_create_block(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(consultant_id): Path<Uuid>,
    Json(req): Json<BlockCreate>,
) -> Result<(StatusCode, Json<BlockRow>), AppError> {
    require_consultant(&state, consultant_id).await?;
    let block = store::create_block(&state.db, consultant_id, req).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// PUT /api/v1/blocks/:block_id
pub async fn handle_update_block(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(block_id): Path<Uuid>,
    Json(req): Json<BlockUpdate>,
) -> Result<Json<BlockRow>, AppError> {
    let block = store::update_block(&state.db, block_id, req)
        .await?
        .ok_or_else(|| AppError::NotFound("Block not found".into()))?;
    Ok(Json(block))
}

/// DELETE /api/v1/blocks/:block_id
pub async fn handle_delete_block(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(block_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !store::delete_block(&state.db, block_id).await? {
        return Err(AppError::NotFound("Block not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/blocks/consultant/:consultant_id/reorder
pub async fn handle_reorder_blocks(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(consultant_id): Path<Uuid>,
    Json(req): Json<BlockReorderRequest>,
) -> Result<StatusCode, AppError> {
    require_consultant(&state, consultant_id).await?;
    store::reorder_blocks(&state.db, consultant_id, &req.block_orders).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Temporary link routes (no auth, token in URL)

/// GET /api/v1/blocks/edit/:token
pub async fn handle_list_blocks_via_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(query): Query<BlockTypeQuery>,
) -> Result<Json<Vec<BlockRow>>, AppError> {
    let link = require_link(&state, &token).await?;
    let blocks =
        store::list_blocks(&state.db, link.consultant_id, query.block_type.as_deref()).await?;
    Ok(Json(blocks))
}

/// POST /api/v1/blocks/edit/:token
pub async fn handle_create_block_via_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<BlockCreate>,
) -> Result<(StatusCode, Json<BlockRow>), AppError> {
    let link = require_link(&state, &token).await?;
    let block = store::create_block(&state.db, link.consultant_id, req).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// Blocks reachable through a link are only those of the linked consultant.
async fn require_owned_block(
    state: &AppState,
    consultant_id: Uuid,
    block_id: Uuid,
) -> Result<(), AppError> {
    match store::get_block(&state.db, block_id).await? {
        Some(block) if block.consultant_id == consultant_id => Ok(()),
        _ => Err(AppError::NotFound("Block not found".into())),
    }
}

/// PUT /api/v1/blocks/edit/:token/:block_id
pub async fn handle_update_block_via_token(
    State(state): State<AppState>,
    Path((token, block_id)): Path<(String, Uuid)>,
    Json(req): Json<BlockUpdate>,
) -> Result<Json<BlockRow>, AppError> {
    let link = require_link(&state, &token).await?;
    require_owned_block(&state, link.consultant_id, block_id).await?;
    let block = store::update_block(&state.db, block_id, req)
        .await?
        .ok_or_else(|| AppError::NotFound("Block not found".into()))?;
    Ok(Json(block))
}

/// DELETE /api/v1/blocks/edit/:token/:block_id
pub async fn handle_delete_block_via_token(
    State(state): State<AppState>,
    Path((token, block_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    let link = require_link(&state, &token).await?;
    require_owned_block(&state, link.consultant_id, block_id).await?;
    store::delete_block(&state.db, block_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/blocks/edit/:token/reorder
pub async fn handle_reorder_blocks_via_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<BlockReorderRequest>,
) -> Result<StatusCode, AppError> {
    let link = require_link(&state, &token).await?;
    store::reorder_blocks(&state.db, link.consultant_id, &req.block_orders).await?;
    Ok(StatusCode::NO_CONTENT)
}
