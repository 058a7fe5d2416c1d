use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::jwt::AuthAdmin;
use crate::consultants::store;
use crate::consultants::store::{ConsultantCreate, ConsultantUpdate};
use crate::errors::AppError;
use crate::links::handlers::require_link;
use crate::models::consultant::ConsultantRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl PageQuery {
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 500), self.skip.max(0))
    }
}

/// POST /api/v1/consultants
pub async fn handle_create_consultant(
    State(state): State<AppState>,
    AuthAdmin(admin): AuthAdmin,
    Json(req): Json<ConsultantCreate>,
) -> Result<(StatusCode, Json<ConsultantRow>), AppError> {
    let consultant = store::create_consultant(&state.db, req, admin.id).await?;
    Ok((StatusCode::CREATED, Json(consultant)))
}

/// GET /api/v1/consultants
pub async fn handle_list_consultants(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ConsultantRow>>, AppError> {
    let (limit, offset) = page.clamped();
    Ok(Json(store::list_consultants(&state.db, limit, offset).await?))
}

/// GET /api/v1/consultants/:consultant_id
pub async fn handle_get_consultant(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(consultant_id): Path<Uuid>,
) -> Result<Json<ConsultantRow>, AppError> {
    let consultant = store::get_consultant(&state.db, consultant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Consultant not found".into()))?;
    Ok(Json(consultant))
}

/// PUT /api/v1/consultants/:consultant_id
pub async fn handle_update_consultant(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(consultant_id): Path<Uuid>,
    Json(req): Json<ConsultantUpdate>,
) -> Result<Json<ConsultantRow>, AppError> {
    let consultant = store::update_consultant(&state.db, consultant_id, req)
        .await?
        .ok_or_else(|| AppError::NotFound("Consultant not found".into()))?;
    Ok(Json(consultant))
}

/// DELETE /api/v1/consultants/:consultant_id
pub async fn handle_delete_consultant(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(consultant_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !store::delete_consultant(&state.db, consultant_id).await? {
        return Err(AppError::NotFound("Consultant not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/consultants/edit/:token
pub async fn handle_get_consultant_via_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ConsultantRow>, AppError> {
    let link = require_link(&state, &token).await?;
    let consultant = store::get_consultant(&state.db, link.consultant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Consultant not found".into()))?;
    Ok(Json(consultant))
}

/// PUT /api/v1/consultants/edit/:token
pub async fn handle_update_consultant_via_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ConsultantUpdate>,
) -> Result<Json<ConsultantRow>, AppError> {
    let link = require_link(&state, &token).await?;
    let consultant = store::update_consultant(&state.db, link.consultant_id, req)
        .await?
        .ok_or_else(|| AppError::NotFound("Consultant not found".into()))?;
    Ok(Json(consultant))
}
