use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::jwt::AuthAdmin;
use crate::errors::AppError;
use crate::links::issuer;
use crate::models::access_link::AccessLinkRow;
use crate::state::AppState;

fn default_validity_hours() -> i64 {
    72
}

#[derive(Debug, Deserialize)]
pub struct AccessLinkCreate {
    pub consultant_id: Uuid,
    #[serde(default = "default_validity_hours")]
    pub validity_hours: i64,
}

/// Resolves a token from an anonymous edit route into its access link, or
/// refuses with a 403 that does not reveal whether the token ever existed.
pub async fn require_link(state: &AppState, token: &str) -> Result<AccessLinkRow, AppError> {
    issuer::validate_link(&state.db, token)
        .await?
        .ok_or_else(|| AppError::Forbidden("Invalid or expired access link".into()))
}

/// POST /api/v1/access-links
pub async fn handle_create_link(
    State(state): State<AppState>,
    AuthAdmin(admin): AuthAdmin,
    Json(req): Json<AccessLinkCreate>,
) -> Result<(StatusCode, Json<AccessLinkRow>), AppError> {
    let link = issuer::issue_link(&state.db, req.consultant_id, admin.id, req.validity_hours).await?;
    Ok((StatusCode::CREATED, Json(link)))
}

/// GET /api/v1/access-links/consultant/:consultant_id
pub async fn handle_list_consultant_links(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(consultant_id): Path<Uuid>,
) -> Result<Json<Vec<AccessLinkRow>>, AppError> {
    let links = issuer::list_consultant_links(&state.db, consultant_id).await?;
    Ok(Json(links))
}

/// GET /api/v1/access-links/validate/:token
pub async fn handle_validate_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<AccessLinkRow>, AppError> {
    let link = require_link(&state, &token).await?;
    Ok(Json(link))
}

/// DELETE /api/v1/access-links/:link_id
pub async fn handle_revoke_link(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(link_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !issuer::revoke_link(&state.db, link_id).await? {
        return Err(AppError::NotFound("Access link not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}
