use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::jwt::AuthAdmin;
use crate::consultants::handlers::PageQuery;
use crate::errors::AppError;
use crate::export::format::is_valid_hex_color;
use crate::export::pdf::export_profile_to_pdf;
use crate::models::profile::ProfileRow;
use crate::profiles::store;
use crate::profiles::store::{ProfileContent, ProfileCreate};
use crate::state::AppState;

/// POST /api/v1/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    AuthAdmin(admin): AuthAdmin,
    Json(req): Json<ProfileCreate>,
) -> Result<(StatusCode, Json<ProfileRow>), AppError> {
    let profile = store::create_profile(&state.db, req, admin.id).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ProfileRow>>, AppError> {
    let (limit, offset) = page.clamped();
    Ok(Json(store::list_profiles(&state.db, limit, offset).await?))
}

/// GET /api/v1/profiles/consultant/:consultant_id
pub async fn handle_list_consultant_profiles(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(consultant_id): Path<Uuid>,
) -> Result<Json<Vec<ProfileRow>>, AppError> {
    Ok(Json(
        store::get_consultant_profiles(&state.db, consultant_id).await?,
    ))
}

/// GET /api/v1/profiles/:profile_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<ProfileRow>, AppError> {
    let profile = store::get_profile(&state.db, profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;
    Ok(Json(profile))
}

/// PUT /api/v1/profiles/:profile_id
pub async fn handle_update_profile(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(profile_id): Path<Uuid>,
    Json(req): Json<ProfileContent>,
) -> Result<Json<ProfileRow>, AppError> {
    let profile = store::update_profile(&state.db, profile_id, req)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;
    Ok(Json(profile))
}

/// DELETE /api/v1/profiles/:profile_id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(profile_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !store::delete_profile(&state.db, profile_id).await? {
        return Err(AppError::NotFound("Profile not found".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct DuplicateQuery {
    pub new_profile_name: String,
}

/// POST /api/v1/profiles/:profile_id/duplicate
pub async fn handle_duplicate_profile(
    State(state): State<AppState>,
    AuthAdmin(admin): AuthAdmin,
    Path(profile_id): Path<Uuid>,
    Query(query): Query<DuplicateQuery>,
) -> Result<(StatusCode, Json<ProfileRow>), AppError> {
    let profile = store::duplicate_profile(&state.db, profile_id, &query.new_profile_name, admin.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;
    Ok((StatusCode::CREATED, Json(profile)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportRequest {
    pub company_name: Option<String>,
    pub accent_color: Option<String>,
    pub template: Option<String>,
}

/// POST /api/v1/profiles/:profile_id/export/pdf
pub async fn handle_export_profile_pdf(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
    Path(profile_id): Path<Uuid>,
    Json(req): Json<ExportRequest>,
) -> Result<(HeaderMap, Bytes), AppError> {
    let profile = store::get_profile(&state.db, profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".into()))?;

    if let Some(accent_color) = req.accent_color.as_deref() {
        if !is_valid_hex_color(accent_color) {
            return Err(AppError::Validation(
                "Invalid accent_color. Must be hex format like #0E4B8A".into(),
            ));
        }
    }

    let (pdf_bytes, filename) = match export_profile_to_pdf(
        &profile.profile_data,
        req.company_name.as_deref(),
        req.accent_color.as_deref(),
        req.template.as_deref(),
    ) {
        Ok(result) => result,
        // validation failures (bad template) stay precise; everything else is
        // reported as a generic export failure without internal detail
        Err(AppError::Validation(msg)) => return Err(AppError::Validation(msg)),
        Err(err) => {
            tracing::error!("PDF export failed for profile {profile_id}: {err}");
            return Err(AppError::Export);
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/pdf"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|e| anyhow::anyhow!(e))?,
    );

    Ok((headers, Bytes::from(pdf_bytes)))
}
