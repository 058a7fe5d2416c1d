use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{AuthAdmin, JwtKeys};
use crate::auth::store;
use crate::errors::AppError;
use crate::models::admin::AdminRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let admin = store::authenticate_admin(&state.db, &req.username, &req.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    store::touch_last_login(&state.db, admin.id).await?;
    let access_token = JwtKeys::from_config(&state.config).sign(&admin)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(AuthAdmin(admin): AuthAdmin) -> Json<AdminRow> {
    Json(admin)
}

/// GET /api/v1/auth/admins
pub async fn handle_list_admins(
    State(state): State<AppState>,
    AuthAdmin(_admin): AuthAdmin,
) -> Result<Json<Vec<AdminRow>>, AppError> {
    Ok(Json(store::list_admins(&state.db).await?))
}

/// POST /api/v1/auth/admins
pub async fn handle_create_admin(
    State(state): State<AppState>,
    AuthAdmin(admin): AuthAdmin,
    Json(req): Json<store::AdminCreate>,
) -> Result<(StatusCode, Json<AdminRow>), AppError> {
    if !admin.is_super_admin {
        return Err(AppError::Forbidden(
            "Only super admins can create admin accounts".into(),
        ));
    }
    let created = store::create_admin(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
