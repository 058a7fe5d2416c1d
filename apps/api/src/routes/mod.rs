pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::blocks::handlers as blocks;
use crate::consultants::handlers as consultants;
use crate::links::handlers as links;
use crate::profiles::handlers as profiles;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/me", get(auth::handle_me))
        .route(
            "/api/v1/auth/admins",
            get(auth::handle_list_admins).post(auth::handle_create_admin),
        )
        // Consultants
        .route(
            "/api/v1/consultants",
            get(consultants::handle_list_consultants).post(consultants::handle_create_consultant),
        )
        .route(
            "/api/v1/consultants/edit/:token",
            get(consultants::handle_get_consultant_via_token)
                .put(consultants::handle_update_consultant_via_token),
        )
        .route(
            "/api/v1/consultants/:consultant_id",
            get(consultants::handle_get_consultant)
                .put(consultants::handle_update_consultant)
                .delete(consultants::handle_delete_consultant),
        )
        // Blocks: admin surface
        .route(
            "/api/v1/blocks/consultant/:consultant_id",
            get(blocks::handle_list_blocks).post(blocks::handle_create_block),
        )
        .route(
            "/api/v1/blocks/consultant/:consultant_id/reorder",
            post(blocks::handle_reorder_blocks),
        )
        .route(
            "/api/v1/blocks/:block_id",
            put(blocks::handle_update_block).delete(blocks::handle_delete_block),
        )
        // Blocks: anonymous edit surface scoped by access-link token
        .route(
            "/api/v1/blocks/edit/:token",
            get(blocks::handle_list_blocks_via_token).post(blocks::handle_create_block_via_token),
        )
        .route(
            "/api/v1/blocks/edit/:token/reorder",
            post(blocks::handle_reorder_blocks_via_token),
        )
        .route(
            "/api/v1/blocks/edit/:token/:block_id",
            put(blocks::handle_update_block_via_token)
                .delete(blocks::handle_delete_block_via_token),
        )
        // Access links
        .route("/api/v1/access-links", post(links::handle_create_link))
        .route(
            "/api/v1/access-links/consultant/:consultant_id",
            get(links::handle_list_consultant_links),
        )
        .route(
            "/api/v1/access-links/validate/:token",
            get(links::handle_validate_link),
        )
        .route(
            "/api/v1/access-links/:link_id",
            delete(links::handle_revoke_link),
        )
        // Profiles
        .route(
            "/api/v1/profiles",
            get(profiles::handle_list_profiles).post(profiles::handle_create_profile),
        )
        .route(
            "/api/v1/profiles/consultant/:consultant_id",
            get(profiles::handle_list_consultant_profiles),
        )
        .route(
            "/api/v1/profiles/:profile_id",
            get(profiles::handle_get_profile)
                .put(profiles::handle_update_profile)
                .delete(profiles::handle_delete_profile),
        )
        .route(
            "/api/v1/profiles/:profile_id/duplicate",
            post(profiles::handle_duplicate_profile),
        )
        .route(
            "/api/v1/profiles/:profile_id/export/pdf",
            post(profiles::handle_export_profile_pdf),
        )
        .with_state(state)
}
