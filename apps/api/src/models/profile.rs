use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted profile snapshot. `profile_data` holds the fully resolved
/// snapshot document as serialized JSON text. It is written wholesale on
/// create/update and copied verbatim on duplicate, never partially mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub profile_name: String,
    pub selected_block_ids: Vec<Uuid>,
    pub profile_data: String,
    pub created_by_admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
