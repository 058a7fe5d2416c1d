use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConsultantRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub title: String,
    pub summary: Option<String>,
    pub photo_url: Option<String>,

    // General section
    pub role: Option<String>,
    pub focus_areas: Vec<String>,
    pub years_experience: Option<i32>,
    pub motto: Option<String>,

    pub created_by_admin_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
