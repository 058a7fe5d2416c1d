use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::{is_unique_violation, AppError};
use crate::models::consultant::ConsultantRow;
use crate::patch::Patch;

const EMAIL_CONFLICT_MESSAGE: &str = "A consultant with this email already exists.";

/// Trims focus-area entries and drops blanks.
pub fn normalize_focus_areas(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct ConsultantCreate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub title: String,
    pub summary: Option<String>,
    pub photo_url: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    pub years_experience: Option<i32>,
    pub motto: Option<String>,
}

/// Partial update: absent fields stay untouched; explicit nulls clear the
/// nullable fields.
#[derive(Debug, Default, Deserialize)]
pub struct ConsultantUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Patch<String>,
    #[serde(default)]
    pub photo_url: Patch<String>,
    #[serde(default)]
    pub role: Patch<String>,
    #[serde(default)]
    pub focus_areas: Patch<Vec<String>>,
    #[serde(default)]
    pub years_experience: Patch<i32>,
    #[serde(default)]
    pub motto: Patch<String>,
}

impl ConsultantUpdate {
    fn apply(self, row: &mut ConsultantRow) {
        if let Some(first_name) = self.first_name {
            row.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            row.last_name = last_name;
        }
        if let Some(email) = self.email {
            row.email = email;
        }
        if let Some(title) = self.title {
            row.title = title;
        }
        self.summary.apply_to(&mut row.summary);
        self.photo_url.apply_to(&mut row.photo_url);
        self.role.apply_to(&mut row.role);
        match self.focus_areas {
            Patch::Absent => {}
            Patch::Null => row.focus_areas = Vec::new(),
            Patch::Value(values) => row.focus_areas = normalize_focus_areas(&values),
        }
        self.years_experience.apply_to(&mut row.years_experience);
        self.motto.apply_to(&mut row.motto);
    }
}

pub async fn create_consultant(
    pool: &PgPool,
    input: ConsultantCreate,
    admin_id: Uuid,
) -> Result<ConsultantRow, AppError> {
    let focus_areas = normalize_focus_areas(&input.focus_areas);

    let row = sqlx::query_as::<_, ConsultantRow>(
        r#"
        INSERT INTO consultants
            (id, first_name, last_name, email, title, summary, photo_url,
             role, focus_areas, years_experience, motto, created_by_admin_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.first_name.trim())
    .bind(input.last_name.trim())
    .bind(input.email.trim())
    .bind(input.title.trim())
    .bind(&input.summary)
    .bind(&input.photo_url)
    .bind(&input.role)
    .bind(&focus_areas)
    .bind(input.years_experience)
    .bind(&input.motto)
    .bind(admin_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(EMAIL_CONFLICT_MESSAGE.into())
        } else {
            AppError::Database(e)
        }
    })?;

    info!("Created consultant {}", row.id);
    Ok(row)
}

pub async fn get_consultant(
    pool: &PgPool,
    consultant_id: Uuid,
) -> Result<Option<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>("SELECT * FROM consultants WHERE id = $1")
        .bind(consultant_id)
        .fetch_optional(pool)
        .await
}

pub async fn list_consultants(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<ConsultantRow>, sqlx::Error> {
    sqlx::query_as::<_, ConsultantRow>(
        "SELECT * FROM consultants ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn update_consultant(
    pool: &PgPool,
    consultant_id: Uuid,
    update: ConsultantUpdate,
) -> Result<Option<ConsultantRow>, AppError> {
    let mut tx = pool.begin().await?;

    let existing: Option<ConsultantRow> =
        sqlx::query_as("SELECT * FROM consultants WHERE id = $1")
            .bind(consultant_id)
            .fetch_optional(&mut *tx)
            .await?;
    let Some(mut consultant) = existing else {
        return Ok(None);
    };

    update.apply(&mut consultant);

    let row = sqlx::query_as::<_, ConsultantRow>(
        r#"
        UPDATE consultants
        SET first_name = $2, last_name = $3, email = $4, title = $5, summary = $6,
            photo_url = $7, role = $8, focus_areas = $9, years_experience = $10,
            motto = $11, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(consultant_id)
    .bind(&consultant.first_name)
    .bind(&consultant.last_name)
    .bind(&consultant.email)
    .bind(&consultant.title)
    .bind(&consultant.summary)
    .bind(&consultant.photo_url)
    .bind(&consultant.role)
    .bind(&consultant.focus_areas)
    .bind(consultant.years_experience)
    .bind(&consultant.motto)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(EMAIL_CONFLICT_MESSAGE.into())
        } else {
            AppError::Database(e)
        }
    })?;

    tx.commit().await?;
    Ok(Some(row))
}

/// Hard delete. Blocks and access links cascade with the consultant.
pub async fn delete_consultant(pool: &PgPool, consultant_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM consultants WHERE id = $1")
        .bind(consultant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_normalize_focus_areas() {
        let input = vec![
            "  Streaming ".to_string(),
            "".to_string(),
            "   ".to_string(),
            "MLOps".to_string(),
        ];
        assert_eq!(normalize_focus_areas(&input), vec!["Streaming", "MLOps"]);
    }

    fn consultant() -> ConsultantRow {
        ConsultantRow {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            title: "Consultant".to_string(),
            summary: Some("summary".to_string()),
            photo_url: None,
            role: Some("Engineer".to_string()),
            focus_areas: vec!["Streaming".to_string()],
            years_experience: Some(10),
            motto: None,
            created_by_admin_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_absent_fields_untouched() {
        let mut row = consultant();
        let update: ConsultantUpdate =
            serde_json::from_str(r#"{"first_name": "Augusta"}"#).unwrap();
        update.apply(&mut row);
        assert_eq!(row.first_name, "Augusta");
        assert_eq!(row.summary.as_deref(), Some("summary"));
        assert_eq!(row.role.as_deref(), Some("Engineer"));
    }

    #[test]
    fn test_update_null_clears_nullable_fields() {
        let mut row = consultant();
        let update: ConsultantUpdate =
            serde_json::from_str(r#"{"summary": null, "years_experience": null}"#).unwrap();
        update.apply(&mut row);
        assert_eq!(row.summary, None);
        assert_eq!(row.years_experience, None);
    }

    #[test]
    fn test_update_normalizes_focus_areas() {
        let mut row = consultant();
        let update: ConsultantUpdate =
            serde_json::from_str(r#"{"focus_areas": [" ML ", "", "Ops"]}"#).unwrap();
        update.apply(&mut row);
        assert_eq!(row.focus_areas, vec!["ML", "Ops"]);
    }
}
