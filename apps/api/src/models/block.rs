use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// The four content block kinds a consultant can own.
pub const BLOCK_TYPES: [&str; 4] = ["project", "skill", "certification", "misc"];

/// One consultant content block as stored. The `block_type` column duplicates
/// the tag inside `data` so SQL can filter without unpacking JSON; both are
/// written from the same [`BlockData`] value so they cannot drift.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BlockRow {
    pub id: Uuid,
    pub consultant_id: Uuid,
    pub block_type: String,
    pub title: String,
    pub display_order: i32,
    pub is_active: bool,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlockRow {
    pub fn decode_data(&self) -> Result<BlockData, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }
}

/// Typed payload of a block. Exactly one variant exists per block; the tagged
/// representation replaces a flat row of mostly-null type-specific columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block_type", rename_all = "snake_case")]
pub enum BlockData {
    Project(ProjectBlock),
    Skill(SkillBlock),
    Certification(CertificationBlock),
    Misc(MiscBlock),
}

impl BlockData {
    pub fn block_type_str(&self) -> &'static str {
        match self {
            BlockData::Project(_) => "project",
            BlockData::Skill(_) => "skill",
            BlockData::Certification(_) => "certification",
            BlockData::Misc(_) => "misc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectBlock {
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_ongoing: bool,
    pub duration_months: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillBlock {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationBlock {
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiscBlock {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_data_round_trips_with_tag() {
        let data = BlockData::Project(ProjectBlock {
            client_name: Some("ACME".to_string()),
            technologies: vec!["Rust".to_string()],
            is_ongoing: true,
            ..Default::default()
        });
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["block_type"], "project");
        let back: BlockData = serde_json::from_value(value).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_block_type_str_matches_tag() {
        let data = BlockData::Skill(SkillBlock { level: None });
        let value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["block_type"], data.block_type_str());
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = serde_json::from_value::<BlockData>(serde_json::json!({
            "block_type": "hobby",
            "content": "juggling"
        }));
        assert!(err.is_err());
    }
}
