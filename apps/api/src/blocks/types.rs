//! Request payloads for block create/update, plus the list-like coercion that
//! technologies and focus-area inputs share with snapshot customizations.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::block::{
    BlockData, CertificationBlock, MiscBlock, ProjectBlock, SkillBlock,
};
use crate::patch::Patch;

/// A string list accepted in three shapes: a native array, a JSON array
/// string, or a comma-separated string. Entries are trimmed and blanks are
/// dropped; anything unrecognizable normalizes to an empty list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListLike(pub Vec<String>);

impl ListLike {
    pub fn into_inner(self) -> Vec<String> {
        self.0
    }

    pub fn parse_value(value: &Value) -> Vec<String> {
        match value {
            Value::Array(items) => clean_items(items),
            Value::String(text) => parse_text(text),
            _ => Vec::new(),
        }
    }
}

impl<'de> Deserialize<'de> for ListLike {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(ListLike(ListLike::parse_value(&value)))
    }
}

fn clean_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(item_to_string)
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn item_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_text(text: &str) -> Vec<String> {
    let stripped = text.trim();
    if stripped.is_empty() {
        return Vec::new();
    }

    if stripped.starts_with('[') && stripped.ends_with(']') {
        match serde_json::from_str::<Value>(stripped) {
            Ok(Value::Array(items)) => return clean_items(&items),
            // valid JSON that is not an array yields nothing
            Ok(_) => return Vec::new(),
            // invalid JSON falls through to comma splitting
            Err(_) => {}
        }
    }

    if stripped.contains(',') {
        stripped
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        vec![stripped.to_string()]
    }
}

/// Payload for creating a block. The variant-specific fields arrive flattened
/// next to the common ones, discriminated by `block_type`.
#[derive(Debug, Deserialize)]
pub struct BlockCreate {
    pub title: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(flatten)]
    pub payload: BlockPayload,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "block_type", rename_all = "snake_case")]
pub enum BlockPayload {
    Project(ProjectPayload),
    Skill(SkillPayload),
    Certification(CertificationPayload),
    Misc(MiscPayload),
}

impl BlockPayload {
    pub fn into_data(self) -> BlockData {
        match self {
            BlockPayload::Project(p) => BlockData::Project(ProjectBlock {
                client_name: p.client_name,
                description: p.description,
                role: p.role,
                technologies: p.technologies.into_inner(),
                start_date: p.start_date,
                end_date: p.end_date,
                is_ongoing: p.is_ongoing,
                duration_months: p.duration_months,
            }),
            BlockPayload::Skill(p) => BlockData::Skill(SkillBlock { level: p.level }),
            BlockPayload::Certification(p) => BlockData::Certification(CertificationBlock {
                issuing_organization: p.issuing_organization,
                issue_date: p.issue_date,
                expiry_date: p.expiry_date,
                credential_id: p.credential_id,
                credential_url: p.credential_url,
            }),
            BlockPayload::Misc(p) => BlockData::Misc(MiscBlock { content: p.content }),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProjectPayload {
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub technologies: ListLike,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_ongoing: bool,
    pub duration_months: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct SkillPayload {
    pub level: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CertificationPayload {
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MiscPayload {
    pub content: Option<String>,
}

/// Partial update for a block. `data`, when present, must carry the same
/// `block_type` as the stored block; the variant of a block never changes.
#[derive(Debug, Default, Deserialize)]
pub struct BlockUpdate {
    pub title: Option<String>,
    pub display_order: Option<i32>,
    pub data: Option<BlockDataPatch>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "block_type", rename_all = "snake_case")]
pub enum BlockDataPatch {
    Project(ProjectPatch),
    Skill(SkillPatch),
    Certification(CertificationPatch),
    Misc(MiscPatch),
}

impl BlockDataPatch {
    pub fn block_type_str(&self) -> &'static str {
        match self {
            BlockDataPatch::Project(_) => "project",
            BlockDataPatch::Skill(_) => "skill",
            BlockDataPatch::Certification(_) => "certification",
            BlockDataPatch::Misc(_) => "misc",
        }
    }

    pub fn apply(self, data: &mut BlockData) {
        match (self, data) {
            (BlockDataPatch::Project(patch), BlockData::Project(block)) => patch.apply(block),
            (BlockDataPatch::Skill(patch), BlockData::Skill(block)) => patch.apply(block),
            (BlockDataPatch::Certification(patch), BlockData::Certification(block)) => {
                patch.apply(block)
            }
            (BlockDataPatch::Misc(patch), BlockData::Misc(block)) => patch.apply(block),
            // variant mismatch is rejected before apply is reached
            _ => {}
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub client_name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub role: Patch<String>,
    #[serde(default)]
    pub technologies: Patch<ListLike>,
    #[serde(default)]
    pub start_date: Patch<NaiveDate>,
    #[serde(default)]
    pub end_date: Patch<NaiveDate>,
    pub is_ongoing: Option<bool>,
    #[serde(default)]
    pub duration_months: Patch<i32>,
}

impl ProjectPatch {
    pub fn apply(self, block: &mut ProjectBlock) {
        self.client_name.apply_to(&mut block.client_name);
        self.description.apply_to(&mut block.description);
        self.role.apply_to(&mut block.role);
        match self.technologies {
            Patch::Absent => {}
            Patch::Null => block.technologies.clear(),
            Patch::Value(list) => block.technologies = list.into_inner(),
        }
        self.start_date.apply_to(&mut block.start_date);
        self.end_date.apply_to(&mut block.end_date);
        if let Some(is_ongoing) = self.is_ongoing {
            block.is_ongoing = is_ongoing;
        }
        self.duration_months.apply_to(&mut block.duration_months);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SkillPatch {
    #[serde(default)]
    pub level: Patch<String>,
}

impl SkillPatch {
    pub fn apply(self, block: &mut SkillBlock) {
        self.level.apply_to(&mut block.level);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CertificationPatch {
    #[serde(default)]
    pub issuing_organization: Patch<String>,
    #[serde(default)]
    pub issue_date: Patch<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Patch<NaiveDate>,
    #[serde(default)]
    pub credential_id: Patch<String>,
    #[serde(default)]
    pub credential_url: Patch<String>,
}

impl CertificationPatch {
    pub fn apply(self, block: &mut CertificationBlock) {
        self.issuing_organization
            .apply_to(&mut block.issuing_organization);
        self.issue_date.apply_to(&mut block.issue_date);
        self.expiry_date.apply_to(&mut block.expiry_date);
        self.credential_id.apply_to(&mut block.credential_id);
        self.credential_url.apply_to(&mut block.credential_url);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MiscPatch {
    #[serde(default)]
    pub content: Patch<String>,
}

impl MiscPatch {
    pub fn apply(self, block: &mut MiscBlock) {
        self.content.apply_to(&mut block.content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Vec<String> {
        ListLike::parse_value(&value)
    }

    #[test]
    fn test_list_like_native_array() {
        assert_eq!(parse(json!(["AWS", "Kubernetes"])), vec!["AWS", "Kubernetes"]);
    }

    #[test]
    fn test_list_like_array_trims_and_drops_blanks() {
        assert_eq!(parse(json!(["  AWS ", "", "  "])), vec!["AWS"]);
    }

    #[test]
    fn test_list_like_json_array_string() {
        assert_eq!(
            parse(json!(r#"["AWS","Kubernetes"]"#)),
            vec!["AWS", "Kubernetes"]
        );
    }

    #[test]
    fn test_list_like_comma_separated() {
        assert_eq!(parse(json!("AWS, Kubernetes,  ")), vec!["AWS", "Kubernetes"]);
    }

    #[test]
    fn test_list_like_single_item_string() {
        assert_eq!(parse(json!("Rust")), vec!["Rust"]);
    }

    #[test]
    fn test_list_like_invalid_json_array_falls_back_to_commas() {
        assert_eq!(parse(json!("[AWS, Kubernetes]")), vec!["[AWS", "Kubernetes]"]);
    }

    #[test]
    fn test_list_like_unterminated_bracket_is_literal() {
        assert_eq!(parse(json!(r#"["#)), vec!["["]);
        assert_eq!(parse(json!(r#"[3]"#)), vec!["3"]);
    }

    #[test]
    fn test_list_like_numbers_stringified() {
        assert_eq!(parse(json!([1, 2])), vec!["1", "2"]);
    }

    #[test]
    fn test_list_like_null_and_scalars_empty() {
        assert_eq!(parse(json!(null)), Vec::<String>::new());
        assert_eq!(parse(json!(42)), Vec::<String>::new());
        assert_eq!(parse(json!("")), Vec::<String>::new());
    }

    #[test]
    fn test_block_create_project_flattened() {
        let create: BlockCreate = serde_json::from_value(json!({
            "title": "Data platform",
            "block_type": "project",
            "client_name": "ACME",
            "technologies": "Rust, Postgres",
            "is_ongoing": true
        }))
        .unwrap();
        let data = create.payload.into_data();
        match data {
            BlockData::Project(p) => {
                assert_eq!(p.client_name.as_deref(), Some("ACME"));
                assert_eq!(p.technologies, vec!["Rust", "Postgres"]);
                assert!(p.is_ongoing);
            }
            other => panic!("expected project, got {other:?}"),
        }
    }

    #[test]
    fn test_block_create_requires_known_type() {
        let result = serde_json::from_value::<BlockCreate>(json!({
            "title": "x",
            "block_type": "hobby"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_project_patch_clears_and_keeps() {
        let mut block = ProjectBlock {
            client_name: Some("ACME".to_string()),
            role: Some("Lead".to_string()),
            technologies: vec!["Rust".to_string()],
            ..Default::default()
        };
        let patch: ProjectPatch = serde_json::from_value(json!({
            "client_name": null,
            "technologies": ["Go", "TimescaleDB"]
        }))
        .unwrap();
        patch.apply(&mut block);
        assert_eq!(block.client_name, None);
        assert_eq!(block.role.as_deref(), Some("Lead"));
        assert_eq!(block.technologies, vec!["Go", "TimescaleDB"]);
    }

    #[test]
    fn test_block_update_data_is_typed() {
        let update: BlockUpdate = serde_json::from_value(json!({
            "title": "New title",
            "data": {"block_type": "skill", "level": "Expert"}
        }))
        .unwrap();
        let patch = update.data.unwrap();
        assert_eq!(patch.block_type_str(), "skill");
    }
}
