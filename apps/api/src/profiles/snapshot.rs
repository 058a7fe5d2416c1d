//! The persisted snapshot document. This shape is a compatibility surface:
//! the PDF exporter and any future consumer parse it structurally, so field
//! names and the `blocks_by_type` layout must stay stable.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fully resolved, self-contained copy of a profile's content at assembly
/// time. Stored as serialized text and never partially mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    pub consultant: ConsultantIdentity,
    pub blocks_by_type: BlocksByType,
    pub generated_at: DateTime<Utc>,
    pub general_customizations: GeneralSection,
}

/// Consultant identity as captured at assembly time. Not overridable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultantIdentity {
    pub first_name: String,
    pub last_name: String,
    pub title: String,
    pub email: String,
    pub photo_url: Option<String>,
}

/// The consultant's general section after presence-wins override resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralSection {
    pub role: Option<String>,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    pub years_experience: Option<i32>,
    pub motto: Option<String>,
}

/// Resolved blocks bucketed by type. Buckets keep the relative order of the
/// profile's selection; empty buckets are omitted from the serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlocksByType {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project: Vec<ResolvedBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skill: Vec<ResolvedBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub certification: Vec<ResolvedBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub misc: Vec<ResolvedBlock>,
}

impl BlocksByType {
    pub fn push(&mut self, block: ResolvedBlock) {
        match block.data {
            ResolvedBlockData::Project(_) => self.project.push(block),
            ResolvedBlockData::Skill(_) => self.skill.push(block),
            ResolvedBlockData::Certification(_) => self.certification.push(block),
            ResolvedBlockData::Misc(_) => self.misc.push(block),
        }
    }
}

/// One block after customization-merge, flattened next to its id and title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBlock {
    pub id: Uuid,
    pub title: Option<String>,
    #[serde(flatten)]
    pub data: ResolvedBlockData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block_type", rename_all = "snake_case")]
pub enum ResolvedBlockData {
    Project(ResolvedProject),
    Skill(ResolvedSkill),
    Certification(ResolvedCertification),
    Misc(ResolvedMisc),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedProject {
    pub client_name: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub duration_months: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_ongoing: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSkill {
    pub level: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCertification {
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMisc {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_block_serializes_flat() {
        let block = ResolvedBlock {
            id: Uuid::new_v4(),
            title: Some("Platform rebuild".to_string()),
            data: ResolvedBlockData::Project(ResolvedProject {
                client_name: Some("ACME".to_string()),
                is_ongoing: true,
                ..Default::default()
            }),
        };
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(value["block_type"], "project");
        assert_eq!(value["client_name"], "ACME");
        assert_eq!(value["title"], "Platform rebuild");
        assert!(value.get("data").is_none());
    }

    #[test]
    fn test_empty_buckets_omitted() {
        let mut blocks = BlocksByType::default();
        blocks.push(ResolvedBlock {
            id: Uuid::new_v4(),
            title: Some("Rust".to_string()),
            data: ResolvedBlockData::Skill(ResolvedSkill {
                level: Some("Expert".to_string()),
            }),
        });
        let value = serde_json::to_value(&blocks).unwrap();
        assert!(value.get("skill").is_some());
        assert!(value.get("project").is_none());
        assert!(value.get("certification").is_none());
    }

    #[test]
    fn test_document_round_trip() {
        let doc = SnapshotDocument {
            consultant: ConsultantIdentity {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                title: "Consultant".to_string(),
                email: "ada@example.com".to_string(),
                photo_url: None,
            },
            blocks_by_type: BlocksByType::default(),
            generated_at: Utc::now(),
            general_customizations: GeneralSection::default(),
        };
        let text = serde_json::to_string(&doc).unwrap();
        let back: SnapshotDocument = serde_json::from_str(&text).unwrap();
        assert_eq!(back, doc);
    }
}
