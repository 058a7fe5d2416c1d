//! Snapshot assembly: selection validation, per-block customization merge,
//! and general-section resolution, producing one deterministic document.

use std::collections::{HashMap, HashSet};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::block::BlockRow;
use crate::models::consultant::ConsultantRow;
use crate::profiles::customization::{resolve_block, resolve_general, GeneralOverrides};
use crate::profiles::snapshot::{BlocksByType, ConsultantIdentity, SnapshotDocument};

pub const MISSING_BLOCKS_MESSAGE: &str =
    "One or more selected blocks were not found for this consultant.";

/// Removes duplicate ids while keeping first-occurrence order.
pub fn dedup_block_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(**id))
        .copied()
        .collect()
}

/// The assembled snapshot plus the normalized selection it was built from.
#[derive(Debug)]
pub struct AssembledProfile {
    pub selected_block_ids: Vec<Uuid>,
    pub document: SnapshotDocument,
}

/// Builds the snapshot document for a selection of the consultant's blocks.
///
/// `blocks` must have been loaded scoped to the owning consultant. Every id
/// in the selection must be matched by a loaded block — a missing id fails
/// the whole assembly rather than silently dropping content.
pub fn assemble_snapshot(
    consultant: &ConsultantRow,
    blocks: &[BlockRow],
    selected_block_ids: &[Uuid],
    customizations: &HashMap<Uuid, Value>,
    general_customizations: GeneralOverrides,
    generated_at: DateTime<Utc>,
) -> Result<AssembledProfile, AppError> {
    let selected = dedup_block_ids(selected_block_ids);

    let by_id: HashMap<Uuid, &BlockRow> = blocks.iter().map(|block| (block.id, block)).collect();
    if selected.iter().any(|id| !by_id.contains_key(id)) {
        return Err(AppError::Validation(MISSING_BLOCKS_MESSAGE.into()));
    }

    let mut blocks_by_type = BlocksByType::default();
    for id in &selected {
        let row = by_id[id];
        let data = row
            .decode_data()
            .map_err(|e| anyhow!("stored block {} has malformed data: {e}", row.id))?;
        let resolved = resolve_block(row.id, &row.title, &data, customizations.get(id))?;
        blocks_by_type.push(resolved);
    }

    let document = SnapshotDocument {
        consultant: ConsultantIdentity {
            first_name: consultant.first_name.clone(),
            last_name: consultant.last_name.clone(),
            title: consultant.title.clone(),
            email: consultant.email.clone(),
            photo_url: consultant.photo_url.clone(),
        },
        blocks_by_type,
        generated_at,
        general_customizations: resolve_general(consultant, general_customizations),
    };

    Ok(AssembledProfile {
        selected_block_ids: selected,
        document,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::block::{BlockData, MiscBlock, ProjectBlock, SkillBlock};
    use serde_json::json;

    fn consultant() -> ConsultantRow {
        ConsultantRow {
            id: Uuid::new_v4(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            title: "Principal Consultant".to_string(),
            summary: Some("Analytical engines".to_string()),
            photo_url: Some("https://example.com/ada.png".to_string()),
            role: Some("Data Engineer".to_string()),
            focus_areas: vec!["Streaming".to_string()],
            years_experience: Some(12),
            motto: None,
            created_by_admin_id: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn block_row(consultant_id: Uuid, title: &str, data: BlockData) -> BlockRow {
        BlockRow {
            id: Uuid::new_v4(),
            consultant_id,
            block_type: data.block_type_str().to_string(),
            title: title.to_string(),
            display_order: 0,
            is_active: true,
            data: serde_json::to_value(&data).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn skill(consultant_id: Uuid, title: &str, level: &str) -> BlockRow {
        block_row(
            consultant_id,
            title,
            BlockData::Skill(SkillBlock {
                level: Some(level.to_string()),
            }),
        )
    }

    #[test]
    fn test_dedup_preserves_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        assert_eq!(dedup_block_ids(&[c, a, c, b]), vec![c, a, b]);
    }

    #[test]
    fn test_missing_selected_block_fails_assembly() {
        let consultant = consultant();
        let block = skill(consultant.id, "Rust", "Expert");
        let missing = Uuid::new_v4();
        let err = assemble_snapshot(
            &consultant,
            &[block.clone()],
            &[block.id, missing],
            &HashMap::new(),
            GeneralOverrides::default(),
            Utc::now(),
        );
        match err {
            Err(AppError::Validation(msg)) => assert_eq!(msg, MISSING_BLOCKS_MESSAGE),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_buckets_preserve_selection_order_within_type() {
        let consultant = consultant();
        let skill_a = skill(consultant.id, "Rust", "Expert");
        let skill_b = skill(consultant.id, "Go", "Advanced");
        let project = block_row(
            consultant.id,
            "Platform",
            BlockData::Project(ProjectBlock::default()),
        );
        // selection interleaves types and repeats the first skill
        let selection = vec![skill_b.id, project.id, skill_a.id, skill_b.id];

        let assembled = assemble_snapshot(
            &consultant,
            &[skill_a.clone(), skill_b.clone(), project.clone()],
            &selection,
            &HashMap::new(),
            GeneralOverrides::default(),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            assembled.selected_block_ids,
            vec![skill_b.id, project.id, skill_a.id]
        );
        let skills = &assembled.document.blocks_by_type.skill;
        assert_eq!(skills.len(), 2);
        assert_eq!(skills[0].id, skill_b.id);
        assert_eq!(skills[1].id, skill_a.id);
        assert_eq!(assembled.document.blocks_by_type.project.len(), 1);
        assert!(assembled.document.blocks_by_type.misc.is_empty());
    }

    #[test]
    fn test_identity_is_copied_and_not_overridable() {
        let consultant = consultant();
        let block = skill(consultant.id, "Rust", "Expert");
        // identity-looking keys in the general overrides are simply unknown
        let general: GeneralOverrides = serde_json::from_value(json!({
            "role": "Override role"
        }))
        .unwrap();

        let assembled = assemble_snapshot(
            &consultant,
            &[block.clone()],
            &[block.id],
            &HashMap::new(),
            general,
            Utc::now(),
        )
        .unwrap();

        let identity = &assembled.document.consultant;
        assert_eq!(identity.first_name, "Ada");
        assert_eq!(identity.email, "ada@example.com");
        assert_eq!(
            assembled.document.general_customizations.role.as_deref(),
            Some("Override role")
        );
    }

    #[test]
    fn test_generated_at_is_stamped() {
        let consultant = consultant();
        let block = skill(consultant.id, "Rust", "Expert");
        let stamp = Utc::now();
        let assembled = assemble_snapshot(
            &consultant,
            &[block.clone()],
            &[block.id],
            &HashMap::new(),
            GeneralOverrides::default(),
            stamp,
        )
        .unwrap();
        assert_eq!(assembled.document.generated_at, stamp);
    }

    #[test]
    fn test_per_block_customizations_applied_by_id() {
        let consultant = consultant();
        let misc = block_row(
            consultant.id,
            "Talks",
            BlockData::Misc(MiscBlock {
                content: Some("RustConf keynote".to_string()),
            }),
        );
        let other = skill(consultant.id, "Rust", "Expert");
        let mut customizations = HashMap::new();
        customizations.insert(misc.id, json!({"content": null, "title": "Speaking"}));

        let assembled = assemble_snapshot(
            &consultant,
            &[misc.clone(), other.clone()],
            &[misc.id, other.id],
            &customizations,
            GeneralOverrides::default(),
            Utc::now(),
        )
        .unwrap();

        let resolved_misc = &assembled.document.blocks_by_type.misc[0];
        assert_eq!(resolved_misc.title.as_deref(), Some("Speaking"));
        let resolved_skill = &assembled.document.blocks_by_type.skill[0];
        assert_eq!(resolved_skill.title.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_document_serialization_is_deterministic() {
        let consultant = consultant();
        let block = skill(consultant.id, "Rust", "Expert");
        let stamp = Utc::now();
        let build = || {
            assemble_snapshot(
                &consultant,
                &[block.clone()],
                &[block.id],
                &HashMap::new(),
                GeneralOverrides::default(),
                stamp,
            )
            .unwrap()
        };
        let first = serde_json::to_string(&build().document).unwrap();
        let second = serde_json::to_string(&build().document).unwrap();
        assert_eq!(first, second);
    }
}
