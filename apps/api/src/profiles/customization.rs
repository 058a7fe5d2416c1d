//! Per-block customization merge. A field is taken from the override payload
//! if and only if its key is present there (even when the value is null);
//! otherwise the block's live value is used. "Admin cleared this field" and
//! "admin never touched this field" are different things.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use crate::blocks::types::ListLike;
use crate::errors::AppError;
use crate::models::block::BlockData;
use crate::models::consultant::ConsultantRow;
use crate::patch::Patch;
use crate::profiles::snapshot::{
    GeneralSection, ResolvedBlock, ResolvedBlockData, ResolvedCertification, ResolvedMisc,
    ResolvedProject, ResolvedSkill,
};

/// Integer-like override value: a number, a numeric string, or a bool.
/// Anything else (and any unparseable string) coerces to none.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntLike(pub Option<i64>);

impl<'de> Deserialize<'de> for IntLike {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(IntLike(parse_int_value(&value)))
    }
}

fn parse_int_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<i64>().ok()
            }
        }
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    }
}

/// Boolean-like override value recognizing the usual true/false tokens
/// case-insensitively. Unrecognized input coerces to none so the caller can
/// fall back to the live flag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoolLike(pub Option<bool>);

impl<'de> Deserialize<'de> for BoolLike {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(BoolLike(parse_bool_value(&value)))
    }
}

fn parse_bool_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectOverrides {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub client_name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub role: Patch<String>,
    #[serde(default)]
    pub technologies: Patch<ListLike>,
    #[serde(default)]
    pub duration_months: Patch<IntLike>,
    #[serde(default)]
    pub start_date: Patch<NaiveDate>,
    #[serde(default)]
    pub end_date: Patch<NaiveDate>,
    #[serde(default)]
    pub is_ongoing: Patch<BoolLike>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SkillOverrides {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub level: Patch<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CertificationOverrides {
    #[serde(default)]
    pub title: Patch<String>,
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

#[derive(Debug, Default, Deserialize)]
pub struct MiscOverrides {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub content: Patch<String>,
}

/// Snapshot-level overrides for the consultant's general section.
#[derive(Debug, Default, Deserialize)]
pub struct GeneralOverrides {
    #[serde(default)]
    pub role: Patch<String>,
    #[serde(default)]
    pub focus_areas: Patch<ListLike>,
    #[serde(default)]
    pub years_experience: Patch<IntLike>,
    #[serde(default)]
    pub motto: Patch<String>,
}

fn parse_overrides<T>(overrides: Option<&Value>) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    match overrides {
        None => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| AppError::Validation(format!("Invalid customization payload: {e}"))),
    }
}

/// Merges one block with its optional override map into the snapshot shape.
pub fn resolve_block(
    id: Uuid,
    title: &str,
    data: &BlockData,
    overrides: Option<&Value>,
) -> Result<ResolvedBlock, AppError> {
    let resolved = match data {
        BlockData::Project(live) => {
            let ov: ProjectOverrides = parse_overrides(overrides)?;

            // Null and unparseable ongoing overrides fall back to the live
            // flag rather than clearing it.
            let is_ongoing = match ov.is_ongoing {
                Patch::Value(BoolLike(Some(flag))) => flag,
                _ => live.is_ongoing,
            };
            // An ongoing project cannot carry an end date, no matter what any
            // override says.
            let end_date = if is_ongoing {
                None
            } else {
                ov.end_date.resolve(live.end_date)
            };
            let technologies = match ov.technologies {
                Patch::Absent => live.technologies.clone(),
                Patch::Null => Vec::new(),
                Patch::Value(list) => list.into_inner(),
            };
            let duration_months = match ov.duration_months {
                Patch::Absent => live.duration_months,
                Patch::Null => None,
                Patch::Value(IntLike(value)) => value.and_then(|n| i32::try_from(n).ok()),
            };

            ResolvedBlock {
                id,
                title: ov.title.resolve(Some(title.to_string())),
                data: ResolvedBlockData::Project(ResolvedProject {
                    client_name: ov.client_name.resolve(live.client_name.clone()),
                    description: ov.description.resolve(live.description.clone()),
                    role: ov.role.resolve(live.role.clone()),
                    technologies,
                    duration_months,
                    start_date: ov.start_date.resolve(live.start_date),
                    end_date,
                    is_ongoing,
                }),
            }
        }
        BlockData::Skill(live) => {
            let ov: SkillOverrides = parse_overrides(overrides)?;
            ResolvedBlock {
                id,
                title: ov.title.resolve(Some(title.to_string())),
                data: ResolvedBlockData::Skill(ResolvedSkill {
                    level: ov.level.resolve(live.level.clone()),
                }),
            }
        }
        BlockData::Certification(live) => {
            let ov: CertificationOverrides = parse_overrides(overrides)?;
            ResolvedBlock {
                id,
                title: ov.title.resolve(Some(title.to_string())),
                data: ResolvedBlockData::Certification(ResolvedCertification {
                    issuing_organization: ov
                        .issuing_organization
                        .resolve(live.issuing_organization.clone()),
                    issue_date: ov.issue_date.resolve(live.issue_date),
                    expiry_date: ov.expiry_date.resolve(live.expiry_date),
                    credential_id: ov.credential_id.resolve(live.credential_id.clone()),
                    credential_url: ov.credential_url.resolve(live.credential_url.clone()),
                }),
            }
        }
        BlockData::Misc(live) => {
            let ov: MiscOverrides = parse_overrides(overrides)?;
            ResolvedBlock {
                id,
                title: ov.title.resolve(Some(title.to_string())),
                data: ResolvedBlockData::Misc(ResolvedMisc {
                    content: ov.content.resolve(live.content.clone()),
                }),
            }
        }
    };

    Ok(resolved)
}

/// Resolves the consultant's general section with the same presence-wins rule.
pub fn resolve_general(consultant: &ConsultantRow, overrides: GeneralOverrides) -> GeneralSection {
    let focus_areas = match overrides.focus_areas {
        Patch::Absent => consultant.focus_areas.clone(),
        Patch::Null => Vec::new(),
        Patch::Value(list) => list.into_inner(),
    };
    let years_experience = match overrides.years_experience {
        Patch::Absent => consultant.years_experience,
        Patch::Null => None,
        Patch::Value(IntLike(value)) => value.and_then(|n| i32::try_from(n).ok()),
    };

    GeneralSection {
        role: overrides.role.resolve(consultant.role.clone()),
        focus_areas,
        years_experience,
        motto: overrides.motto.resolve(consultant.motto.clone()),
    }
}
