use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Rules translating card metadata into task metadata.
///
/// Rule lists are ordered and scanned front to back; the first rule containing the
/// looked-up id wins. Overlapping rules are legal, so these stay as lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConfig {
    pub default_task_type: String,
    pub card_type_mappings: Vec<CardTypeRule>,
    pub lane_section_mappings: Vec<LaneRule>,
    pub assigned_users: Vec<UserMapping>,
    pub exclude_card_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTypeRule {
    pub card_types: Vec<String>,
    pub task_type_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaneRule {
    pub lanes: Vec<String>,
    pub section_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UserMapping {
    #[serde(rename = "lkUserId")]
    pub card_user_id: String,
    #[serde(rename = "userId")]
    pub task_user_id: String,
}

/// On-disk form; lists may be omitted and the default is checked after parsing.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMapping {
    default_task_type: Option<String>,
    #[serde(default)]
    card_type_mappings: Vec<CardTypeRule>,
    #[serde(default)]
    lane_section_mappings: Vec<LaneRule>,
    #[serde(default)]
    assigned_users: Vec<UserMapping>,
    #[serde(default)]
    exclude_card_types: Vec<String>,
}

impl MappingConfig {
    pub fn task_type_for(&self, card_type_id: &str) -> &str {
        self.card_type_mappings
            .iter()
            .find(|rule| rule.card_types.iter().any(|t| t == card_type_id))
            .map(|rule| rule.task_type_id.as_str())
            .unwrap_or(&self.default_task_type)
    }

    pub fn section_for(&self, lane_id: &str) -> Option<&str> {
        self.lane_section_mappings
            .iter()
            .find(|rule| rule.lanes.iter().any(|l| l == lane_id))
            .map(|rule| rule.section_id.as_str())
    }

    pub fn user_for(&self, card_user_id: &str) -> Option<&str> {
        self.assigned_users
            .iter()
            .find(|u| u.card_user_id == card_user_id)
            .map(|u| u.task_user_id.as_str())
    }

    pub fn is_excluded(&self, card_type_id: &str) -> bool {
        self.exclude_card_types.iter().any(|t| t == card_type_id)
    }
}

pub fn parse_mapping(contents: &str, path: &Path) -> Result<MappingConfig, ConfigError> {
    let raw: RawMapping = serde_json::from_str(contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let default_task_type = raw
        .default_task_type
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingDefaultTaskType {
            path: path.to_path_buf(),
        })?;

    Ok(MappingConfig {
        default_task_type,
        card_type_mappings: raw.card_type_mappings,
        lane_section_mappings: raw.lane_section_mappings,
        assigned_users: raw.assigned_users,
        exclude_card_types: raw.exclude_card_types,
    })
}

pub fn load_mapping(path: &Path) -> Result<MappingConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mapping(&contents, path)
}
