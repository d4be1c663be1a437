use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const DEFAULT_PAGE_SIZE: u32 = 200;

/// Service credentials and ids. Every field may be missing from the file and
/// supplied through the environment instead.
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub leankit: LeanKitFile,
    #[serde(default)]
    pub asana: AsanaFile,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeanKitFile {
    pub host: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub board_id: Option<String>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct AsanaFile {
    pub token: Option<String>,
    pub workspace_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub custom_fields: CustomFieldFile,
}

#[derive(Debug, Deserialize, Default)]
pub struct CustomFieldFile {
    pub card_id: Option<String>,
    pub external_id: Option<String>,
    pub url: Option<String>,
    pub task_type: Option<String>,
}

/// Resolved LeanKit settings handed to the board gateway.
#[derive(Debug, Clone)]
pub struct LeanKitSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub board_id: String,
    pub page_size: u32,
}

/// Resolved Asana settings handed to the task gateway.
#[derive(Debug, Clone)]
pub struct AsanaSettings {
    pub token: String,
    pub workspace_id: String,
    pub project_id: String,
    pub fields: CustomFieldIds,
}

/// Gids of the custom fields a synced task carries.
#[derive(Debug, Clone)]
pub struct CustomFieldIds {
    pub card_id: String,
    pub external_id: String,
    pub url: String,
    pub task_type: String,
}

fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lanesync")
        .join("config.toml")
}

/// Load the config file and layer the process environment over it. A file named
/// with `--config` must exist; the default location may be absent.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut config = match path {
        Some(path) => read_config_file(path, true)?,
        None => read_config_file(&config_path(), false)?,
    };
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn read_config_file(path: &Path, required: bool) -> Result<AppConfig> {
    if !path.exists() {
        if required {
            anyhow::bail!("Config file {} does not exist", path.display());
        }
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

fn override_with(slot: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        *slot = Some(v);
    }
}

fn required(
    value: &Option<String>,
    key: &'static str,
    env: &'static str,
) -> Result<String, ConfigError> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingSetting { key, env })
}

impl AppConfig {
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lk = &mut self.leankit;
        override_with(&mut lk.host, lookup("LK_HOST"));
        override_with(&mut lk.username, lookup("LK_USERNAME"));
        override_with(&mut lk.password, lookup("LK_PASSWORD"));
        override_with(&mut lk.board_id, lookup("LK_BOARD_ID"));

        let asana = &mut self.asana;
        override_with(&mut asana.token, lookup("ASANA_PAT"));
        override_with(&mut asana.workspace_id, lookup("ASANA_WORKSPACE"));
        override_with(&mut asana.project_id, lookup("ASANA_PROJECT"));
        let fields = &mut asana.custom_fields;
        override_with(&mut fields.card_id, lookup("ASANA_CUSTOM_FIELD_LEANKIT_ID"));
        override_with(&mut fields.external_id, lookup("ASANA_CUSTOM_FIELD_EXTERNAL_ID"));
        override_with(&mut fields.url, lookup("ASANA_CUSTOM_FIELD_URL_ID"));
        override_with(&mut fields.task_type, lookup("ASANA_CUSTOM_FIELD_TASK_TYPE_ID"));
    }

    pub fn leankit_settings(&self) -> Result<LeanKitSettings, ConfigError> {
        let lk = &self.leankit;
        Ok(LeanKitSettings {
            host: required(&lk.host, "leankit.host", "LK_HOST")?,
            username: required(&lk.username, "leankit.username", "LK_USERNAME")?,
            password: required(&lk.password, "leankit.password", "LK_PASSWORD")?,
            board_id: required(&lk.board_id, "leankit.board_id", "LK_BOARD_ID")?,
            page_size: lk.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }

    pub fn asana_settings(&self) -> Result<AsanaSettings, ConfigError> {
        let a = &self.asana;
        let f = &a.custom_fields;
        Ok(AsanaSettings {
            token: required(&a.token, "asana.token", "ASANA_PAT")?,
            workspace_id: required(&a.workspace_id, "asana.workspace_id", "ASANA_WORKSPACE")?,
            project_id: required(&a.project_id, "asana.project_id", "ASANA_PROJECT")?,
            fields: CustomFieldIds {
                card_id: required(
                    &f.card_id,
                    "asana.custom_fields.card_id",
                    "ASANA_CUSTOM_FIELD_LEANKIT_ID",
                )?,
                external_id: required(
                    &f.external_id,
                    "asana.custom_fields.external_id",
                    "ASANA_CUSTOM_FIELD_EXTERNAL_ID",
                )?,
                url: required(&f.url, "asana.custom_fields.url", "ASANA_CUSTOM_FIELD_URL_ID")?,
                task_type: required(
                    &f.task_type,
                    "asana.custom_fields.task_type",
                    "ASANA_CUSTOM_FIELD_TASK_TYPE_ID",
                )?,
            },
        })
    }
}
