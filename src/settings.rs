//! Editor settings
//!
//! Stored as JSON at `~/.jsongenie/settings.json`. Missing fields take their
//! defaults; an unreadable file falls back to the defaults with a warning.

use crate::model::DEFAULT_TEMPLATE_NAME;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    /// Name given to templates created from scratch
    #[serde(default = "default_template_name")]
    pub default_template_name: String,
    /// File stem used when a template has a blank name
    #[serde(default = "default_export_stem")]
    pub default_export_stem: String,
    /// Directory for exported files; the download directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

fn default_template_name() -> String {
    DEFAULT_TEMPLATE_NAME.to_string()
}

fn default_export_stem() -> String {
    "template".to_string()
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_template_name: default_template_name(),
            default_export_stem: default_export_stem(),
            export_dir: None,
        }
    }
}

impl EditorSettings {
    /// `~/.jsongenie/settings.json`, or `None` when there is no home directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".jsongenie").join("settings.json"))
    }

    /// Loads settings from the default location.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("no home directory, using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<EditorSettings>(&content) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "failed to parse settings, using defaults. path: {}, error: {}",
                    path.display(),
                    err
                );
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
        Ok(())
    }
}
