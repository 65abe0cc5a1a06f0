//! Saved step presets and step sequences, kept for the lifetime of a session.

use crate::model::{Step, StepConfig};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A step type with a preset config, inserted as a new step on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteComponent {
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: String,
    pub config: StepConfig,
    pub saved_at: DateTime<Utc>,
}

impl FavoriteComponent {
    pub fn from_step(name: impl Into<String>, step: &Step) -> Self {
        Self {
            name: name.into(),
            step_type: step.step_type.clone(),
            config: step.config.clone(),
            saved_at: Utc::now(),
        }
    }
}

/// Snapshot of a phase's steps, in step order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteTemplate {
    pub name: String,
    pub steps: Vec<Step>,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Favorites {
    components: Vec<FavoriteComponent>,
    templates: Vec<FavoriteTemplate>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn components(&self) -> &[FavoriteComponent] {
        &self.components
    }

    pub fn templates(&self) -> &[FavoriteTemplate] {
        &self.templates
    }

    pub fn component(&self, name: &str) -> Option<&FavoriteComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    pub fn template(&self, name: &str) -> Option<&FavoriteTemplate> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Saves a component; a favorite with the same name is replaced.
    pub fn save_component(&mut self, favorite: FavoriteComponent) {
        self.components.retain(|c| c.name != favorite.name);
        self.components.push(favorite);
    }

    pub fn save_template(&mut self, favorite: FavoriteTemplate) {
        self.templates.retain(|t| t.name != favorite.name);
        self.templates.push(favorite);
    }

    pub fn remove_component(&mut self, name: &str) -> bool {
        let before = self.components.len();
        self.components.retain(|c| c.name != name);
        self.components.len() != before
    }

    pub fn remove_template(&mut self, name: &str) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| t.name != name);
        self.templates.len() != before
    }
}
