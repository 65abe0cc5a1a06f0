//! Editing session
//!
//! Owns the current template together with the selection and favorites. All
//! writes go through `crate::edit`; the selection is reconciled afterwards and
//! the view is re-derived on demand with `projection()`.

use crate::document;
use crate::edit::{self, EditError};
use crate::errors::AppError;
use crate::favorites::{FavoriteComponent, FavoriteTemplate, Favorites};
use crate::model::{StepConfig, Template};
use crate::projection::{self, ViewProjection};
use crate::settings::EditorSettings;
use chrono::Utc;

#[derive(Debug, Clone)]
pub struct EditorSession {
    template: Template,
    selected_phase: String,
    selected_step: Option<String>,
    favorites: Favorites,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(Template::default())
    }
}

impl EditorSession {
    pub fn new(template: Template) -> Self {
        let selected_phase = template.first_phase_id().unwrap_or("1").to_string();
        Self {
            template,
            selected_phase,
            selected_step: None,
            favorites: Favorites::new(),
        }
    }

    pub fn with_settings(settings: &EditorSettings) -> Self {
        Self::new(Template::new(settings.default_template_name.clone()))
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn selected_phase(&self) -> &str {
        &self.selected_phase
    }

    pub fn selected_step(&self) -> Option<&str> {
        self.selected_step.as_deref()
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn projection(&self) -> ViewProjection {
        projection::project(&self.template, self.selected_step.as_deref())
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.template = edit::rename_template(&self.template, name);
    }

    pub fn rename_phase(&mut self, phase_id: &str, name: Option<String>) -> Result<(), EditError> {
        let updated = edit::rename_phase(&self.template, phase_id, name).map_err(rejected)?;
        self.template = updated;
        Ok(())
    }

    /// Adds a phase and selects it.
    pub fn add_phase(&mut self) -> String {
        let (updated, phase_id) = edit::add_phase(&self.template);
        self.template = updated;
        self.selected_phase = phase_id.clone();
        self.selected_step = None;
        phase_id
    }

    pub fn select_phase(&mut self, phase_id: &str) -> Result<(), EditError> {
        if !self.template.contains_phase(phase_id) {
            return Err(rejected(EditError::PhaseNotFound(phase_id.to_string())));
        }
        self.selected_phase = phase_id.to_string();
        self.selected_step = None;
        Ok(())
    }

    /// Selects a step of the selected phase; selecting it again clears the
    /// selection.
    pub fn toggle_step(&mut self, step_id: &str) -> Result<(), EditError> {
        if self.template.step(&self.selected_phase, step_id).is_none() {
            return Err(rejected(EditError::StepNotFound {
                phase_id: self.selected_phase.clone(),
                step_id: step_id.to_string(),
            }));
        }
        if self.selected_step.as_deref() == Some(step_id) {
            self.selected_step = None;
        } else {
            self.selected_step = Some(step_id.to_string());
        }
        Ok(())
    }

    /// Selects a step in any phase, moving the phase selection with it.
    pub fn select_step(&mut self, phase_id: &str, step_id: &str) -> Result<(), EditError> {
        if self.template.step(phase_id, step_id).is_none() {
            return Err(rejected(EditError::StepNotFound {
                phase_id: phase_id.to_string(),
                step_id: step_id.to_string(),
            }));
        }
        self.selected_phase = phase_id.to_string();
        self.selected_step = Some(step_id.to_string());
        Ok(())
    }

    /// Appends a step of `step_type` to the selected phase.
    pub fn add_step(&mut self, step_type: &str) -> Result<String, EditError> {
        let (updated, step_id) =
            edit::add_step(&self.template, &self.selected_phase, step_type).map_err(rejected)?;
        self.template = updated;
        Ok(step_id)
    }

    pub fn delete_step(&mut self, phase_id: &str, step_id: &str) -> Result<(), EditError> {
        let updated = edit::delete_step(&self.template, phase_id, step_id).map_err(rejected)?;
        self.template = updated;
        if phase_id == self.selected_phase && self.selected_step.as_deref() == Some(step_id) {
            self.selected_step = None;
        }
        Ok(())
    }

    /// Deletes a phase. When it was selected, the selection moves to the first
    /// remaining phase.
    pub fn delete_phase(&mut self, phase_id: &str) -> Result<(), EditError> {
        let updated = edit::delete_phase(&self.template, phase_id).map_err(rejected)?;
        self.template = updated;
        if self.selected_phase == phase_id {
            self.selected_phase = self
                .template
                .first_phase_id()
                .unwrap_or("1")
                .to_string();
            self.selected_step = None;
        }
        Ok(())
    }

    /// Replaces the config of the selected step.
    pub fn update_selected_config(&mut self, config: StepConfig) -> Result<(), EditError> {
        let Some(step_id) = self.selected_step.clone() else {
            return Err(rejected(EditError::StepNotFound {
                phase_id: self.selected_phase.clone(),
                step_id: String::new(),
            }));
        };
        let phase_id = self.selected_phase.clone();
        self.update_step_config(&phase_id, &step_id, config)
    }

    pub fn update_step_config(
        &mut self,
        phase_id: &str,
        step_id: &str,
        config: StepConfig,
    ) -> Result<(), EditError> {
        let updated =
            edit::update_step_config(&self.template, phase_id, step_id, config).map_err(rejected)?;
        self.template = updated;
        Ok(())
    }

    /// Replaces the template with an imported document. On failure the
    /// current template and selection are kept.
    pub fn import_json(&mut self, text: &str) -> Result<(), AppError> {
        let template = document::import_json(text).map_err(|err| {
            log::warn!("import rejected: {}", err);
            AppError::from(err)
        })?;
        self.load(template);
        Ok(())
    }

    pub fn load(&mut self, template: Template) {
        self.selected_phase = template.first_phase_id().unwrap_or("1").to_string();
        self.selected_step = None;
        self.template = template;
    }

    pub fn export_json(&self) -> Result<String, AppError> {
        Ok(document::export_json(&self.template)?)
    }

    /// Saves a step as a favorite component under `name`.
    pub fn save_favorite_component(
        &mut self,
        name: &str,
        phase_id: &str,
        step_id: &str,
    ) -> Result<(), EditError> {
        let step = self.template.step(phase_id, step_id).ok_or_else(|| {
            rejected(EditError::StepNotFound {
                phase_id: phase_id.to_string(),
                step_id: step_id.to_string(),
            })
        })?;
        self.favorites
            .save_component(FavoriteComponent::from_step(name, step));
        Ok(())
    }

    /// Saves the steps of a phase, in step order, as a favorite template.
    pub fn save_favorite_phase(&mut self, name: &str, phase_id: &str) -> Result<(), EditError> {
        let phase = self
            .template
            .phase(phase_id)
            .ok_or_else(|| rejected(EditError::PhaseNotFound(phase_id.to_string())))?;
        let mut steps: Vec<_> = phase.steps().values().cloned().collect();
        steps.sort_by_key(|s| s.order);
        self.favorites.save_template(FavoriteTemplate {
            name: name.to_string(),
            steps,
            saved_at: Utc::now(),
        });
        Ok(())
    }

    /// Inserts a favorite component into the selected phase as a new step.
    /// Returns `Ok(None)` when no favorite has that name.
    pub fn insert_favorite(&mut self, name: &str) -> Result<Option<String>, EditError> {
        let Some(favorite) = self.favorites.component(name).cloned() else {
            return Ok(None);
        };
        let (updated, step_id) = edit::add_step_with_config(
            &self.template,
            &self.selected_phase,
            &favorite.step_type,
            favorite.config,
        )
        .map_err(rejected)?;
        self.template = updated;
        Ok(Some(step_id))
    }

    pub fn favorites_mut(&mut self) -> &mut Favorites {
        &mut self.favorites
    }
}

fn rejected(err: EditError) -> EditError {
    log::warn!("edit rejected: {}", err);
    err
}
