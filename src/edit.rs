use crate::model::{phase_rank, Phase, Step, StepConfig, Template};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("phase not found: {0}")]
    PhaseNotFound(String),

    #[error("step '{step_id}' not found in phase '{phase_id}'")]
    StepNotFound { phase_id: String, step_id: String },

    #[error("cannot delete phase '{0}': a template needs at least one phase")]
    LastPhase(String),
}

/// Appends an empty phase keyed one past the highest numeric phase id.
pub fn add_phase(template: &Template) -> (Template, String) {
    let mut next = template
        .phase_ids()
        .filter_map(|id| match phase_rank(id) {
            (false, n) => Some(u128::from(n) + 1),
            _ => None,
        })
        .max()
        .unwrap_or(1);
    // Past u64 the id no longer ranks as numeric and may clash with a named phase.
    while template.contains_phase(&next.to_string()) {
        next += 1;
    }
    let phase_id = next.to_string();

    let mut updated = template.clone();
    if !updated.insert_phase(Phase::new(phase_id.clone())) {
        log::warn!("phase {} already present, left unchanged", phase_id);
    }
    log::debug!("added phase {}", phase_id);
    (updated, phase_id)
}

/// Appends a step of `step_type` with an empty config.
pub fn add_step(
    template: &Template,
    phase_id: &str,
    step_type: &str,
) -> Result<(Template, String), EditError> {
    add_step_with_config(template, phase_id, step_type, StepConfig::new())
}

pub fn add_step_with_config(
    template: &Template,
    phase_id: &str,
    step_type: &str,
    config: StepConfig,
) -> Result<(Template, String), EditError> {
    let phase = template
        .phase(phase_id)
        .ok_or_else(|| EditError::PhaseNotFound(phase_id.to_string()))?;

    let order = phase.max_order().saturating_add(1);
    let step_id = Step::canonical_id(order, step_type);

    let mut updated = template.clone();
    if let Some(phase) = updated.phase_mut(phase_id) {
        // Imported ids are kept verbatim, so the derived key can already be in use.
        if let Some(replaced) = phase.steps_mut().shift_remove(&step_id) {
            log::warn!(
                "step {} in phase {} replaced by new {} step",
                replaced.id,
                phase_id,
                step_type
            );
        }
        phase.steps_mut().insert(
            step_id.clone(),
            Step {
                id: step_id.clone(),
                step_type: step_type.to_string(),
                order,
                config,
            },
        );
    }
    log::debug!("added step {} to phase {}", step_id, phase_id);
    Ok((updated, step_id))
}

/// Removes a step; sibling orders are left as they are.
pub fn delete_step(
    template: &Template,
    phase_id: &str,
    step_id: &str,
) -> Result<Template, EditError> {
    require_step(template, phase_id, step_id)?;

    let mut updated = template.clone();
    if let Some(phase) = updated.phase_mut(phase_id) {
        phase.steps_mut().shift_remove(step_id);
    }
    log::debug!("deleted step {} from phase {}", step_id, phase_id);
    Ok(updated)
}

/// Removes a phase with all of its steps. The last remaining phase is kept.
pub fn delete_phase(template: &Template, phase_id: &str) -> Result<Template, EditError> {
    if !template.contains_phase(phase_id) {
        return Err(EditError::PhaseNotFound(phase_id.to_string()));
    }
    if template.phase_count() == 1 {
        return Err(EditError::LastPhase(phase_id.to_string()));
    }

    let mut updated = template.clone();
    updated.remove_phase(phase_id);
    log::debug!("deleted phase {}", phase_id);
    Ok(updated)
}

/// Replaces a step's config wholesale. Id, type and order are untouched.
pub fn update_step_config(
    template: &Template,
    phase_id: &str,
    step_id: &str,
    config: StepConfig,
) -> Result<Template, EditError> {
    require_step(template, phase_id, step_id)?;

    let mut updated = template.clone();
    if let Some(step) = updated
        .phase_mut(phase_id)
        .and_then(|p| p.steps_mut().get_mut(step_id))
    {
        step.config = config;
    }
    log::debug!("updated config of step {} in phase {}", step_id, phase_id);
    Ok(updated)
}

pub fn rename_template(template: &Template, name: impl Into<String>) -> Template {
    let mut updated = template.clone();
    updated.set_name(name.into());
    updated
}

/// Sets or clears a phase's display name. Blank names clear it.
pub fn rename_phase(
    template: &Template,
    phase_id: &str,
    name: Option<String>,
) -> Result<Template, EditError> {
    if !template.contains_phase(phase_id) {
        return Err(EditError::PhaseNotFound(phase_id.to_string()));
    }

    let name = name.filter(|n| !n.trim().is_empty());
    let mut updated = template.clone();
    if let Some(phase) = updated.phase_mut(phase_id) {
        phase.set_name(name);
    }
    Ok(updated)
}

fn require_step(template: &Template, phase_id: &str, step_id: &str) -> Result<(), EditError> {
    let phase = template
        .phase(phase_id)
        .ok_or_else(|| EditError::PhaseNotFound(phase_id.to_string()))?;
    if phase.step(step_id).is_none() {
        return Err(EditError::StepNotFound {
            phase_id: phase_id.to_string(),
            step_id: step_id.to_string(),
        });
    }
    Ok(())
}
