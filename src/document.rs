use crate::model::{config_from_object, Phase, Step, StepConfig, Template};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// External document: `{ name, steps: { phaseId: { stepId: config } } }`.
///
/// Only step configs travel in the document; step type and order are
/// re-derived on import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDocument {
    pub name: String,
    pub steps: IndexMap<String, IndexMap<String, StepConfig>>,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document is not valid JSON: {0}")]
    Unparseable(#[from] serde_json::Error),

    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Parses document text into a fresh template.
pub fn import_json(text: &str) -> Result<Template, DocumentError> {
    let value: Value = serde_json::from_str(text)?;
    import_value(value)
}

/// Builds a template from a parsed document.
///
/// Step order comes from each step's position inside its phase (1-based),
/// never from the numeric prefix of its key, and the type is the key with
/// its first `_`-separated segment removed.
pub fn import_value(value: Value) -> Result<Template, DocumentError> {
    let Value::Object(mut root) = value else {
        return Err(DocumentError::Malformed("document root must be an object".to_string()));
    };

    let name = match root.remove("name") {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(DocumentError::Malformed(format!(
                "'name' should be a string, got {}",
                other
            )))
        }
        None => return Err(DocumentError::Malformed("missing 'name' field".to_string())),
    };

    let phases_value = match root.remove("steps") {
        Some(Value::Object(phases)) => phases,
        Some(other) => {
            return Err(DocumentError::Malformed(format!(
                "'steps' should be an object, got {}",
                other
            )))
        }
        None => return Err(DocumentError::Malformed("missing 'steps' field".to_string())),
    };

    let mut phases = Vec::with_capacity(phases_value.len());
    for (phase_id, steps_value) in phases_value {
        let Value::Object(steps) = steps_value else {
            return Err(DocumentError::Malformed(format!(
                "phase '{}' should be an object",
                phase_id
            )));
        };

        let mut phase = Phase::new(phase_id.clone());
        for (idx, (step_id, config_value)) in steps.into_iter().enumerate() {
            let Value::Object(config) = config_value else {
                return Err(DocumentError::Malformed(format!(
                    "step '{}' in phase '{}' should be an object",
                    step_id, phase_id
                )));
            };

            let step = Step {
                step_type: Step::type_from_id(&step_id),
                order: u32::try_from(idx + 1).unwrap_or(u32::MAX),
                config: config_from_object(config),
                id: step_id.clone(),
            };
            phase.steps_mut().insert(step_id, step);
        }
        phases.push(phase);
    }

    let template = Template::from_phases(name, phases);
    log::info!(
        "imported template '{}' ({} phases, {} steps)",
        template.name(),
        template.phase_count(),
        template.step_count()
    );
    Ok(template)
}

/// Drops everything but the step configs; keys are reused verbatim.
pub fn export_document(template: &Template) -> TemplateDocument {
    let steps = template
        .phases()
        .map(|phase| {
            let configs = phase
                .steps()
                .iter()
                .map(|(step_id, step)| (step_id.clone(), step.config.clone()))
                .collect::<IndexMap<_, _>>();
            (phase.id().to_string(), configs)
        })
        .collect();

    TemplateDocument {
        name: template.name().to_string(),
        steps,
    }
}

/// Pretty-printed export with 2-space indentation.
pub fn export_json(template: &Template) -> Result<String, DocumentError> {
    Ok(serde_json::to_string_pretty(&export_document(template))?)
}

pub fn export_value(template: &Template) -> Result<Value, DocumentError> {
    Ok(serde_json::to_value(export_document(template))?)
}
