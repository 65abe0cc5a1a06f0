//! Phase-grouped, ordered view of a template for list and graph renderers.

use crate::model::Template;
use serde::Serialize;

/// Background colors cycled across phases.
pub const PHASE_COLORS: [&str; 7] = [
    "#ffe0b2", // orange
    "#e3f2fd", // blue
    "#c8e6c9", // green
    "#f8bbd0", // pink
    "#fff9c4", // yellow
    "#d1c4e9", // purple
    "#b2dfdb", // teal
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub phase_id: String,
    pub step_id: String,
    pub step_type: String,
    pub order: u32,
    pub label: String,
    pub color_index: usize,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseView {
    pub phase_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub color_index: usize,
    pub color: &'static str,
    pub steps: Vec<StepView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewProjection {
    pub phases: Vec<PhaseView>,
}

impl ViewProjection {
    /// All steps, phase by phase, each phase in step order.
    pub fn steps(&self) -> impl Iterator<Item = &StepView> {
        self.phases.iter().flat_map(|p| p.steps.iter())
    }

    /// Edges linking each step to the next one in the flattened sequence.
    pub fn edges(&self) -> Vec<FlowEdge> {
        let steps: Vec<&StepView> = self.steps().collect();
        steps
            .windows(2)
            .map(|pair| FlowEdge {
                id: format!("e{}-{}", pair[0].step_id, pair[1].step_id),
                source: pair[0].step_id.clone(),
                target: pair[1].step_id.clone(),
            })
            .collect()
    }

    pub fn phase(&self, phase_id: &str) -> Option<&PhaseView> {
        self.phases.iter().find(|p| p.phase_id == phase_id)
    }
}

pub fn project(template: &Template, selected_step_id: Option<&str>) -> ViewProjection {
    let phases = template
        .phases()
        .enumerate()
        .map(|(idx, phase)| {
            let color_index = idx % PHASE_COLORS.len();

            let mut steps: Vec<_> = phase.steps().values().collect();
            // sort_by_key is stable: equal orders keep map order.
            steps.sort_by_key(|s| s.order);

            PhaseView {
                phase_id: phase.id().to_string(),
                name: phase.name().map(str::to_string),
                color_index,
                color: PHASE_COLORS[color_index],
                steps: steps
                    .into_iter()
                    .map(|step| StepView {
                        phase_id: phase.id().to_string(),
                        step_id: step.id.clone(),
                        step_type: step.step_type.clone(),
                        order: step.order,
                        label: format!("{}. {}", step.order, step.step_type),
                        color_index,
                        highlighted: selected_step_id == Some(step.id.as_str()),
                    })
                    .collect(),
            }
        })
        .collect();

    ViewProjection { phases }
}
