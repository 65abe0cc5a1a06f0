//! Template model: steps grouped into phases under a named template.
//!
//! A `Template` can only be changed through the operations in `crate::edit`;
//! consumers get shared references through the accessors below.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name given to a template created from scratch when no settings override it.
pub const DEFAULT_TEMPLATE_NAME: &str = "New Template";

/// Flat step configuration, keys kept in insertion order.
pub type StepConfig = IndexMap<String, ConfigValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<ConfigValue>),
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String items of a list value; non-string items are skipped.
    pub fn string_items(&self) -> Vec<String> {
        match self {
            ConfigValue::List(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConfigValue::Null => serde_json::Value::Null,
            ConfigValue::Bool(b) => serde_json::Value::Bool(*b),
            ConfigValue::Number(n) => serde_json::Value::Number(n.clone()),
            ConfigValue::String(s) => serde_json::Value::String(s.clone()),
            ConfigValue::List(xs) => {
                serde_json::Value::Array(xs.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Map(m) => serde_json::Value::Object(config_to_object(m)),
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => ConfigValue::Number(n),
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(xs) => {
                ConfigValue::List(xs.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(m) => ConfigValue::Map(config_from_object(m)),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(n.into())
    }
}

/// Converts a JSON object into a step config, keeping its key order.
pub fn config_from_object(object: serde_json::Map<String, serde_json::Value>) -> StepConfig {
    object
        .into_iter()
        .map(|(k, v)| (k, ConfigValue::from(v)))
        .collect()
}

pub fn config_to_object(config: &StepConfig) -> serde_json::Map<String, serde_json::Value> {
    config.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

/// One configurable unit of work inside a phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: String,
    pub order: u32,
    pub config: StepConfig,
}

impl Step {
    /// Canonical id for a step: zero-padded order, underscore, type.
    pub fn canonical_id(order: u32, step_type: &str) -> String {
        format!("{:04}_{}", order, step_type)
    }

    /// Type encoded in a step key: everything after the first underscore.
    pub fn type_from_id(id: &str) -> String {
        id.split('_').skip(1).collect::<Vec<_>>().join("_")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phase {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    steps: IndexMap<String, Step>,
}

impl Phase {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            steps: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn steps(&self) -> &IndexMap<String, Step> {
        &self.steps
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.get(step_id)
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Highest step order in the phase, 0 when empty.
    pub fn max_order(&self) -> u32 {
        self.steps.values().map(|s| s.order).max().unwrap_or(0)
    }

    pub(crate) fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub(crate) fn steps_mut(&mut self) -> &mut IndexMap<String, Step> {
        &mut self.steps
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    name: String,
    phases: IndexMap<String, Phase>,
}

impl Default for Template {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_NAME)
    }
}

impl Template {
    /// Empty template: a single phase `"1"` with no steps.
    pub fn new(name: impl Into<String>) -> Self {
        let mut phases = IndexMap::new();
        phases.insert("1".to_string(), Phase::new("1"));
        Self {
            name: name.into(),
            phases,
        }
    }

    /// Builds a template from phases, ranking them and restoring the
    /// at-least-one-phase invariant.
    pub(crate) fn from_phases(name: impl Into<String>, phases: Vec<Phase>) -> Self {
        let mut template = Self {
            name: name.into(),
            phases: phases.into_iter().map(|p| (p.id.clone(), p)).collect(),
        };
        if template.phases.is_empty() {
            template.phases.insert("1".to_string(), Phase::new("1"));
        }
        template.rank_phases();
        template
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> impl Iterator<Item = &Phase> {
        self.phases.values()
    }

    pub fn phase_ids(&self) -> impl Iterator<Item = &str> {
        self.phases.keys().map(String::as_str)
    }

    pub fn phase(&self, phase_id: &str) -> Option<&Phase> {
        self.phases.get(phase_id)
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn contains_phase(&self, phase_id: &str) -> bool {
        self.phases.contains_key(phase_id)
    }

    pub fn step(&self, phase_id: &str, step_id: &str) -> Option<&Step> {
        self.phases.get(phase_id).and_then(|p| p.step(step_id))
    }

    /// First phase by rank; the selection fallback after a phase is removed.
    pub fn first_phase_id(&self) -> Option<&str> {
        self.phases.keys().next().map(String::as_str)
    }

    pub fn step_count(&self) -> usize {
        self.phases.values().map(|p| p.steps.len()).sum()
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn phase_mut(&mut self, phase_id: &str) -> Option<&mut Phase> {
        self.phases.get_mut(phase_id)
    }

    /// Adds a phase under a fresh id. An existing phase is never replaced;
    /// returns false when the id was already taken.
    pub(crate) fn insert_phase(&mut self, phase: Phase) -> bool {
        if self.phases.contains_key(&phase.id) {
            return false;
        }
        self.phases.insert(phase.id.clone(), phase);
        self.rank_phases();
        true
    }

    pub(crate) fn remove_phase(&mut self, phase_id: &str) -> Option<Phase> {
        self.phases.shift_remove(phase_id)
    }

    fn rank_phases(&mut self) {
        // Stable: non-numeric ids keep their encounter order after the numeric ones.
        self.phases.sort_by(|a, _, b, _| phase_rank(a).cmp(&phase_rank(b)));
    }
}

/// Sort key for phase ids: numeric ids ascend first, the rest tie after them.
pub fn phase_rank(phase_id: &str) -> (bool, u64) {
    match phase_id.parse::<u64>() {
        Ok(n) => (false, n),
        Err(_) => (true, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_template_has_single_empty_phase() {
        let t = Template::new("Demo");
        assert_eq!(t.name(), "Demo");
        assert_eq!(t.phase_ids().collect::<Vec<_>>(), vec!["1"]);
        assert!(t.phase("1").expect("phase").is_empty());
    }

    #[test]
    fn phases_rank_numerically_then_by_encounter() {
        let t = Template::from_phases(
            "T",
            vec![
                Phase::new("10"),
                Phase::new("beta"),
                Phase::new("2"),
                Phase::new("alpha"),
                Phase::new("1"),
            ],
        );
        assert_eq!(
            t.phase_ids().collect::<Vec<_>>(),
            vec!["1", "2", "10", "beta", "alpha"]
        );
        assert_eq!(t.first_phase_id(), Some("1"));
    }

    #[test]
    fn empty_phase_list_restores_default_phase() {
        let t = Template::from_phases("T", Vec::new());
        assert_eq!(t.phase_count(), 1);
        assert!(t.contains_phase("1"));
    }

    #[test]
    fn insert_phase_refuses_taken_id() {
        let mut t = Template::new("T");
        t.phase_mut("1").expect("phase").set_name(Some("Setup".to_string()));

        assert!(!t.insert_phase(Phase::new("1")));
        assert_eq!(t.phase("1").and_then(Phase::name), Some("Setup"));
        assert!(t.insert_phase(Phase::new("2")));
        assert_eq!(t.phase_count(), 2);
    }

    #[test]
    fn canonical_id_pads_order_to_four_digits() {
        assert_eq!(Step::canonical_id(11, "checkOracle"), "0011_checkOracle");
        assert_eq!(Step::canonical_id(12345, "alert"), "12345_alert");
    }

    #[test]
    fn type_from_id_drops_first_segment() {
        assert_eq!(Step::type_from_id("0007_sendYarc"), "sendYarc");
        assert_eq!(Step::type_from_id("0001_clean_data"), "clean_data");
        assert_eq!(Step::type_from_id("noUnderscore"), "");
    }

    #[test]
    fn config_value_serializes_as_plain_json() {
        let mut nested = IndexMap::new();
        nested.insert("DATE".to_string(), ConfigValue::from("1_wednesday"));

        let mut config = StepConfig::new();
        config.insert("table".to_string(), ConfigValue::from("ORDERS"));
        config.insert("init".to_string(), ConfigValue::from(true));
        config.insert("sleep".to_string(), ConfigValue::from(500i64));
        config.insert(
            "replaceDate".to_string(),
            ConfigValue::List(vec![ConfigValue::from("YYYYMMDD")]),
        );
        config.insert("replace".to_string(), ConfigValue::Map(nested));

        let json = serde_json::to_string(&config).expect("serialize");
        assert_eq!(
            json,
            r#"{"table":"ORDERS","init":true,"sleep":500,"replaceDate":["YYYYMMDD"],"replace":{"DATE":"1_wednesday"}}"#
        );

        let decoded: StepConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, config);
    }

    #[test]
    fn integer_and_float_numbers_stay_distinct() {
        let value = ConfigValue::from(serde_json::json!({"a": 1, "b": 1.5}));
        assert_eq!(value.to_json(), serde_json::json!({"a": 1, "b": 1.5}));
    }
}
