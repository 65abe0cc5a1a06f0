use crate::field_input::{self, FieldError};
use crate::model::{ConfigValue, Step, StepConfig};
use crate::registry::{FieldDescriptor, FieldKind, FieldRegistry};
use indexmap::IndexMap;

/// Working copy of a step's config while its fields are being edited.
///
/// Keys the registry does not describe are carried through untouched. A
/// field holding unparseable text keeps its last good value in the draft and
/// blocks `into_config` until it is corrected.
#[derive(Debug, Clone)]
pub struct ConfigDraft {
    step_type: String,
    fields: Vec<FieldDescriptor>,
    config: StepConfig,
    pending: IndexMap<String, (String, FieldError)>,
}

impl ConfigDraft {
    pub fn new(step: &Step, registry: &FieldRegistry) -> Self {
        Self {
            step_type: step.step_type.clone(),
            fields: registry.fields(&step.step_type).to_vec(),
            config: step.config.clone(),
            pending: IndexMap::new(),
        }
    }

    pub fn step_type(&self) -> &str {
        &self.step_type
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Text for a field: the rejected input while it is in error, otherwise
    /// the current value rendered for its kind.
    pub fn text(&self, name: &str) -> String {
        if let Some((raw, _)) = self.pending.get(name) {
            return raw.clone();
        }
        match self.field(name) {
            Some(field) => field.display_text(self.config.get(name)),
            None => String::new(),
        }
    }

    pub fn error(&self, name: &str) -> Option<&FieldError> {
        self.pending.get(name).map(|(_, err)| err)
    }

    pub fn has_errors(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn value(&self, name: &str) -> Option<&ConfigValue> {
        self.config.get(name)
    }

    /// Applies editor text to a field. Keys outside the registry are stored as
    /// plain strings.
    pub fn set_text(&mut self, name: &str, raw: &str) -> Result<(), FieldError> {
        let parsed = match self.field(name) {
            Some(field) => field.parse_input(raw),
            None => Ok(Some(ConfigValue::String(raw.to_string()))),
        };

        match parsed {
            Ok(value) => {
                self.pending.shift_remove(name);
                match value {
                    Some(value) => {
                        self.config.insert(name.to_string(), value);
                    }
                    None => {
                        self.config.shift_remove(name);
                    }
                }
                Ok(())
            }
            Err(err) => {
                log::debug!("field '{}' rejected input: {}", name, err);
                self.pending
                    .insert(name.to_string(), (raw.to_string(), err.clone()));
                Err(err)
            }
        }
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.pending.shift_remove(name);
        self.config.insert(name.to_string(), ConfigValue::Bool(value));
    }

    /// Adds an item to an array field; returns false when nothing was added.
    pub fn add_item(&mut self, name: &str, item: &str) -> bool {
        match field_input::add_item(self.config.get(name), item) {
            Some(list) => {
                self.config.insert(name.to_string(), list);
                true
            }
            None => false,
        }
    }

    pub fn remove_item(&mut self, name: &str, item: &str) {
        let list = field_input::remove_item(self.config.get(name), item);
        self.config.insert(name.to_string(), list);
    }

    pub fn items(&self, name: &str) -> Vec<String> {
        self.config
            .get(name)
            .map(ConfigValue::string_items)
            .unwrap_or_default()
    }

    /// Finished config, or the first field error still pending.
    pub fn into_config(self) -> Result<StepConfig, FieldError> {
        if let Some((_, (_, err))) = self.pending.into_iter().next() {
            return Err(err);
        }
        Ok(self.config)
    }

    fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_array_field(&self, name: &str) -> bool {
        matches!(self.field(name).map(|f| &f.kind), Some(FieldKind::Array))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::import_json;

    fn draft_for(doc: &str, step_id: &str) -> ConfigDraft {
        let t = import_json(doc).expect("import");
        let registry = FieldRegistry::builtin().expect("registry");
        ConfigDraft::new(t.step("1", step_id).expect("step"), &registry)
    }

    #[test]
    fn draft_keeps_unknown_keys() {
        let mut draft = draft_for(
            r#"{"name":"T","steps":{"1":{"0001_sendYarc":{"legacy":"x","sleep":10}}}}"#,
            "0001_sendYarc",
        );
        draft.set_text("endPoint", "QUEUE.IN").expect("text");
        draft.set_text("sleep", "250").expect("number");

        let config = draft.into_config().expect("config");
        assert_eq!(config.get("legacy"), Some(&ConfigValue::from("x")));
        assert_eq!(config.get("sleep"), Some(&ConfigValue::from(250i64)));
        assert_eq!(config.get("endPoint"), Some(&ConfigValue::from("QUEUE.IN")));
    }

    #[test]
    fn invalid_json_blocks_commit_until_corrected() {
        let mut draft = draft_for(
            r#"{"name":"T","steps":{"1":{"0001_checkOracle":{"replace":{"A":"1"}}}}}"#,
            "0001_checkOracle",
        );

        assert!(draft.set_text("replace", "{\"A\":").is_err());
        assert!(draft.has_errors());
        assert_eq!(draft.text("replace"), "{\"A\":");
        assert_eq!(
            draft.value("replace"),
            Some(&ConfigValue::from(serde_json::json!({"A": "1"})))
        );
        assert!(draft.clone().into_config().is_err());

        draft.set_text("replace", "{\"A\":\"2\"}").expect("json");
        assert!(!draft.has_errors());
        let config = draft.into_config().expect("config");
        assert_eq!(
            config.get("replace"),
            Some(&ConfigValue::from(serde_json::json!({"A": "2"})))
        );
    }

    #[test]
    fn empty_number_removes_key() {
        let mut draft = draft_for(
            r#"{"name":"T","steps":{"1":{"0001_sendYarc":{"sleep":10}}}}"#,
            "0001_sendYarc",
        );
        draft.set_text("sleep", "").expect("empty");
        assert!(draft.into_config().expect("config").get("sleep").is_none());
    }

    #[test]
    fn array_items_are_edited_one_at_a_time() {
        let mut draft = draft_for(
            r#"{"name":"T","steps":{"1":{"0001_alert":{}}}}"#,
            "0001_alert",
        );
        assert!(draft.is_array_field("forecasts"));
        assert!(draft.add_item("forecasts", "F1"));
        assert!(draft.add_item("forecasts", "F2"));
        assert!(!draft.add_item("forecasts", "F1"));
        draft.remove_item("forecasts", "F1");
        assert_eq!(draft.items("forecasts"), vec!["F2"]);
    }

    #[test]
    fn unknown_type_has_no_fields_but_keeps_config() {
        let draft = draft_for(
            r#"{"name":"T","steps":{"1":{"0001_custom":{"k":1}}}}"#,
            "0001_custom",
        );
        assert!(draft.fields().is_empty());
        assert_eq!(draft.step_type(), "custom");
        assert_eq!(draft.text("k"), "");
        assert_eq!(draft.into_config().expect("config").len(), 1);
    }
}
