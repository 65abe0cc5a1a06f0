//! Field registry: which config keys each step type exposes for editing.
//!
//! The registry is advisory. Step configs are never validated against it;
//! unknown types simply have no fields.

use serde::{Deserialize, Serialize};

const BUILTIN_SCHEMAS: [(&str, &str); 6] = [
    ("checkOracle", include_str!("schemas/checkOracle.json")),
    ("balanceAndPosition", include_str!("schemas/balanceAndPosition.json")),
    ("sendYarc", include_str!("schemas/sendYarc.json")),
    ("manualCrossing", include_str!("schemas/manualCrossing.json")),
    ("alert", include_str!("schemas/alert.json")),
    ("cleanData", include_str!("schemas/cleanData.json")),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Multiline,
    Json,
    /// List of strings edited one item at a time.
    Array,
    Boolean,
    Number,
    Enum { options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSchema {
    #[serde(rename = "type")]
    pub step_type: String,
    pub label: String,
    pub fields: Vec<FieldDescriptor>,
}

/// Entry of the add-step palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentManifest {
    pub step_type: String,
    pub label: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown step type: {0}")]
    UnknownType(String),

    #[error("failed to parse schema for '{step_type}': {source}")]
    InvalidSchema {
        step_type: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct FieldRegistry {
    schemas: Vec<StepSchema>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the schemas shipped with the crate.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for (step_type, json) in BUILTIN_SCHEMAS {
            let schema = serde_json::from_str::<StepSchema>(json).map_err(|source| {
                RegistryError::InvalidSchema {
                    step_type: step_type.to_string(),
                    source,
                }
            })?;
            registry.register(schema);
        }
        Ok(registry)
    }

    /// Parses a single step schema and registers it.
    pub fn register_json(&mut self, json: &str) -> Result<&StepSchema, RegistryError> {
        let schema: StepSchema =
            serde_json::from_str(json).map_err(|source| RegistryError::InvalidSchema {
                step_type: "<custom>".to_string(),
                source,
            })?;
        let step_type = schema.step_type.clone();
        self.register(schema);
        self.get(&step_type)
    }

    /// Adds a schema, replacing any schema already registered for its type.
    pub fn register(&mut self, schema: StepSchema) {
        match self
            .schemas
            .iter()
            .position(|s| s.step_type == schema.step_type)
        {
            Some(idx) => self.schemas[idx] = schema,
            None => self.schemas.push(schema),
        }
    }

    pub fn get(&self, step_type: &str) -> Result<&StepSchema, RegistryError> {
        self.schemas
            .iter()
            .find(|s| s.step_type == step_type)
            .ok_or_else(|| RegistryError::UnknownType(step_type.to_string()))
    }

    /// Editable fields for a type; empty for types the registry does not know.
    pub fn fields(&self, step_type: &str) -> &[FieldDescriptor] {
        self.get(step_type).map(|s| s.fields.as_slice()).unwrap_or(&[])
    }

    pub fn field(&self, step_type: &str, name: &str) -> Option<&FieldDescriptor> {
        self.fields(step_type).iter().find(|f| f.name == name)
    }

    pub fn components(&self) -> Vec<ComponentManifest> {
        self.schemas
            .iter()
            .map(|s| ComponentManifest {
                step_type: s.step_type.clone(),
                label: s.label.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_loads_all_schemas() {
        let r = FieldRegistry::builtin().expect("registry");
        let types: Vec<String> = r.components().into_iter().map(|c| c.step_type).collect();
        assert_eq!(
            types,
            vec![
                "checkOracle",
                "balanceAndPosition",
                "sendYarc",
                "manualCrossing",
                "alert",
                "cleanData"
            ]
        );
    }

    #[test]
    fn builtin_schema_file_matches_its_key() {
        let r = FieldRegistry::builtin().expect("registry");
        for (step_type, _) in BUILTIN_SCHEMAS {
            assert_eq!(r.get(step_type).expect("schema").step_type, step_type);
        }
    }

    #[test]
    fn fields_keep_declared_order_and_kinds() {
        let r = FieldRegistry::builtin().expect("registry");
        let names: Vec<&str> = r.fields("sendYarc").iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "_comment",
                "endPoint",
                "replace",
                "relativeDate",
                "replaceDate",
                "message",
                "sleep"
            ]
        );
        assert_eq!(r.field("sendYarc", "sleep").expect("field").kind, FieldKind::Number);
        assert_eq!(r.field("balanceAndPosition", "init").expect("field").kind, FieldKind::Boolean);
        assert_eq!(
            r.field("cleanData", "type").expect("field").kind,
            FieldKind::Enum {
                options: vec!["cleanAll".to_string(), "cleanPartial".to_string()]
            }
        );
    }

    #[test]
    fn unknown_type_has_no_fields() {
        let r = FieldRegistry::builtin().expect("registry");
        assert!(r.fields("somethingElse").is_empty());
        match r.get("somethingElse") {
            Err(RegistryError::UnknownType(t)) => assert_eq!(t, "somethingElse"),
            _ => panic!("expected UnknownType"),
        }
    }

    #[test]
    fn register_json_replaces_existing_type() {
        let mut r = FieldRegistry::builtin().expect("registry");
        let json = r#"{"type":"alert","label":"Alert v2","fields":[
            {"name":"level","label":"Level","kind":"number"}
        ]}"#;
        let schema = r.register_json(json).expect("register");
        assert_eq!(schema.label, "Alert v2");
        assert_eq!(r.fields("alert").len(), 1);
        assert_eq!(r.components().len(), 6);
    }

    #[test]
    fn register_json_rejects_unknown_kind() {
        let mut r = FieldRegistry::new();
        let json = r#"{"type":"x","label":"X","fields":[{"name":"a","label":"A","kind":"date"}]}"#;
        let err = r.register_json(json).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSchema { .. }));
    }
}
