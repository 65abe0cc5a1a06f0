//! Converts text typed into a config field editor into config values.

use crate::model::ConfigValue;
use crate::registry::{FieldDescriptor, FieldKind};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("invalid value for field '{field}': expected {expected}, got '{input}'")]
    InvalidValue {
        field: String,
        expected: String,
        input: String,
    },
}

impl FieldDescriptor {
    /// Parses editor text for this field.
    ///
    /// `Ok(None)` means the key should be removed from the config (an empty
    /// number field).
    pub fn parse_input(&self, raw: &str) -> Result<Option<ConfigValue>, FieldError> {
        match &self.kind {
            FieldKind::Text | FieldKind::Multiline => {
                Ok(Some(ConfigValue::String(raw.to_string())))
            }
            FieldKind::Json => serde_json::from_str::<serde_json::Value>(raw)
                .map(|v| Some(ConfigValue::from(v)))
                .map_err(|_| self.invalid("JSON", raw)),
            FieldKind::Number => parse_number(raw).ok_or_else(|| self.invalid("a number", raw)),
            FieldKind::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Some(ConfigValue::Bool(true))),
                "false" => Ok(Some(ConfigValue::Bool(false))),
                _ => Err(self.invalid("true or false", raw)),
            },
            FieldKind::Enum { options } => {
                if options.iter().any(|o| o == raw) {
                    Ok(Some(ConfigValue::String(raw.to_string())))
                } else {
                    Err(self.invalid(&format!("one of [{}]", options.join(", ")), raw))
                }
            }
            FieldKind::Array => {
                let items = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .fold(Vec::<String>::new(), |mut acc, item| {
                        if !acc.iter().any(|a| a == item) {
                            acc.push(item.to_string());
                        }
                        acc
                    });
                Ok(Some(ConfigValue::List(
                    items.into_iter().map(ConfigValue::String).collect(),
                )))
            }
        }
    }

    /// Text shown in the editor; missing keys render as the kind's default.
    pub fn display_text(&self, value: Option<&ConfigValue>) -> String {
        match (&self.kind, value) {
            (FieldKind::Json, None) => "{}".to_string(),
            (FieldKind::Json, Some(v)) => {
                serde_json::to_string_pretty(&v.to_json()).unwrap_or_default()
            }
            (FieldKind::Boolean, v) => v
                .and_then(ConfigValue::as_bool)
                .unwrap_or(false)
                .to_string(),
            (FieldKind::Array, v) => v
                .map(ConfigValue::string_items)
                .unwrap_or_default()
                .join(", "),
            (_, None) | (_, Some(ConfigValue::Null)) => String::new(),
            (_, Some(ConfigValue::String(s))) => s.clone(),
            (_, Some(other)) => other.to_json().to_string(),
        }
    }

    fn invalid(&self, expected: &str, input: &str) -> FieldError {
        FieldError::InvalidValue {
            field: self.name.clone(),
            expected: expected.to_string(),
            input: input.to_string(),
        }
    }
}

fn parse_number(raw: &str) -> Option<Option<ConfigValue>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(None);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Some(ConfigValue::Number(n.into())));
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return Some(Some(ConfigValue::Number(n.into())));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(|n| Some(ConfigValue::Number(n)))
}

/// Appends a trimmed item to a string list. Returns `None` when the item is
/// blank or already present.
pub fn add_item(current: Option<&ConfigValue>, item: &str) -> Option<ConfigValue> {
    let item = item.trim();
    let mut items = current.map(ConfigValue::string_items).unwrap_or_default();
    if item.is_empty() || items.iter().any(|i| i == item) {
        return None;
    }
    items.push(item.to_string());
    Some(ConfigValue::List(items.into_iter().map(ConfigValue::String).collect()))
}

/// Removes every entry equal to `item`.
pub fn remove_item(current: Option<&ConfigValue>, item: &str) -> ConfigValue {
    let items = current.map(ConfigValue::string_items).unwrap_or_default();
    ConfigValue::List(
        items
            .into_iter()
            .filter(|i| i != item)
            .map(ConfigValue::String)
            .collect(),
    )
}
