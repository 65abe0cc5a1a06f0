use crate::document::DocumentError;
use crate::edit::EditError;
use crate::field_input::FieldError;
use crate::registry::RegistryError;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MalformedDocument,
    UnparseableDocumentText,
    InvalidOperation,
    InvalidFieldValue,
    Registry,
    Io,
}

/// Error surfaced to the presentation layer. Every variant is recoverable:
/// the operation that produced it made no state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl AppError {
    pub fn io(err: anyhow::Error) -> Self {
        Self {
            kind: ErrorKind::Io,
            message: format!("{:#}", err),
            details: None,
            code: Some("io".to_string()),
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Malformed(detail) => Self {
                kind: ErrorKind::MalformedDocument,
                message: "the document does not have the expected format".to_string(),
                details: Some(detail),
                code: Some("malformed_document".to_string()),
            },
            DocumentError::Unparseable(source) => Self {
                kind: ErrorKind::UnparseableDocumentText,
                message: "the document could not be read as JSON".to_string(),
                details: Some(source.to_string()),
                code: Some("unparseable_document_text".to_string()),
            },
        }
    }
}

impl From<EditError> for AppError {
    fn from(err: EditError) -> Self {
        let code = match err {
            EditError::PhaseNotFound(_) => "phase_not_found",
            EditError::StepNotFound { .. } => "step_not_found",
            EditError::LastPhase(_) => "last_phase",
        };
        Self {
            kind: ErrorKind::InvalidOperation,
            message: err.to_string(),
            details: None,
            code: Some(code.to_string()),
        }
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        let details = match &err {
            FieldError::InvalidValue { field, .. } => Some(field.clone()),
        };
        Self {
            kind: ErrorKind::InvalidFieldValue,
            message: err.to_string(),
            details,
            code: Some("invalid_field_value".to_string()),
        }
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        Self {
            kind: ErrorKind::Registry,
            message: err.to_string(),
            details: None,
            code: Some("registry".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_document_errors_to_kind() {
        let e: AppError = crate::document::import_json("{}").unwrap_err().into();
        assert_eq!(e.kind, ErrorKind::MalformedDocument);
        assert_eq!(e.code.as_deref(), Some("malformed_document"));

        let e: AppError = crate::document::import_json("nope").unwrap_err().into();
        assert_eq!(e.kind, ErrorKind::UnparseableDocumentText);
    }

    #[test]
    fn maps_edit_errors_to_invalid_operation() {
        let e: AppError = EditError::LastPhase("1".to_string()).into();
        assert_eq!(e.kind, ErrorKind::InvalidOperation);
        assert_eq!(e.code.as_deref(), Some("last_phase"));
    }

    #[test]
    fn serializes_kind_in_snake_case() {
        let e: AppError = FieldError::InvalidValue {
            field: "sleep".to_string(),
            expected: "a number".to_string(),
            input: "x".to_string(),
        }
        .into();
        let value = serde_json::to_value(&e).expect("serialize");
        assert_eq!(value["kind"], "invalid_field_value");
        assert_eq!(value["details"], "sleep");
    }
}
