//! Core of the jsongenie template editor.
//!
//! A template is a named set of phases, each holding ordered, configurable
//! steps. Edits go through [`edit`], documents move in and out through
//! [`document`], and [`projection`] derives what a list or graph view shows.

pub mod document;
pub mod edit;
pub mod editor;
pub mod errors;
pub mod favorites;
pub mod field_input;
pub mod file_io;
pub mod model;
pub mod projection;
pub mod registry;
pub mod session;
pub mod settings;

pub use document::{export_document, export_json, import_json, import_value, TemplateDocument};
pub use errors::{AppError, ErrorKind};
pub use model::{ConfigValue, Phase, Step, StepConfig, Template};
pub use projection::{project, ViewProjection};
pub use registry::FieldRegistry;
pub use session::EditorSession;
