use crate::document;
use crate::errors::AppError;
use crate::model::Template;
use crate::settings::EditorSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReceipt {
    pub path: String,
    pub bytes: u64,
    pub sha256: String,
}

/// Reads a UTF-8 document file and imports it.
pub fn read_template(path: &Path) -> Result<Template, AppError> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(AppError::io)?;
    let template = document::import_json(&content)?;
    Ok(template)
}

/// Writes the pretty-printed export document to `path`.
pub fn write_template(template: &Template, path: &Path) -> Result<ExportReceipt, AppError> {
    let json = document::export_json(template)?;
    let receipt = write_document(&json, path).map_err(AppError::io)?;
    log::info!(
        "exported template '{}' to {} ({} bytes)",
        template.name(),
        receipt.path,
        receipt.bytes
    );
    Ok(receipt)
}

fn write_document(json: &str, path: &Path) -> Result<ExportReceipt> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
    }

    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;

    let bytes = fs::metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();

    Ok(ExportReceipt {
        path: path.to_string_lossy().to_string(),
        bytes,
        sha256: hex::encode(Sha256::digest(json.as_bytes())),
    })
}

/// `<name>.json`, or `<fallback_stem>.json` for blank names. Path separators
/// in the name are replaced so the result is a single file name.
pub fn export_file_name(name: &str, fallback_stem: &str) -> String {
    let stem = if name.trim().is_empty() {
        fallback_stem
    } else {
        name
    };
    let stem: String = stem
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("{}.json", stem)
}

/// Configured export directory, else downloads, else home, else the
/// current directory.
pub fn export_dir(settings: &EditorSettings) -> PathBuf {
    settings
        .export_dir
        .clone()
        .or_else(dirs::download_dir)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Full target path for exporting `template` with the given settings.
pub fn export_path(template: &Template, settings: &EditorSettings) -> PathBuf {
    export_dir(settings).join(export_file_name(
        template.name(),
        &settings.default_export_stem,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit;
    use crate::errors::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn export_file_name_falls_back_for_blank_names() {
        assert_eq!(export_file_name("Nightly run", "template"), "Nightly run.json");
        assert_eq!(export_file_name("   ", "template"), "template.json");
        assert_eq!(export_file_name("a/b\\c", "template"), "a_b_c.json");
    }

    #[test]
    fn export_path_uses_configured_dir() {
        let dir = tempdir().expect("tempdir");
        let settings = EditorSettings {
            export_dir: Some(dir.path().to_path_buf()),
            ..EditorSettings::default()
        };
        let path = export_path(&Template::new(""), &settings);
        assert_eq!(path, dir.path().join("template.json"));
    }

    #[test]
    fn written_file_reimports_to_equal_document() {
        let dir = tempdir().expect("tempdir");
        let (t, _) = edit::add_step(&Template::new("Nightly"), "1", "alert").expect("add");
        let path = dir.path().join("out").join("nightly.json");

        let receipt = write_template(&t, &path).expect("write");
        assert_eq!(receipt.bytes, fs::metadata(&path).expect("stat").len());
        assert_eq!(receipt.sha256.len(), 64);

        let back = read_template(&path).expect("read");
        assert_eq!(
            document::export_document(&back),
            document::export_document(&t)
        );
    }

    #[test]
    fn read_missing_file_is_io_error() {
        let dir = tempdir().expect("tempdir");
        let err = read_template(&dir.path().join("missing.json")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Io);
    }

    #[test]
    fn read_malformed_file_is_malformed_document() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"name":"x"}"#).expect("write");
        let err = read_template(&path).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument);
    }
}
