//! File classification: content type, response status, and dynamic content.
//!
//! Classification is driven purely by the file name. Nothing inspects the
//! file body; an HTML file with broken markup is still `text/html`.
//!
//! Three immutable tables, built once from [`GeneratorConfig`]:
//!
//! | Table | Key | Miss |
//! |-------|-----|------|
//! | content types | lowercase extension | [`ClassifyError::UnsupportedExtension`] |
//! | status lines | status code from the `<code>.` name prefix | falls back to 200 |
//! | dynamic extensions | extension, case-sensitive | static content |

use crate::config::{DEFAULT_STATUS_LINE, GeneratorConfig};
use crate::naming;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Status used for every file without a known `<code>.` prefix.
pub const DEFAULT_STATUS: u16 = 200;

#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("Unsupported file type {} for {}", display_extension(.extension), .path.display())]
    UnsupportedExtension { path: PathBuf, extension: String },
}

fn display_extension(extension: &str) -> String {
    if extension.is_empty() {
        "(no extension)".to_string()
    } else {
        format!(".{extension}")
    }
}

/// Everything the encoder needs to know about a file besides its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub content_type: String,
    pub status: u16,
    pub status_line: String,
    /// Body may be rewritten by the server (SSI), so no precomputed length.
    pub dynamic: bool,
}

/// Lookup tables resolved from config.
#[derive(Debug, Clone)]
pub struct Classifier {
    content_types: BTreeMap<String, String>,
    status_lines: BTreeMap<u16, String>,
    dynamic_extensions: BTreeSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&GeneratorConfig::default())
    }
}

impl Classifier {
    /// Build lookup tables from a validated config.
    ///
    /// Status keys that don't parse are skipped; [`GeneratorConfig::validate`]
    /// rejects them before a config ever reaches here.
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            content_types: config
                .content_types
                .iter()
                .map(|(ext, mime)| (ext.to_ascii_lowercase(), mime.clone()))
                .collect(),
            status_lines: config
                .status_lines
                .iter()
                .filter_map(|(code, line)| Some((code.parse().ok()?, line.clone())))
                .collect(),
            dynamic_extensions: config.dynamic_extensions.iter().cloned().collect(),
        }
    }

    /// MIME type for a path's extension (case-insensitive).
    pub fn content_type(&self, path: &Path) -> Result<&str, ClassifyError> {
        let extension = extension_of(path);
        self.content_types
            .get(&extension)
            .map(String::as_str)
            .ok_or_else(|| ClassifyError::UnsupportedExtension {
                path: path.to_path_buf(),
                extension,
            })
    }

    /// Status code and line for a path.
    ///
    /// Only the file name is consulted, so `404/index.html` is a plain 200.
    pub fn status(&self, path: &Path) -> (u16, &str) {
        let code = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(naming::status_code_prefix)
            .filter(|code| self.status_lines.contains_key(code))
            .unwrap_or(DEFAULT_STATUS);
        let line = self
            .status_lines
            .get(&code)
            .map(String::as_str)
            .unwrap_or(DEFAULT_STATUS_LINE);
        (code, line)
    }

    /// Whether a path's extension is in the dynamic set.
    ///
    /// Matched exactly as written, unlike the MIME lookup: `DATA.JSON` is
    /// `application/json` but static.
    pub fn is_dynamic(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.dynamic_extensions.contains(ext))
    }

    /// Classify a path in one go.
    pub fn classify(&self, path: &Path) -> Result<Classification, ClassifyError> {
        let content_type = self.content_type(path)?.to_string();
        let (status, status_line) = self.status(path);
        Ok(Classification {
            content_type,
            status,
            status_line: status_line.to_string(),
            dynamic: self.is_dynamic(path),
        })
    }
}

/// Lowercase extension without the dot; empty when there is none.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}
