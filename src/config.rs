//! Generator configuration.
//!
//! Handles loading, validating, and merging `makefsdata.toml`. Stock defaults
//! reproduce the tables a stock lwIP httpd expects; a config file only needs
//! the keys it wants to change.
//!
//! ## Config File Location
//!
//! - `--config <file>` on the command line, or
//! - `makefsdata.toml` at the top of the walked input directory.
//!
//! When neither exists the stock defaults are used as-is. The config file is
//! never itself embedded, even when it sits inside the walked directory.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! server_agent = "lwIP/2.2.0d (http://savannah.nongnu.org/projects/lwip)"
//! alignment = 4                         # name-segment padding multiple
//! dynamic_extensions = ["shtml", "shtm", "ssi", "xml", "json"]
//!
//! [content_types]
//! html = "text/html"                    # extension (no dot) -> MIME type
//! # ...
//!
//! [status_lines]
//! "200" = "HTTP/1.0 200 OK"
//! "404" = "HTTP/1.0 404 File not found"
//! # ...
//!
//! [output]
//! header = "fsdata.h"                   # #include'd at the top of the artifact
//! bytes_per_line = 16                   # hex bytes per source line
//! ```
//!
//! ## Partial Configuration
//!
//! Tables merge key-by-key, so adding a MIME type keeps every stock entry:
//!
//! ```toml
//! [content_types]
//! webp = "image/webp"
//! ```
//!
//! Arrays replace wholesale: setting `dynamic_extensions` lists the complete
//! set. Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up at the top of a walked input directory.
pub const CONFIG_FILENAME: &str = "makefsdata.toml";

/// Status line for `200`, the status of every file without a known prefix.
pub const DEFAULT_STATUS_LINE: &str = "HTTP/1.0 200 OK";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `makefsdata.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Value of the `Server:` header baked into every response.
    pub server_agent: String,
    /// The virtual-path segment is zero-padded to a multiple of this.
    pub alignment: usize,
    /// Extensions whose body the server may rewrite (SSI), matched exactly.
    /// These get no `Content-Length` and carry the SSI flag instead of the
    /// persistent one.
    pub dynamic_extensions: Vec<String>,
    /// Extension (without dot) to MIME type.
    pub content_types: BTreeMap<String, String>,
    /// Decimal status code to full status line.
    pub status_lines: BTreeMap<String, String>,
    /// Artifact rendering settings.
    pub output: OutputConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            server_agent: "lwIP/2.2.0d (http://savannah.nongnu.org/projects/lwip)".to_string(),
            alignment: 4,
            dynamic_extensions: ["shtml", "shtm", "ssi", "xml", "json"]
                .into_iter()
                .map(String::from)
                .collect(),
            content_types: default_content_types(),
            status_lines: default_status_lines(),
            output: OutputConfig::default(),
        }
    }
}

fn default_content_types() -> BTreeMap<String, String> {
    [
        ("html", "text/html"),
        ("htm", "text/html"),
        ("shtml", "text/html"),
        ("shtm", "text/html"),
        ("ssi", "text/html"),
        ("txt", "text/plain"),
        ("gif", "image/gif"),
        ("png", "image/png"),
        ("jpg", "image/jpeg"),
        ("jpeg", "image/jpeg"),
        ("bmp", "image/bmp"),
        ("ico", "image/x-icon"),
        ("svg", "image/svg+xml"),
        ("class", "application/octet-stream"),
        ("cls", "application/octet-stream"),
        ("js", "application/javascript"),
        ("ram", "application/javascript"),
        ("css", "text/css"),
        ("swf", "application/x-shockwave-flash"),
        ("xml", "text/xml"),
        ("xsl", "text/xml"),
        ("pdf", "application/pdf"),
        ("json", "application/json"),
        ("woff", "font/woff"),
        ("woff2", "font/woff2"),
        ("wasm", "application/wasm"),
    ]
    .into_iter()
    .map(|(ext, mime)| (ext.to_string(), mime.to_string()))
    .collect()
}

fn default_status_lines() -> BTreeMap<String, String> {
    [
        ("200", DEFAULT_STATUS_LINE),
        ("400", "HTTP/1.0 400 Bad Request"),
        ("404", "HTTP/1.0 404 File not found"),
        ("501", "HTTP/1.0 501 Not Implemented"),
    ]
    .into_iter()
    .map(|(code, line)| (code.to_string(), line.to_string()))
    .collect()
}

impl GeneratorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alignment == 0 {
            return Err(ConfigError::Validation("alignment must be at least 1".into()));
        }
        if self.output.bytes_per_line == 0 {
            return Err(ConfigError::Validation(
                "output.bytes_per_line must be at least 1".into(),
            ));
        }
        if self.output.header.trim().is_empty() {
            return Err(ConfigError::Validation("output.header must not be empty".into()));
        }
        if self.server_agent.contains(['\r', '\n']) {
            return Err(ConfigError::Validation(
                "server_agent must be a single line".into(),
            ));
        }
        for (ext, mime) in &self.content_types {
            validate_extension("content_types", ext)?;
            if mime.trim().is_empty() || mime.contains(['\r', '\n']) {
                return Err(ConfigError::Validation(format!(
                    "content_types.{ext} must be a non-empty single line"
                )));
            }
        }
        for (code, line) in &self.status_lines {
            let valid_code = code.len() == 3
                && code
                    .parse::<u16>()
                    .is_ok_and(|n| (100..=599).contains(&n));
            if !valid_code {
                return Err(ConfigError::Validation(format!(
                    "status_lines key {code:?} is not a status code (100-599)"
                )));
            }
            if line.trim().is_empty() || line.contains(['\r', '\n']) {
                return Err(ConfigError::Validation(format!(
                    "status_lines.{code} must be a non-empty single line"
                )));
            }
        }
        if !self.status_lines.contains_key("200") {
            return Err(ConfigError::Validation(
                "status_lines must define \"200\"".into(),
            ));
        }
        for ext in &self.dynamic_extensions {
            validate_extension("dynamic_extensions", ext)?;
            if !self
                .content_types
                .keys()
                .any(|known| known.eq_ignore_ascii_case(ext))
            {
                return Err(ConfigError::Validation(format!(
                    "dynamic extension {ext:?} has no entry in content_types"
                )));
            }
        }
        Ok(())
    }
}

fn validate_extension(field: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
        return Err(ConfigError::Validation(format!(
            "{field}: {ext:?} is not an extension (write it without the leading dot)"
        )));
    }
    Ok(())
}

/// Artifact rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Header `#include`d at the top of the generated source.
    pub header: String,
    /// Hex bytes written per source line.
    pub bytes_per_line: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            header: "fsdata.h".to_string(),
            bytes_per_line: 16,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GeneratorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = read_config(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GeneratorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GeneratorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `makefsdata.toml` from a directory, falling back to stock defaults
/// when it doesn't exist.
pub fn load_config(dir: &Path) -> Result<GeneratorConfig, ConfigError> {
    let overlay = load_raw_config(&dir.join(CONFIG_FILENAME))?;
    resolve_config(stock_defaults_value(), overlay)
}

/// Load an explicitly named config file. Unlike [`load_config`] the file
/// must exist.
pub fn load_config_file(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let content = read_config(path)?;
    let overlay: toml::Value = toml::from_str(&content)?;
    resolve_config(stock_defaults_value(), Some(overlay))
}

fn read_config(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns a fully-commented stock `makefsdata.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# makefsdata Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Tables ([content_types], [status_lines], [output]) merge key-by-key with
# the defaults; arrays replace the default list entirely.
# Unknown keys will cause an error.

# Value of the "Server:" header baked into every response.
server_agent = "lwIP/2.2.0d (http://savannah.nongnu.org/projects/lwip)"

# The "/path\0" name segment is zero-padded to a multiple of this many bytes.
alignment = 4

# Extensions the server may rewrite (server-side includes). These get no
# Content-Length header and are flagged FS_FILE_FLAGS_SSI instead of
# FS_FILE_FLAGS_HEADER_PERSISTENT. Matched case-sensitively.
dynamic_extensions = ["shtml", "shtm", "ssi", "xml", "json"]

# ---------------------------------------------------------------------------
# Content types: extension (without dot, case-insensitive) -> MIME type.
# Files with an extension missing here abort the run.
# ---------------------------------------------------------------------------
[content_types]
html = "text/html"
htm = "text/html"
shtml = "text/html"
shtm = "text/html"
ssi = "text/html"
txt = "text/plain"
gif = "image/gif"
png = "image/png"
jpg = "image/jpeg"
jpeg = "image/jpeg"
bmp = "image/bmp"
ico = "image/x-icon"
svg = "image/svg+xml"
class = "application/octet-stream"
cls = "application/octet-stream"
js = "application/javascript"
ram = "application/javascript"
css = "text/css"
swf = "application/x-shockwave-flash"
xml = "text/xml"
xsl = "text/xml"
pdf = "application/pdf"
json = "application/json"
woff = "font/woff"
woff2 = "font/woff2"
wasm = "application/wasm"

# ---------------------------------------------------------------------------
# Status lines. A file named "<code>.<ext>" (e.g. 404.html) is served with
# that status; everything else gets "200".
# ---------------------------------------------------------------------------
[status_lines]
"200" = "HTTP/1.0 200 OK"
"400" = "HTTP/1.0 400 Bad Request"
"404" = "HTTP/1.0 404 File not found"
"501" = "HTTP/1.0 501 Not Implemented"

# ---------------------------------------------------------------------------
# Generated source
# ---------------------------------------------------------------------------
[output]
# Header #include'd at the top of the artifact.
header = "fsdata.h"

# Hex bytes per line in the array literals.
bytes_per_line = 16
"##
}
