//! Input discovery.
//!
//! Turns either an explicit list of files or a directory into an ordered
//! [`InputSet`]: a root directory plus the files to embed, each with the
//! virtual path the server will look it up by.
//!
//! ## Explicit lists
//!
//! Files are taken in the order given. The first file's parent directory is
//! the root; every other file must live under it. Virtual paths are relative
//! to that root.
//!
//! ## Directory walks
//!
//! ```text
//! fs/                      # root (parent of 404.html)
//! ├── makefsdata.toml      # generator config (skipped)
//! ├── .DS_Store            # hidden (skipped)
//! ├── 404.html             # → /404.html
//! ├── index.html           # → /index.html
//! └── img/
//!     └── logo.svg         # → /img/logo.svg
//! ```
//!
//! At each level files come before subdirectories and siblings are ordered by
//! name, so the walk is identical on every run and platform. The sorted list
//! is then treated exactly like an explicit one: a directory holding files
//! directly is its own root, while `fs/` containing only `site/...` is rooted
//! at `fs/site/`.
//!
//! ## Virtual paths
//!
//! `/` + the root-relative path, with `\` separators normalized to `/`.

use crate::config::CONFIG_FILENAME;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Input directory not found: {0}")]
    DirNotFound(PathBuf),
    #[error("{path} is not under the input root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8(PathBuf),
    #[error("No input files in {0}")]
    Empty(PathBuf),
    #[error("No input files given")]
    NoInput,
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// One file to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Server lookup key, e.g. `/img/logo.svg`.
    pub virtual_path: String,
    /// Root-relative path with `/` separators, e.g. `img/logo.svg`.
    pub relative_path: String,
    /// Host filesystem location.
    pub source: PathBuf,
}

impl InputFile {
    /// Build an input for `source` relative to `root`.
    ///
    /// Purely lexical: leading `./` components are ignored but nothing is
    /// canonicalized, matching how paths were given on the command line.
    pub fn new(root: &Path, source: &Path) -> Result<Self, ScanError> {
        let rel = lexical(source)
            .strip_prefix(lexical(root))
            .map(Path::to_path_buf)
            .map_err(|_| ScanError::OutsideRoot {
                path: source.to_path_buf(),
                root: root.to_path_buf(),
            })?;
        let relative_path = relative_string(&rel)
            .ok_or_else(|| ScanError::NonUtf8(source.to_path_buf()))?;
        if relative_path.is_empty() {
            return Err(ScanError::OutsideRoot {
                path: source.to_path_buf(),
                root: root.to_path_buf(),
            });
        }
        Ok(Self {
            virtual_path: format!("/{relative_path}"),
            relative_path,
            source: source.to_path_buf(),
        })
    }
}

/// Root plus the ordered files to embed.
#[derive(Debug, Clone)]
pub struct InputSet {
    pub root: PathBuf,
    pub files: Vec<InputFile>,
}

impl InputSet {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Build an input set from an ordered list of files.
pub fn from_paths(paths: &[PathBuf]) -> Result<InputSet, ScanError> {
    let first = paths.first().ok_or(ScanError::NoInput)?;
    let root = first.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.is_file() {
            return Err(ScanError::NotFound(path.clone()));
        }
        files.push(InputFile::new(&root, path)?);
    }
    tracing::debug!(root = %root.display(), count = files.len(), "input list");
    Ok(InputSet { root, files })
}

/// Walk a directory recursively into an input set.
///
/// The walk only decides order; the resulting list goes through
/// [`from_paths`], so the root is the first discovered file's parent.
pub fn walk(dir: &Path) -> Result<InputSet, ScanError> {
    if !dir.is_dir() {
        return Err(ScanError::DirNotFound(dir.to_path_buf()));
    }

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by(|a, b| {
            a.file_type()
                .is_dir()
                .cmp(&b.file_type().is_dir())
                .then_with(|| a.file_name().cmp(b.file_name()))
        })
        .into_iter()
        .filter_entry(|e| !is_skipped(e));

    let mut paths = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        tracing::debug!(path = %entry.path().display(), "discovered");
        paths.push(entry.into_path());
    }

    if paths.is_empty() {
        return Err(ScanError::Empty(dir.to_path_buf()));
    }
    from_paths(&paths)
}

/// Hidden entries anywhere, and the generator's own config at the top.
fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || (entry.depth() == 1 && name == CONFIG_FILENAME)
}

fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn relative_string(rel: &Path) -> Option<String> {
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    Some(parts?.join("/").replace('\\', "/"))
}
