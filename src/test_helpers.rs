//! Shared test utilities.
//!
//! Builds throwaway web roots and extracts the bits tests usually assert
//! on (virtual paths in scan order, virtual paths in traversal order).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = site(&[("index.html", "<p>hi</p>"), ("img/logo.svg", "<svg/>")]);
//! let input = walk(tmp.path()).unwrap();
//! assert_eq!(virtual_paths(&input), vec!["/index.html", "/img/logo.svg"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::chain::{Chain, FileDescriptor};
use crate::scan::InputSet;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/fs/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/fs");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Create a temp directory holding the given `(relative path, contents)` files.
pub fn site(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, contents) in files {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
    }
    tmp
}

// =========================================================================
// Extractors
// =========================================================================

/// Virtual paths of an input set, in scan order.
pub fn virtual_paths(input: &InputSet) -> Vec<&str> {
    input.files.iter().map(|f| f.virtual_path.as_str()).collect()
}

/// Virtual paths visited when walking the chain from `FS_ROOT`.
pub fn traversal_paths(chain: &Chain) -> Vec<&str> {
    chain.traverse().map(|d| d.virtual_path()).collect()
}

/// Find a descriptor by virtual path. Panics if not found.
pub fn find_descriptor<'a>(chain: &'a Chain, virtual_path: &str) -> &'a FileDescriptor {
    chain.find(virtual_path).unwrap_or_else(|| {
        panic!(
            "descriptor '{}' not found. Available: {:?}",
            virtual_path,
            traversal_paths(chain)
        )
    })
}
