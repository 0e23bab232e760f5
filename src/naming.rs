//! Centralized filename conventions.
//!
//! Two naming rules drive the generator:
//!
//! ## Status-code prefix
//!
//! A file whose name starts with a known status code followed by a dot is
//! served with that status instead of `200`. The leading segment up to the
//! first dot is the candidate:
//! - `404.html` → `Some(404)`
//! - `404.en.html` → `Some(404)`
//! - `200something.html` → `None` (segment is `200something`)
//! - `0404.html` → `None` (codes are exactly three digits)
//! - `404` → `None` (no dot, so no `<code>.` prefix)
//!
//! Whether the code is actually *known* is decided by the status table in
//! [`crate::classify`], not here.
//!
//! ## C identifiers
//!
//! Each file becomes two C symbols, `data_<ident>` and `file_<ident>`, where
//! `<ident>` is the root-relative path with everything outside `[A-Za-z0-9_]`
//! turned into `_`:
//! - `index.html` → `index_html`
//! - `img/logo-small.png` → `img_logo_small_png`

use std::collections::HashMap;

/// Number of digits in an HTTP status code.
const STATUS_CODE_DIGITS: usize = 3;

/// Parse the `<code>.` prefix of a file name.
///
/// Only the final path component should be passed in; directory names never
/// select a status.
pub fn status_code_prefix(file_name: &str) -> Option<u16> {
    let (segment, _) = file_name.split_once('.')?;
    if segment.len() != STATUS_CODE_DIGITS || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Derive a C identifier fragment from a root-relative path.
pub fn c_identifier(relative_path: &str) -> String {
    relative_path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Hands out unique identifiers in declaration order.
///
/// The first file claiming an identifier keeps it verbatim; later claimants
/// get `_2`, `_3`, ... appended. Suffixed names are themselves reserved so a
/// file literally named `a_html_2` cannot collide with a generated suffix.
#[derive(Debug, Default)]
pub struct SymbolTable {
    claims: HashMap<String, u32>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an identifier for `relative_path`, returning the unique result.
    pub fn claim(&mut self, relative_path: &str) -> String {
        let base = c_identifier(relative_path);
        let Some(&last) = self.claims.get(&base) else {
            self.claims.insert(base.clone(), 1);
            return base;
        };
        let mut n = last;
        loop {
            n += 1;
            let candidate = format!("{base}_{n}");
            if !self.claims.contains_key(&candidate) {
                self.claims.insert(base, n);
                self.claims.insert(candidate.clone(), 1);
                return candidate;
            }
        }
    }
}
