//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Each embedded file is shown by its virtual path, the key the server looks
//! it up by, with the host file and encoding details as indented context
//! lines. Files are listed in declaration order, the same order their
//! buffers appear in the generated source.
//!
//! # Output Format
//!
//! ## Generate
//!
//! ```text
//! 001 /404.html → HTTP/1.0 404 File not found
//!     Source: 404.html
//!     Type: text/html, 74 bytes
//!     Flags: FS_FILE_FLAGS_HEADER_INCLUDED | FS_FILE_FLAGS_HEADER_PERSISTENT
//! 002 /data.json → HTTP/1.0 200 OK
//!     Source: data.json
//!     Type: application/json, dynamic
//!     Flags: FS_FILE_FLAGS_HEADER_INCLUDED | FS_FILE_FLAGS_SSI
//!
//! Root: /data.json (2 files)
//! fsdata.c: created (2310 bytes)
//! ```
//!
//! ## Check
//!
//! Same file listing, followed by `Checked 2 files, nothing written`.
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::chain::{Chain, FileDescriptor};
use crate::generate::Report;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Header line plus context lines for one descriptor.
///
/// ```text
/// 001 /index.html → HTTP/1.0 200 OK
///     Source: index.html
///     Type: text/html, 312 bytes
///     Flags: FS_FILE_FLAGS_HEADER_INCLUDED | FS_FILE_FLAGS_HEADER_PERSISTENT
/// ```
fn descriptor_lines(position: usize, descriptor: &FileDescriptor) -> Vec<String> {
    let file = descriptor.file();
    let class = &file.classification;
    let body = if class.dynamic {
        "dynamic".to_string()
    } else {
        plural(file.body_len(), "byte")
    };
    vec![
        format!(
            "{} {} \u{2192} {}",
            format_index(position),
            file.input.virtual_path,
            class.status_line
        ),
        format!("{}Source: {}", indent(1), file.input.relative_path),
        format!("{}Type: {}, {}", indent(1), class.content_type, body),
        format!("{}Flags: {}", indent(1), descriptor.flags()),
    ]
}

// ============================================================================
// Chain listing
// ============================================================================

/// Every descriptor in declaration order.
pub fn format_chain_output(chain: &Chain) -> Vec<String> {
    chain
        .descriptors()
        .iter()
        .enumerate()
        .flat_map(|(i, d)| descriptor_lines(i + 1, d))
        .collect()
}

/// Root line: the file `FS_ROOT` aliases and the total count.
fn root_line(chain: &Chain) -> String {
    match chain.root() {
        Some(root) => format!(
            "Root: {} ({})",
            root.virtual_path(),
            plural(chain.count(), "file")
        ),
        None => "Root: NULL (0 files)".to_string(),
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_output(report: &Report) -> Vec<String> {
    let mut lines = format_chain_output(&report.chain);
    lines.push(String::new());
    lines.push(root_line(&report.chain));

    let name = report
        .output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.output.display().to_string());
    lines.push(format!(
        "{}: {} ({})",
        name,
        report.outcome,
        plural(report.bytes, "byte")
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &Report) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(chain: &Chain) -> Vec<String> {
    let mut lines = format_chain_output(chain);
    lines.push(String::new());
    lines.push(root_line(chain));
    lines.push(format!(
        "Checked {}, nothing written",
        plural(chain.count(), "file")
    ));
    lines
}

/// Print check output to stdout.
pub fn print_check_output(chain: &Chain) {
    for line in format_check_output(chain) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
