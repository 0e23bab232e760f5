//! C source rendering.
//!
//! Turns a [`Chain`] into the `fsdata.c` the lwIP httpd compiles in:
//!
//! ```text
//! #include "fsdata.h"
//!
//! static const unsigned char data_index_html[] = {
//!
//!     /* "/index.html" (12 chars) */
//!     0x2F,0x69,0x6E,0x64,0x65,0x78,0x2E,0x68,0x74,0x6D,0x6C,0x00,
//!     ...
//! };
//!
//! const struct fsdata_file file_index_html[] = {{
//!     NULL,
//!     data_index_html,
//!     data_index_html + 12,
//!     sizeof(data_index_html) - 12,
//!     FS_FILE_FLAGS_HEADER_INCLUDED | FS_FILE_FLAGS_HEADER_PERSISTENT,
//! }};
//!
//! #define FS_ROOT file_index_html
//! #define FS_NUMFILES 1
//! ```
//!
//! All byte arrays come first, then all descriptors, both in declaration
//! order. Rendering is a pure function of the chain and options, so the same
//! input always produces the same text.

use crate::chain::Chain;
use crate::config::GeneratorConfig;
use crate::naming::SymbolTable;
use std::fmt::{self, Write};

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub header: String,
    pub bytes_per_line: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }
}

impl EmitOptions {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            header: config.output.header.clone(),
            bytes_per_line: config.output.bytes_per_line.max(1),
        }
    }
}

/// C symbols for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbols {
    pub data: String,
    pub file: String,
}

/// Assign unique symbols in declaration order.
pub fn assign_symbols(chain: &Chain) -> Vec<Symbols> {
    let mut table = SymbolTable::new();
    chain
        .descriptors()
        .iter()
        .map(|d| {
            let ident = table.claim(&d.file().input.relative_path);
            Symbols {
                data: format!("data_{ident}"),
                file: format!("file_{ident}"),
            }
        })
        .collect()
}

/// Render the complete source artifact.
pub fn render(chain: &Chain, options: &EmitOptions) -> String {
    let mut out = String::new();
    write_source(&mut out, chain, options).expect("writing to a String cannot fail");
    out
}

fn write_source(out: &mut String, chain: &Chain, options: &EmitOptions) -> fmt::Result {
    let symbols = assign_symbols(chain);

    writeln!(out, "#include \"{}\"", options.header)?;
    writeln!(out)?;

    for (descriptor, sym) in chain.descriptors().iter().zip(&symbols) {
        writeln!(out, "static const unsigned char {}[] = {{", sym.data)?;
        for segment in &descriptor.file().segments {
            writeln!(out)?;
            writeln!(out, "    /* {} */", comment_safe(&segment.description))?;
            write_bytes(out, &segment.payload, options.bytes_per_line)?;
        }
        writeln!(out, "}};")?;
        writeln!(out)?;
    }

    for (descriptor, sym) in chain.descriptors().iter().zip(&symbols) {
        let prev = descriptor
            .prev()
            .map_or("NULL", |id| symbols[id.index()].file.as_str());
        let name_len = descriptor.name_len();
        writeln!(out, "const struct fsdata_file {}[] = {{{{", sym.file)?;
        writeln!(out, "    {prev},")?;
        writeln!(out, "    {},", sym.data)?;
        writeln!(out, "    {} + {name_len},", sym.data)?;
        writeln!(out, "    sizeof({}) - {name_len},", sym.data)?;
        writeln!(out, "    {},", descriptor.flags())?;
        writeln!(out, "}}}};")?;
        writeln!(out)?;
    }

    let root = chain
        .root()
        .map_or("NULL", |d| symbols[d.id().index()].file.as_str());
    writeln!(out, "#define FS_ROOT {root}")?;
    writeln!(out, "#define FS_NUMFILES {}", chain.count())?;
    Ok(())
}

/// Hex literals, `per_line` to a line, each line indented four spaces.
fn write_bytes(out: &mut String, bytes: &[u8], per_line: usize) -> fmt::Result {
    for line in bytes.chunks(per_line.max(1)) {
        out.push_str("    ");
        for b in line {
            write!(out, "0x{b:02X},")?;
        }
        out.push('\n');
    }
    Ok(())
}

/// Keep a description from closing its `/* */` comment early.
fn comment_safe(text: &str) -> String {
    text.replace("*/", "*\\/")
}
