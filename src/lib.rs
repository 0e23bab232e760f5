//! # makefsdata
//!
//! Turns a directory of static web files into a C source file for lwIP's
//! httpd. Each file becomes a byte array holding its lookup name and a
//! complete pre-rendered HTTP response; a linked list of `fsdata_file`
//! descriptors lets the server find them without a filesystem.
//!
//! # Architecture: Linear Pipeline
//!
//! ```text
//! 1. Scan      fs/          →  InputSet     (ordered host files + virtual paths)
//! 2. Encode    InputFile    →  EncodedFile  (name segment + headers + body)
//! 3. Chain     EncodedFiles →  Chain        (descriptors with back-links)
//! 4. Emit      Chain        →  String       (C arrays, descriptors, FS_ROOT)
//! 5. Write     String       →  fsdata.c     (atomic, skipped when unchanged)
//! ```
//!
//! Every stage is a plain function over owned data. The whole run is
//! sequential: one file is read, encoded and linked before the next begins,
//! and any error aborts before the output file is touched.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Input discovery: explicit file list or sorted directory walk |
//! | [`classify`] | Extension → MIME type, filename → status line, dynamic-extension set |
//! | [`naming`] | Filename conventions: `404.`-style status prefixes, C identifiers |
//! | [`encode`] | Per-file response buffers built from ordered segments |
//! | [`chain`] | Descriptor flags and the back-linked descriptor chain |
//! | [`emit`] | C source rendering |
//! | [`writer`] | All-or-nothing output writing |
//! | [`generate`] | The pipeline driver and the JSON manifest |
//! | [`config`] | `makefsdata.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Headers Are Baked In
//!
//! The server copies the response region of each buffer straight to the
//! socket. Status line, `Server:`, `Content-Length` and `Content-Type` are
//! therefore rendered here, byte for byte, and every descriptor carries
//! `FS_FILE_FLAGS_HEADER_INCLUDED`. Files with dynamic extensions (SSI) get
//! no `Content-Length`, since the server may rewrite their bodies.
//!
//! ## Explicit Chain Builder
//!
//! Descriptors point backwards: each one links to the file declared before
//! it and the last file becomes `FS_ROOT`. [`chain::ChainBuilder`] owns the
//! descriptors and the current tail, and [`chain::ChainBuilder::append`]
//! consumes and returns the builder, so the fold over input files has no
//! hidden state.
//!
//! ## Deterministic Output
//!
//! Directory walks are sorted (files before subdirectories, then by name),
//! and nothing time- or host-dependent goes into the artifact. Regenerating
//! an unchanged web root yields identical bytes, and [`writer`] then leaves
//! the existing file alone so downstream builds see no change.
//!
//! ## Duplicate Paths Are Allowed
//!
//! Two inputs with the same virtual path both get descriptors; the later one
//! is found first during lookup and shadows the earlier. Only the C symbols
//! are made unique so the artifact compiles.

pub mod chain;
pub mod classify;
pub mod config;
pub mod emit;
pub mod encode;
pub mod generate;
pub mod naming;
pub mod output;
pub mod scan;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_helpers;
