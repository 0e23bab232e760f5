//! Generation pipeline.
//!
//! Ties the stages together for one run:
//!
//! ```text
//! InputSet ──encode──▶ EncodedFile ──append──▶ ChainBuilder ──finish──▶ Chain
//!                                                                       │
//!                                    fsdata.c ◀──write── String ◀──render┘
//! ```
//!
//! Files are encoded and folded into the chain strictly one after another in
//! input order. The first failure aborts the run before anything is written,
//! so an output file is either the complete artifact or untouched.
//!
//! [`manifest`] describes an assembled chain as serializable data for the
//! `scan` command.

use crate::chain::{Chain, ChainBuilder};
use crate::config::GeneratorConfig;
use crate::emit::{self, EmitOptions};
use crate::encode::{EncodeError, Encoder};
use crate::scan::InputSet;
use crate::writer::{self, WriteError, WriteOutcome};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Result of a completed run.
#[derive(Debug)]
pub struct Report {
    pub chain: Chain,
    pub output: PathBuf,
    pub outcome: WriteOutcome,
    /// Size of the rendered source text.
    pub bytes: usize,
}

/// Encode every input file and link them into a chain, in input order.
pub fn assemble(input: &InputSet, config: &GeneratorConfig) -> Result<Chain, GenerateError> {
    let encoder = Encoder::new(config);
    let builder = input
        .files
        .iter()
        .try_fold(ChainBuilder::new(), |builder, file| {
            encoder.encode(file).map(|encoded| builder.append(encoded))
        })?;
    Ok(builder.finish())
}

/// Render an assembled chain to C source using the config's output settings.
pub fn render(chain: &Chain, config: &GeneratorConfig) -> String {
    emit::render(chain, &EmitOptions::from_config(config))
}

/// Full run: assemble, render and write the artifact to `output`.
pub fn generate(
    input: &InputSet,
    config: &GeneratorConfig,
    output: &Path,
) -> Result<Report, GenerateError> {
    let chain = assemble(input, config)?;
    let source = render(&chain, config);
    let outcome = writer::write_artifact(output, source.as_bytes())?;
    tracing::info!(
        files = chain.count(),
        output = %output.display(),
        %outcome,
        "generation finished"
    );
    Ok(Report {
        chain,
        output: output.to_path_buf(),
        outcome,
        bytes: source.len(),
    })
}

// ============================================================================
// Manifest
// ============================================================================

/// Serializable description of an assembled chain.
#[derive(Debug, Serialize)]
pub struct Manifest {
    /// Descriptor symbol aliased as `FS_ROOT`.
    pub root: Option<String>,
    pub count: usize,
    /// Entries in declaration order.
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize)]
pub struct ManifestEntry {
    pub virtual_path: String,
    pub source: PathBuf,
    pub symbol: String,
    pub content_type: String,
    pub status: u16,
    pub dynamic: bool,
    pub name_len: usize,
    pub response_len: usize,
    pub flags: Vec<&'static str>,
    /// Descriptor symbol of the back-link, if any.
    pub prev: Option<String>,
}

pub fn manifest(chain: &Chain) -> Manifest {
    let symbols = emit::assign_symbols(chain);
    let files = chain
        .descriptors()
        .iter()
        .zip(&symbols)
        .map(|(d, sym)| {
            let file = d.file();
            ManifestEntry {
                virtual_path: file.input.virtual_path.clone(),
                source: file.input.source.clone(),
                symbol: sym.file.clone(),
                content_type: file.classification.content_type.clone(),
                status: file.classification.status,
                dynamic: file.classification.dynamic,
                name_len: d.name_len(),
                response_len: d.response_len(),
                flags: d.flags().names(),
                prev: d.prev().map(|id| symbols[id.index()].file.clone()),
            }
        })
        .collect();
    Manifest {
        root: chain.root().map(|r| symbols[r.id().index()].file.clone()),
        count: chain.count(),
        files,
    }
}
