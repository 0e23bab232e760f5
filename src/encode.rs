//! Per-file response encoding.
//!
//! Every embedded file becomes one byte buffer holding its lookup name
//! followed by a complete, pre-rendered HTTP response. The buffer is built
//! from ordered segments:
//!
//! ```text
//! "/404.html\0" + padding      name segment, length is a multiple of `alignment`
//! "HTTP/1.0 404 File not found\r\n"
//! "Server: lwIP/2.2.0d (...)\r\n"
//! "Content-Length: 1234\r\n"   omitted for dynamic (SSI) extensions
//! "Content-Type: text/html\r\n\r\n"
//! <raw file bytes>
//! ```
//!
//! The server sends everything after the name segment verbatim, so header
//! bytes here must be exactly what goes on the wire.
//!
//! Dynamic files skip `Content-Length` because the server may rewrite their
//! bodies (tag substitution), which would make a precomputed length wrong.

use crate::classify::{Classification, ClassifyError, Classifier};
use crate::config::GeneratorConfig;
use crate::scan::InputFile;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

const CRLF: &str = "\r\n";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error(transparent)]
    Classify(#[from] ClassifyError),
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What a segment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Name,
    StatusLine,
    Server,
    ContentLength,
    ContentType,
    Body,
}

/// One ordered piece of an encoded file.
///
/// `description` only feeds the comment above the bytes in generated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSegment {
    pub kind: SegmentKind,
    pub payload: Vec<u8>,
    pub description: String,
}

impl EncodedSegment {
    fn text(kind: SegmentKind, line: &str, terminator: &str) -> Self {
        let data = format!("{line}{terminator}");
        Self {
            kind,
            description: format!("\"{line}\" ({} chars)", data.chars().count()),
            payload: data.into_bytes(),
        }
    }
}

/// A fully encoded file, ready to be linked into the chain.
#[derive(Debug, Clone)]
pub struct EncodedFile {
    pub input: InputFile,
    pub classification: Classification,
    pub segments: Vec<EncodedSegment>,
}

impl EncodedFile {
    /// Length of the padded name segment.
    pub fn name_len(&self) -> usize {
        self.segments
            .iter()
            .find(|s| s.kind == SegmentKind::Name)
            .map_or(0, |s| s.payload.len())
    }

    /// Total encoded length across all segments.
    pub fn len(&self) -> usize {
        self.segments.iter().map(|s| s.payload.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Concatenate all segment payloads in order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());
        for segment in &self.segments {
            bytes.extend_from_slice(&segment.payload);
        }
        bytes
    }

    pub fn segment(&self, kind: SegmentKind) -> Option<&EncodedSegment> {
        self.segments.iter().find(|s| s.kind == kind)
    }

    pub fn body_len(&self) -> usize {
        self.segment(SegmentKind::Body).map_or(0, |s| s.payload.len())
    }
}

/// Encodes input files into response buffers.
#[derive(Debug, Clone)]
pub struct Encoder {
    classifier: Classifier,
    server_agent: String,
    alignment: usize,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(&GeneratorConfig::default())
    }
}

impl Encoder {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            classifier: Classifier::new(config),
            server_agent: config.server_agent.clone(),
            alignment: config.alignment.max(1),
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Read the file from disk and encode it.
    ///
    /// Classification runs first, so an unsupported extension is reported
    /// without touching the file.
    pub fn encode(&self, input: &InputFile) -> Result<EncodedFile, EncodeError> {
        let classification = self.classifier.classify(&input.source)?;
        let body = std::fs::read(&input.source).map_err(|source| EncodeError::Read {
            path: input.source.clone(),
            source,
        })?;
        Ok(self.assemble(input, classification, body))
    }

    /// Encode with the body supplied by the caller instead of read from disk.
    pub fn encode_contents(
        &self,
        input: &InputFile,
        body: Vec<u8>,
    ) -> Result<EncodedFile, EncodeError> {
        let classification = self.classifier.classify(&input.source)?;
        Ok(self.assemble(input, classification, body))
    }

    fn assemble(
        &self,
        input: &InputFile,
        classification: Classification,
        body: Vec<u8>,
    ) -> EncodedFile {
        let mut segments = Vec::with_capacity(6);

        segments.push(name_segment(&input.virtual_path, self.alignment));
        segments.push(EncodedSegment::text(
            SegmentKind::StatusLine,
            &classification.status_line,
            CRLF,
        ));
        segments.push(EncodedSegment::text(
            SegmentKind::Server,
            &format!("Server: {}", self.server_agent),
            CRLF,
        ));
        if !classification.dynamic {
            segments.push(EncodedSegment::text(
                SegmentKind::ContentLength,
                &format!("Content-Length: {}", body.len()),
                CRLF,
            ));
        }
        // Blank line closes the header block
        segments.push(EncodedSegment::text(
            SegmentKind::ContentType,
            &format!("Content-Type: {}", classification.content_type),
            "\r\n\r\n",
        ));
        segments.push(EncodedSegment {
            kind: SegmentKind::Body,
            description: format!("raw file data ({} bytes)", body.len()),
            payload: body,
        });

        tracing::debug!(
            path = %input.virtual_path,
            status = classification.status,
            content_type = %classification.content_type,
            dynamic = classification.dynamic,
            "encoded"
        );

        EncodedFile {
            input: input.clone(),
            classification,
            segments,
        }
    }
}

/// `path` + NUL, zero-padded to a multiple of `alignment`.
pub fn name_segment(virtual_path: &str, alignment: usize) -> EncodedSegment {
    let mut payload = virtual_path.as_bytes().to_vec();
    payload.push(0);
    let description = format!("\"{virtual_path}\" ({} chars)", virtual_path.chars().count() + 1);
    payload.resize(padded_len(payload.len(), alignment), 0);
    EncodedSegment {
        kind: SegmentKind::Name,
        payload,
        description,
    }
}

/// Round `len` up to the next multiple of `alignment`.
pub fn padded_len(len: usize, alignment: usize) -> usize {
    let alignment = alignment.max(1);
    len.div_ceil(alignment) * alignment
}
