//! Descriptor chain assembly.
//!
//! The server finds files by walking a singly-linked list of descriptors
//! from a root to a null terminator. Files are linked in declaration order,
//! each descriptor pointing back at the one declared before it, so the root
//! is the *last* file declared:
//!
//! ```text
//! input order:   a.html      b.json      404.html
//!                  ▲           ▲            │
//! links:          NULL ◄─ a ◄─ b ◄───────── root
//! traversal:     404.html → b.json → a.html → NULL
//! ```
//!
//! No sorting, deduplication, or collision detection happens here. Two files
//! with the same virtual path both end up in the chain; the later one is met
//! first during traversal and shadows the earlier one.
//!
//! [`ChainBuilder`] owns the descriptors and the current tail; the only way
//! to grow it is [`ChainBuilder::append`], which consumes the builder and
//! returns the extended one. Folding encoded files through it yields the
//! finished [`Chain`].

use crate::encode::EncodedFile;
use std::fmt;

/// Descriptor flags understood by the lwIP httpd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFlag {
    /// The buffer already contains the response headers.
    HeaderIncluded,
    /// Headers are static and may be sent without copying.
    HeaderPersistent,
    /// Status line is HTTP/1.1.
    HeaderHttpVer11,
    /// Body goes through server-side include processing.
    Ssi,
}

impl FileFlag {
    pub const ALL: [FileFlag; 4] = [
        FileFlag::HeaderIncluded,
        FileFlag::HeaderPersistent,
        FileFlag::HeaderHttpVer11,
        FileFlag::Ssi,
    ];

    /// Bit value as defined by lwIP's `fs.h`.
    pub const fn bit(self) -> u8 {
        match self {
            FileFlag::HeaderIncluded => 0x01,
            FileFlag::HeaderPersistent => 0x02,
            FileFlag::HeaderHttpVer11 => 0x04,
            FileFlag::Ssi => 0x08,
        }
    }

    /// C macro name.
    pub const fn c_name(self) -> &'static str {
        match self {
            FileFlag::HeaderIncluded => "FS_FILE_FLAGS_HEADER_INCLUDED",
            FileFlag::HeaderPersistent => "FS_FILE_FLAGS_HEADER_PERSISTENT",
            FileFlag::HeaderHttpVer11 => "FS_FILE_FLAGS_HEADER_HTTPVER_1_1",
            FileFlag::Ssi => "FS_FILE_FLAGS_SSI",
        }
    }
}

/// A set of [`FileFlag`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileFlags(u8);

impl FileFlags {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn with(self, flag: FileFlag) -> Self {
        Self(self.0 | flag.bit())
    }

    pub const fn contains(self, flag: FileFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Set flags in declaration order.
    pub fn iter(self) -> impl Iterator<Item = FileFlag> {
        FileFlag::ALL.into_iter().filter(move |f| self.contains(*f))
    }

    /// Flags for an encoded file.
    ///
    /// Headers are always included. Static files get `HEADER_PERSISTENT`,
    /// dynamic ones get `SSI` instead; never both.
    pub fn for_file(file: &EncodedFile) -> Self {
        let mut flags = Self::empty().with(FileFlag::HeaderIncluded);
        flags = if file.classification.dynamic {
            flags.with(FileFlag::Ssi)
        } else {
            flags.with(FileFlag::HeaderPersistent)
        };
        if file.classification.status_line.starts_with("HTTP/1.1") {
            flags = flags.with(FileFlag::HeaderHttpVer11);
        }
        flags
    }

    pub fn names(self) -> Vec<&'static str> {
        self.iter().map(FileFlag::c_name).collect()
    }
}

impl FromIterator<FileFlag> for FileFlags {
    fn from_iter<I: IntoIterator<Item = FileFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

/// Renders as a C expression, e.g.
/// `FS_FILE_FLAGS_HEADER_INCLUDED | FS_FILE_FLAGS_HEADER_PERSISTENT`.
impl fmt::Display for FileFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0");
        }
        f.write_str(&self.names().join(" | "))
    }
}

/// Position of a descriptor in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(usize);

impl DescriptorId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One linked file.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    id: DescriptorId,
    file: EncodedFile,
    data: Vec<u8>,
    name_len: usize,
    flags: FileFlags,
    prev: Option<DescriptorId>,
}

impl FileDescriptor {
    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn file(&self) -> &EncodedFile {
        &self.file
    }

    pub fn virtual_path(&self) -> &str {
        &self.file.input.virtual_path
    }

    /// The whole encoded buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Padded name region.
    pub fn name(&self) -> &[u8] {
        &self.data[..self.name_len]
    }

    /// Headers + body region.
    pub fn response(&self) -> &[u8] {
        &self.data[self.name_len..]
    }

    pub fn name_len(&self) -> usize {
        self.name_len
    }

    pub fn response_len(&self) -> usize {
        self.data.len() - self.name_len
    }

    pub fn flags(&self) -> FileFlags {
        self.flags
    }

    /// The descriptor declared just before this one.
    pub fn prev(&self) -> Option<DescriptorId> {
        self.prev
    }
}

/// Append-only chain under construction.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    descriptors: Vec<FileDescriptor>,
    tail: Option<DescriptorId>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `file` after the current tail and make it the new tail.
    pub fn append(mut self, file: EncodedFile) -> Self {
        let id = DescriptorId(self.descriptors.len());
        let data = file.to_bytes();
        let name_len = file.name_len();
        let flags = FileFlags::for_file(&file);
        tracing::debug!(
            path = %file.input.virtual_path,
            index = id.0,
            name_len,
            response_len = data.len() - name_len,
            %flags,
            "linked"
        );
        self.descriptors.push(FileDescriptor {
            id,
            file,
            data,
            name_len,
            flags,
            prev: self.tail,
        });
        self.tail = Some(id);
        self
    }

    /// Most recently appended descriptor.
    pub fn tail(&self) -> Option<DescriptorId> {
        self.tail
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn finish(self) -> Chain {
        Chain {
            descriptors: self.descriptors,
            root: self.tail,
        }
    }
}

/// The finished descriptor chain.
#[derive(Debug, Clone)]
pub struct Chain {
    descriptors: Vec<FileDescriptor>,
    root: Option<DescriptorId>,
}

impl Chain {
    /// Link encoded files in the order given.
    pub fn assemble(files: impl IntoIterator<Item = EncodedFile>) -> Self {
        files
            .into_iter()
            .fold(ChainBuilder::new(), ChainBuilder::append)
            .finish()
    }

    /// Head of the list: the last declared descriptor.
    pub fn root(&self) -> Option<&FileDescriptor> {
        self.root.map(|id| &self.descriptors[id.0])
    }

    pub fn count(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, id: DescriptorId) -> Option<&FileDescriptor> {
        self.descriptors.get(id.0)
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> &[FileDescriptor] {
        &self.descriptors
    }

    /// Walk from the root through back-links, as the server does.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            chain: self,
            next: self.root,
        }
    }

    /// First descriptor met during traversal with this virtual path.
    pub fn find(&self, virtual_path: &str) -> Option<&FileDescriptor> {
        self.traverse().find(|d| d.virtual_path() == virtual_path)
    }
}

/// Iterator returned by [`Chain::traverse`].
pub struct Traverse<'a> {
    chain: &'a Chain,
    next: Option<DescriptorId>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = &'a FileDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        let descriptor = self.chain.get(self.next?)?;
        self.next = descriptor.prev;
        Some(descriptor)
    }
}
