//! Filesystem object identity and path naming.

use std::fmt;

/// Stable identity of an underlying filesystem object: `(device, inode)`,
/// with an optional `extid` disambiguator for filesystems that reuse
/// inode numbers (e.g. across snapshot generations). Two opens of the
/// same path resolve to the same `FileId`; so do two hard links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId {
    pub device: u64,
    pub inode: u64,
    pub extid: u64,
}

impl FileId {
    pub fn new(device: u64, inode: u64) -> Self {
        Self {
            device,
            inode,
            extid: 0,
        }
    }

    pub fn with_extid(device: u64, inode: u64, extid: u64) -> Self {
        Self {
            device,
            inode,
            extid,
        }
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extid == 0 {
            write!(f, "{}:{}", self.device, self.inode)
        } else {
            write!(f, "{}:{}:{}", self.device, self.inode, self.extid)
        }
    }
}

/// Opaque per-process handle identifier. Distinct from [`FileId`]: many
/// `HandleId`s can name opens of the same `FileId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A path, optionally naming an alternate data stream of the base file.
/// `(base_name, None)` denotes the default stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathName {
    pub base_name: String,
    pub stream_name: Option<String>,
}

impl PathName {
    pub fn new(base_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            stream_name: None,
        }
    }

    pub fn with_stream(base_name: impl Into<String>, stream_name: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            stream_name: Some(stream_name.into()),
        }
    }

    pub fn is_stream_open(&self) -> bool {
        self.stream_name.is_some()
    }
}

impl fmt::Display for PathName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stream_name {
            Some(s) => write!(f, "{}:{}", self.base_name, s),
            None => write!(f, "{}", self.base_name),
        }
    }
}
