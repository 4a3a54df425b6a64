//! C1: the abstract filesystem surface the engine is built against.
//!
//! Every method fails with [`crate::Error`]; implementations translate
//! their own errno-like failures through [`Error::Io`][crate::Error::Io]
//! or a more specific variant where the mapping is unambiguous (e.g.
//! `ENOENT` -> `ObjectNameNotFound`).

use smb_dtyp::SecurityDescriptor;
use smb_fscc::{FileAttributes, StreamInfo};
use smb_msg::FileId;

use crate::error::Result;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const READ = 0x1;
        const WRITE = 0x2;
        const CREATE = 0x4;
        const EXCLUSIVE = 0x8;
        const TRUNCATE = 0x10;
    }
}

/// Opaque, VFS-assigned file descriptor. `-1`-equivalent stat-only opens
/// are represented as `None` at the call site rather than a sentinel
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fd(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub file_id: FileId,
    pub is_directory: bool,
    pub size: u64,
    pub attributes: FileAttributes,
    pub last_write_time_unix_nanos: u64,
}

/// The abstract filesystem the engine operates against. A production
/// server backs this with `std::fs` plus platform-specific ACL/attribute
/// calls; tests back it with an in-memory or `tempfile`-rooted
/// implementation.
pub trait Vfs: Send + Sync {
    fn stat(&self, path: &str) -> Result<FileMeta>;
    fn lstat(&self, path: &str) -> Result<FileMeta>;

    fn open(&self, path: &str, flags: OpenFlags) -> Result<Fd>;
    fn close(&self, fd: Fd) -> Result<()>;
    fn fstat(&self, fd: Fd) -> Result<FileMeta>;
    fn ftruncate(&self, fd: Fd, size: u64) -> Result<()>;

    /// Duplicates an already-open `fd` into a second, independently
    /// closeable descriptor over the same underlying file (FCB/DENY_DOS
    /// handle duplication, §4.9 S6d: a conflicting open is satisfied by
    /// duplicating the compatible candidate's fd instead of reopening).
    fn dup(&self, fd: Fd) -> Result<Fd>;

    fn chown(&self, path: &str, uid: u32, gid: u32) -> Result<()>;
    fn fchown(&self, fd: Fd, uid: u32, gid: u32) -> Result<()>;
    fn fchmod(&self, fd: Fd, attrs: FileAttributes) -> Result<()>;

    fn mkdir(&self, path: &str) -> Result<()>;

    fn get_nt_acl(&self, path: &str) -> Result<SecurityDescriptor>;
    fn fset_nt_acl(&self, fd: Fd, sd: &SecurityDescriptor) -> Result<()>;

    fn stream_info(&self, path: &str) -> Result<Vec<StreamInfo>>;
    fn delete_stream(&self, path: &str, stream_name: &str) -> Result<()>;

    /// Best-effort advisory lock matching the granted share mode. Failure
    /// here is recoverable: the caller closes the handle and reports
    /// `SharingViolation` rather than propagating the VFS error verbatim.
    fn kernel_flock(&self, fd: Fd, exclusive: bool) -> Result<()>;

    fn unlink(&self, path: &str) -> Result<()>;
    fn rmdir(&self, path: &str) -> Result<()>;
}
