//! A `std::fs`-backed [`Vfs`] for the demo CLI. Not optimized or
//! POSIX-ACL-aware; it exists to exercise [`smbd::OpenOrchestrator`]
//! against a real filesystem rather than `smbd`'s in-memory test double.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use smb_dtyp::{SecurityDescriptor, Sid};
use smb_fscc::{FileAttributes, StreamInfo};
use smb_msg::FileId;
use smbd::error::{Error, Result};
use smbd::vfs::{Fd, FileMeta, OpenFlags, Vfs};

pub struct FsVfs {
    root: PathBuf,
    fds: Mutex<HashMap<u64, File>>,
    next_fd: AtomicU64,
}

impl FsVfs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            fds: Mutex::new(HashMap::new()),
            next_fd: AtomicU64::new(1),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    fn meta_of(path: &Path, follow_symlinks: bool) -> Result<FileMeta> {
        let m = if follow_symlinks { fs::metadata(path) } else { fs::symlink_metadata(path) }
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => Error::ObjectNameNotFound,
                _ => Error::Io(e.to_string()),
            })?;
        Ok(FileMeta {
            file_id: FileId::new(m.dev(), m.ino()),
            is_directory: m.is_dir(),
            size: m.len(),
            attributes: if m.is_dir() { FileAttributes::DIRECTORY } else { FileAttributes::empty() },
            last_write_time_unix_nanos: m.mtime() as u64 * 1_000_000_000 + m.mtime_nsec() as u64,
        })
    }
}

impl Vfs for FsVfs {
    fn stat(&self, path: &str) -> Result<FileMeta> {
        Self::meta_of(&self.resolve(path), true)
    }

    fn lstat(&self, path: &str) -> Result<FileMeta> {
        Self::meta_of(&self.resolve(path), false)
    }

    fn open(&self, path: &str, flags: OpenFlags) -> Result<Fd> {
        let full = self.resolve(path);
        let mut opts = OpenOptions::new();
        opts.read(flags.contains(OpenFlags::READ) || !flags.contains(OpenFlags::WRITE));
        opts.write(flags.contains(OpenFlags::WRITE));
        opts.create(flags.contains(OpenFlags::CREATE));
        opts.create_new(flags.contains(OpenFlags::CREATE) && flags.contains(OpenFlags::EXCLUSIVE));
        opts.truncate(flags.contains(OpenFlags::TRUNCATE));
        let file = opts.open(&full).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ObjectNameNotFound,
            std::io::ErrorKind::AlreadyExists => Error::ObjectNameCollision,
            _ => Error::Io(e.to_string()),
        })?;
        let id = self.next_fd.fetch_add(1, Ordering::SeqCst);
        self.fds.lock().unwrap().insert(id, file);
        Ok(Fd(id))
    }

    fn close(&self, fd: Fd) -> Result<()> {
        self.fds.lock().unwrap().remove(&fd.0);
        Ok(())
    }

    fn dup(&self, fd: Fd) -> Result<Fd> {
        let mut fds = self.fds.lock().unwrap();
        let file = fds.get(&fd.0).ok_or_else(|| Error::Internal("bad fd".into()))?;
        let cloned = file.try_clone()?;
        let id = self.next_fd.fetch_add(1, Ordering::SeqCst);
        fds.insert(id, cloned);
        Ok(Fd(id))
    }

    fn fstat(&self, fd: Fd) -> Result<FileMeta> {
        let fds = self.fds.lock().unwrap();
        let file = fds.get(&fd.0).ok_or_else(|| Error::Internal("bad fd".into()))?;
        let m = file.metadata()?;
        Ok(FileMeta {
            file_id: FileId::new(m.dev(), m.ino()),
            is_directory: m.is_dir(),
            size: m.len(),
            attributes: if m.is_dir() { FileAttributes::DIRECTORY } else { FileAttributes::empty() },
            last_write_time_unix_nanos: m.mtime() as u64 * 1_000_000_000 + m.mtime_nsec() as u64,
        })
    }

    fn ftruncate(&self, fd: Fd, size: u64) -> Result<()> {
        let fds = self.fds.lock().unwrap();
        let file = fds.get(&fd.0).ok_or_else(|| Error::Internal("bad fd".into()))?;
        file.set_len(size).map_err(|e| match e.kind() {
            std::io::ErrorKind::StorageFull => Error::DiskFull,
            _ => Error::Io(e.to_string()),
        })?;
        Ok(())
    }

    fn chown(&self, _path: &str, _uid: u32, _gid: u32) -> Result<()> {
        // Requires CAP_CHOWN in a real deployment; the demo CLI runs
        // unprivileged, so this is a no-op rather than a hard failure.
        Ok(())
    }

    fn fchown(&self, _fd: Fd, _uid: u32, _gid: u32) -> Result<()> {
        Ok(())
    }

    fn fchmod(&self, _fd: Fd, _attrs: FileAttributes) -> Result<()> {
        Ok(())
    }

    fn mkdir(&self, path: &str) -> Result<()> {
        fs::create_dir(self.resolve(path)).map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => Error::ObjectNameCollision,
            _ => Error::Io(e.to_string()),
        })
    }

    fn get_nt_acl(&self, _path: &str) -> Result<SecurityDescriptor> {
        let everyone = Sid::from_str(Sid::S_EVERYONE)
            .map_err(|e| Error::Internal(format!("malformed well-known SID: {e}")))?;
        Ok(SecurityDescriptor::new(everyone))
    }

    fn fset_nt_acl(&self, _fd: Fd, _sd: &SecurityDescriptor) -> Result<()> {
        Ok(())
    }

    fn stream_info(&self, path: &str) -> Result<Vec<StreamInfo>> {
        let m = fs::metadata(self.resolve(path))?;
        Ok(vec![StreamInfo::default_stream(m.len(), m.len())])
    }

    fn delete_stream(&self, _path: &str, _stream_name: &str) -> Result<()> {
        Ok(())
    }

    fn kernel_flock(&self, _fd: Fd, _exclusive: bool) -> Result<()> {
        Ok(())
    }

    fn unlink(&self, path: &str) -> Result<()> {
        fs::remove_file(self.resolve(path)).map_err(Into::into)
    }

    fn rmdir(&self, path: &str) -> Result<()> {
        fs::remove_dir(self.resolve(path)).map_err(Into::into)
    }
}
