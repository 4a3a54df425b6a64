//! C10: directory open, the parallel path to the file orchestrator (C9).
//!
//! Directories never carry oplocks and accept a narrower disposition set;
//! delete-on-close is probed against directory emptiness and applied at
//! close rather than at open time.

use smb_dtyp::{AccessMask, SecurityToken};
use smb_msg::{
    CreateDisposition, FileId, HandleId, OplockType, PathName, PrivateOptions, ServerProcessId, ShareAccess,
    ShareEntry,
};

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::handles::Fsp;
use crate::share_mode::{share_conflict, ShareModeStore};
use crate::vfs::Vfs;

pub struct DirectoryOpenRequest<'a> {
    pub path: &'a PathName,
    pub access_mask: AccessMask,
    pub share_access: ShareAccess,
    pub disposition: CreateDisposition,
    pub delete_on_close: bool,
    pub vuid: u64,
    pub pid: u32,
}

/// Opens or creates a directory. Restricted to `OPEN`, `CREATE`, and
/// `OPEN_IF`; anything else is rejected outright, matching the original's
/// narrower directory-disposition set.
///
/// Directories participate in the C3 share-mode table exactly like files
/// (minus oplocks): the conflict predicate runs against the same
/// `ShareModeSet`, and a granted `delete_on_close` is recorded on the
/// lease rather than the `Fsp` so [`crate::OpenOrchestrator::close`] can
/// act on it.
pub fn open_directory(
    vfs: &dyn Vfs,
    config: &ServerConfig,
    token: &SecurityToken,
    share_modes: &ShareModeStore,
    process_id: ServerProcessId,
    req: &DirectoryOpenRequest<'_>,
    next_handle_id: HandleId,
) -> Result<(Fsp, FileId, bool)> {
    if req.path.is_stream_open() {
        return Err(Error::NotADirectory);
    }
    match req.disposition {
        CreateDisposition::Open | CreateDisposition::Create | CreateDisposition::OpenIf => {}
        _ => return Err(Error::InvalidParameter("unsupported directory disposition".into())),
    }

    let existing = vfs.stat(&req.path.base_name).ok();
    let (meta, created) = match (existing, req.disposition) {
        (Some(meta), CreateDisposition::Create) => {
            let _ = meta;
            return Err(Error::ObjectNameCollision);
        }
        (Some(meta), _) => {
            if !meta.is_directory {
                return Err(Error::NotADirectory);
            }
            (meta, false)
        }
        (None, CreateDisposition::Open) => return Err(Error::ObjectNameNotFound),
        (None, _) => {
            create_directory_race_safe(vfs, config, token, &req.path.base_name)?;
            (vfs.stat(&req.path.base_name)?, true)
        }
    };

    let granted_access = req.access_mask | AccessMask::IMPLICIT;

    {
        let mut lease = share_modes.lease(meta.file_id);
        if lease.delete_on_close {
            return Err(Error::DeletePending);
        }
        if config.share_modes {
            let conflict = lease
                .entries
                .iter()
                .any(|e| share_conflict(e.access_mask, e.share_access, granted_access, req.share_access));
            if conflict {
                return Err(Error::SharingViolation);
            }
        }
        lease.add_entry(ShareEntry {
            server_process_id: process_id,
            handle_id: next_handle_id,
            access_mask: granted_access,
            share_access: req.share_access,
            private_options: PrivateOptions::default(),
            oplock_type: OplockType::None,
            op_mid: 0,
            file_id: meta.file_id,
            open_time_unix_nanos: 0,
        });
        if req.delete_on_close {
            if !granted_access.contains(AccessMask::DELETE) {
                lease.del_entry(next_handle_id);
                return Err(Error::AccessDenied);
            }
            lease.delete_on_close = true;
        }
    }

    let fsp = Fsp {
        handle_id: next_handle_id,
        file_id: meta.file_id,
        path: req.path.clone(),
        fd: None,
        access_mask: granted_access,
        share_access: req.share_access,
        private_options: Default::default(),
        create_options: Default::default(),
        oplock_type: OplockType::None,
        sent_oplock_break: false,
        can_read: req.access_mask.contains(AccessMask::FILE_READ_DATA),
        can_write: req.access_mask.contains(AccessMask::FILE_WRITE_DATA),
        can_lock: false,
        is_directory: true,
        posix_open: config.posix_extensions,
        initial_delete_on_close: req.delete_on_close,
        initial_allocation_size: 0,
        vuid: req.vuid,
        pid: req.pid,
        open_time_unix_nanos: 0,
        base_fsp: None,
    };

    Ok((fsp, meta.file_id, created))
}

/// Creates `path` as a directory and re-parents its ownership to the
/// connecting user when configured to, guarding against a symlink race by
/// re-stat-ing after `mkdir` and confirming the identity observed still
/// names a real directory (not something swapped in between `mkdir` and
/// the ownership change). A production VFS backed by `std::fs` additionally
/// performs this under a `chdir` into the parent so the re-stat is
/// guaranteed to observe the same inode `mkdir` just created, rather than
/// trusting the path string a second time.
fn create_directory_race_safe(
    vfs: &dyn Vfs,
    config: &ServerConfig,
    token: &SecurityToken,
    path: &str,
) -> Result<()> {
    vfs.mkdir(path)?;
    if !config.inherit_owner {
        return Ok(());
    }
    let after = vfs.lstat(path)?;
    if !after.is_directory {
        return Err(Error::Internal(
            "path was replaced between mkdir and ownership re-parenting".into(),
        ));
    }
    vfs.chown(path, token.uid, token.primary_gid)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::testing::MemoryVfs;

    #[test]
    fn create_if_missing_then_open_succeeds() {
        let vfs = MemoryVfs::new();
        let config = ServerConfig::default();
        let token = SecurityToken::new(1000, 1000, vec![]);
        let share_modes = ShareModeStore::new();
        let path = PathName::new("/dir");
        let req = DirectoryOpenRequest {
            path: &path,
            access_mask: AccessMask::FILE_READ_DATA,
            share_access: ShareAccess::READ,
            disposition: CreateDisposition::OpenIf,
            delete_on_close: false,
            vuid: 1,
            pid: 1,
        };
        let (_, _, created) =
            open_directory(&vfs, &config, &token, &share_modes, ServerProcessId(1), &req, HandleId(1)).unwrap();
        assert!(created);

        let req2 = DirectoryOpenRequest { disposition: CreateDisposition::Open, ..req };
        let (_, _, created2) =
            open_directory(&vfs, &config, &token, &share_modes, ServerProcessId(1), &req2, HandleId(2)).unwrap();
        assert!(!created2);
    }

    #[test]
    fn stream_name_on_directory_rejected() {
        let vfs = MemoryVfs::new();
        let config = ServerConfig::default();
        let token = SecurityToken::new(1000, 1000, vec![]);
        let share_modes = ShareModeStore::new();
        let path = PathName::with_stream("/dir", "s");
        let req = DirectoryOpenRequest {
            path: &path,
            access_mask: AccessMask::FILE_READ_DATA,
            share_access: ShareAccess::READ,
            disposition: CreateDisposition::OpenIf,
            delete_on_close: false,
            vuid: 1,
            pid: 1,
        };
        let err =
            open_directory(&vfs, &config, &token, &share_modes, ServerProcessId(1), &req, HandleId(1)).unwrap_err();
        assert_eq!(err, Error::NotADirectory);
    }

    #[test]
    fn conflicting_share_access_on_directory_is_rejected() {
        let vfs = MemoryVfs::new();
        let config = ServerConfig::default();
        let token = SecurityToken::new(1000, 1000, vec![]);
        let share_modes = ShareModeStore::new();
        let path = PathName::new("/dir");
        let req_a = DirectoryOpenRequest {
            path: &path,
            access_mask: AccessMask::FILE_READ_DATA | AccessMask::DELETE,
            share_access: ShareAccess::READ,
            disposition: CreateDisposition::OpenIf,
            delete_on_close: false,
            vuid: 1,
            pid: 1,
        };
        open_directory(&vfs, &config, &token, &share_modes, ServerProcessId(1), &req_a, HandleId(1)).unwrap();

        let req_b = DirectoryOpenRequest { disposition: CreateDisposition::Open, ..req_a };
        let err =
            open_directory(&vfs, &config, &token, &share_modes, ServerProcessId(1), &req_b, HandleId(2)).unwrap_err();
        assert_eq!(err, Error::SharingViolation);
    }

    #[test]
    fn delete_on_close_without_delete_access_is_denied() {
        let vfs = MemoryVfs::new();
        let config = ServerConfig::default();
        let token = SecurityToken::new(1000, 1000, vec![]);
        let share_modes = ShareModeStore::new();
        let path = PathName::new("/dir");
        let req = DirectoryOpenRequest {
            path: &path,
            access_mask: AccessMask::FILE_READ_DATA,
            share_access: ShareAccess::READ,
            disposition: CreateDisposition::OpenIf,
            delete_on_close: true,
            vuid: 1,
            pid: 1,
        };
        let err =
            open_directory(&vfs, &config, &token, &share_modes, ServerProcessId(1), &req, HandleId(1)).unwrap_err();
        assert_eq!(err, Error::AccessDenied);
    }

    #[test]
    fn delete_on_close_with_delete_access_sets_lease() {
        let vfs = MemoryVfs::new();
        let config = ServerConfig::default();
        let token = SecurityToken::new(1000, 1000, vec![]);
        let share_modes = ShareModeStore::new();
        let path = PathName::new("/dir");
        let req = DirectoryOpenRequest {
            path: &path,
            access_mask: AccessMask::FILE_READ_DATA | AccessMask::DELETE,
            share_access: ShareAccess::READ,
            disposition: CreateDisposition::OpenIf,
            delete_on_close: true,
            vuid: 1,
            pid: 1,
        };
        let (fsp, file_id, _) =
            open_directory(&vfs, &config, &token, &share_modes, ServerProcessId(1), &req, HandleId(1)).unwrap();
        assert!(share_modes.lease(file_id).delete_on_close);
        assert!(fsp.initial_delete_on_close);
    }
}
