//! C4: the in-process handle registry.

use std::collections::HashMap;

use smb_dtyp::AccessMask;
use smb_msg::{CreateOptions, FileId, HandleId, OplockType, PathName, PrivateOptions, ShareAccess};

use crate::vfs::Fd;

/// A single process-local open handle.
#[derive(Debug, Clone)]
pub struct Fsp {
    pub handle_id: HandleId,
    pub file_id: FileId,
    pub path: PathName,
    /// `None` for a stat-only open (no underlying fd held).
    pub fd: Option<Fd>,

    pub access_mask: AccessMask,
    pub share_access: ShareAccess,
    pub private_options: PrivateOptions,
    pub create_options: CreateOptions,

    pub oplock_type: OplockType,
    pub sent_oplock_break: bool,

    pub can_read: bool,
    pub can_write: bool,
    pub can_lock: bool,
    pub is_directory: bool,
    pub posix_open: bool,

    pub initial_delete_on_close: bool,
    pub initial_allocation_size: u64,

    pub vuid: u64,
    pub pid: u32,
    pub open_time_unix_nanos: u64,

    /// For a stream open, the handle id of the base-file open kept alive
    /// to anchor the stream's lifetime.
    pub base_fsp: Option<HandleId>,
}

impl Fsp {
    pub fn is_stat_open(&self) -> bool {
        self.fd.is_none()
    }
}

#[derive(Debug, Default)]
pub struct HandleRegistry {
    next_id: u64,
    by_handle: HashMap<HandleId, Fsp>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> HandleId {
        self.next_id += 1;
        HandleId(self.next_id)
    }

    pub fn insert(&mut self, fsp: Fsp) {
        self.by_handle.insert(fsp.handle_id, fsp);
    }

    pub fn remove(&mut self, handle_id: HandleId) -> Option<Fsp> {
        self.by_handle.remove(&handle_id)
    }

    pub fn get(&self, handle_id: HandleId) -> Option<&Fsp> {
        self.by_handle.get(&handle_id)
    }

    pub fn get_mut(&mut self, handle_id: HandleId) -> Option<&mut Fsp> {
        self.by_handle.get_mut(&handle_id)
    }

    pub fn iter_for_file(&self, file_id: FileId) -> impl Iterator<Item = &Fsp> {
        self.by_handle.values().filter(move |f| f.file_id == file_id)
    }

    /// Finds a handle eligible for FCB/DENY_DOS duplication: same path,
    /// same vuid and pid, already holding write access, with compatible
    /// private options (S6d of the open orchestrator).
    pub fn find_fcb_candidate(
        &self,
        path: &PathName,
        vuid: u64,
        pid: u32,
    ) -> Option<&Fsp> {
        self.by_handle.values().find(|f| {
            f.path == *path
                && f.vuid == vuid
                && f.pid == pid
                && f.can_write
                && (f.private_options.deny_dos || f.private_options.deny_fcb)
        })
    }

    pub fn rename_all_for_file(&mut self, file_id: FileId, new_base_name: &str) {
        for fsp in self.by_handle.values_mut().filter(|f| f.file_id == file_id) {
            fsp.path.base_name = new_base_name.to_string();
        }
    }
}
