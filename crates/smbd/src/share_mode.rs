//! C3: the process-wide share-mode table.
//!
//! Every active open anywhere in the deployment is represented by one
//! [`ShareEntry`] inside the [`ShareModeSet`] keyed by its [`FileId`]. The
//! table itself is a sharded lock: a coarse [`parking_lot::RwLock`] guards
//! insertion/removal of keys, while each key's set is behind its own
//! [`parking_lot::Mutex`] so unrelated files never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{ArcMutexGuard, Mutex, RawMutex, RwLock};
use smb_dtyp::AccessMask;
use smb_msg::{FileId, HandleId, OplockType, ShareAccess, ShareEntry};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct DeferredEntry {
    pub mid: u64,
    pub file_id: FileId,
}

/// All cross-process state tracked for one underlying filesystem object.
#[derive(Debug, Default)]
pub struct ShareModeSet {
    pub entries: Vec<ShareEntry>,
    pub deferred: Vec<DeferredEntry>,
    pub delete_on_close: bool,
    pub old_write_time_unix_nanos: u64,
}

impl ShareModeSet {
    pub fn add_entry(&mut self, entry: ShareEntry) {
        self.entries.push(entry);
    }

    pub fn del_entry(&mut self, handle_id: HandleId) {
        self.entries.retain(|e| e.handle_id != handle_id);
    }

    pub fn add_deferred(&mut self, mid: u64, file_id: FileId) -> Result<()> {
        if self.deferred.iter().any(|d| d.mid == mid) {
            return Err(Error::Internal(format!(
                "mid {mid} deferred twice against the same ShareModeSet"
            )));
        }
        self.deferred.push(DeferredEntry { mid, file_id });
        Ok(())
    }

    pub fn del_deferred(&mut self, mid: u64) {
        self.deferred.retain(|d| d.mid != mid);
    }

    pub fn has_batch_or_exclusive(&self) -> bool {
        self.entries.iter().any(|e| e.oplock_type.is_exclusive_or_batch())
    }

    pub fn has_batch(&self) -> bool {
        self.entries.iter().any(|e| e.oplock_type == OplockType::Batch)
    }

    pub fn has_level_ii(&self) -> bool {
        self.entries.iter().any(|e| e.oplock_type.is_level_ii_like())
    }

    pub fn is_empty_of_live_entries(&self) -> bool {
        !self.entries.iter().any(|e| e.oplock_type.is_live())
    }
}

/// No conflict unless either side touches read/write/append/execute/delete.
fn touches_conflictable(mask: AccessMask) -> bool {
    mask.intersects(
        AccessMask::FILE_READ_DATA
            | AccessMask::FILE_WRITE_DATA
            | AccessMask::FILE_APPEND_DATA
            | AccessMask::FILE_EXECUTE
            | AccessMask::DELETE,
    )
}

/// The six-condition share-conflict predicate (spec §4.10): true if
/// existing entry `e` and new request `(mask, share)` conflict.
pub fn share_conflict(
    e_mask: AccessMask,
    e_share: ShareAccess,
    n_mask: AccessMask,
    n_share: ShareAccess,
) -> bool {
    if !touches_conflictable(e_mask) && !touches_conflictable(n_mask) {
        return false;
    }
    let e_wants_write = e_mask.intersects(AccessMask::FILE_WRITE_DATA | AccessMask::FILE_APPEND_DATA);
    let n_wants_write = n_mask.intersects(AccessMask::FILE_WRITE_DATA | AccessMask::FILE_APPEND_DATA);
    let e_wants_read = e_mask.intersects(AccessMask::FILE_READ_DATA | AccessMask::FILE_EXECUTE);
    let n_wants_read = n_mask.intersects(AccessMask::FILE_READ_DATA | AccessMask::FILE_EXECUTE);
    let e_wants_delete = e_mask.contains(AccessMask::DELETE);
    let n_wants_delete = n_mask.contains(AccessMask::DELETE);

    (e_wants_write && !n_share.contains(ShareAccess::WRITE))
        || (n_wants_write && !e_share.contains(ShareAccess::WRITE))
        || (e_wants_read && !n_share.contains(ShareAccess::READ))
        || (n_wants_read && !e_share.contains(ShareAccess::READ))
        || (e_wants_delete && !n_share.contains(ShareAccess::DELETE))
        || (n_wants_delete && !e_share.contains(ShareAccess::DELETE))
}

/// Scoped exclusive access to one file's [`ShareModeSet`]. Owns a clone of
/// the table's `Arc`, so it outlives any lookup against the outer table
/// and is released on drop; holding it across a blocking VFS call is the
/// engine's only source of per-key serialization latency.
pub type ShareModeLease = ArcMutexGuard<RawMutex, ShareModeSet>;

/// The shared, cross-process keyed store backing [`ShareModeSet`]s.
#[derive(Default)]
pub struct ShareModeStore {
    table: RwLock<HashMap<FileId, Arc<Mutex<ShareModeSet>>>>,
}

impl ShareModeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lease for `file_id`, creating an empty set if none
    /// exists yet.
    pub fn lease(&self, file_id: FileId) -> ShareModeLease {
        let existing = self.table.read().get(&file_id).cloned();
        let cell = match existing {
            Some(cell) => cell,
            None => self
                .table
                .write()
                .entry(file_id)
                .or_insert_with(|| Arc::new(Mutex::new(ShareModeSet::default())))
                .clone(),
        };
        Mutex::lock_arc(&cell)
    }

    /// Removes `file_id`'s entry from the table if its set has no live
    /// entries and no deferred placeholders left; called after the lease
    /// guarding the last removal is dropped.
    pub fn reap_if_empty(&self, file_id: FileId) {
        let mut w = self.table.write();
        if let Some(cell) = w.get(&file_id) {
            let empty = {
                let set = cell.lock();
                set.is_empty_of_live_entries() && set.deferred.is_empty()
            };
            if empty {
                w.remove(&file_id);
            }
        }
    }
}
