//! One active-open record as tracked in the share-mode table.

use smb_dtyp::AccessMask;

use crate::{FileId, HandleId, OplockType, PrivateOptions, ShareAccess};

/// A server process identifier. In a real deployment this names an OS
/// process; here it is an opaque handle letting a single test binary
/// simulate multiple cooperating server processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerProcessId(pub u64);

/// A single record of an active (or parked) open against a [`FileId`],
/// as stored in its [`ShareModeSet`][crate::ShareModeSet]. Every open
/// anywhere in the deployment, not just the current process, has exactly
/// one `ShareEntry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareEntry {
    pub server_process_id: ServerProcessId,
    pub handle_id: HandleId,
    pub access_mask: AccessMask,
    pub share_access: ShareAccess,
    pub private_options: PrivateOptions,
    pub oplock_type: OplockType,
    /// Message id used to correlate a pending break's reply; `0` if no
    /// break is outstanding against this entry.
    pub op_mid: u64,
    pub file_id: FileId,
    pub open_time_unix_nanos: u64,
}

impl ShareEntry {
    pub fn wants(&self, mask: AccessMask) -> bool {
        !(self.access_mask & mask).is_empty()
    }

    pub fn shares(&self, access: ShareAccess) -> bool {
        self.share_access.contains(access)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenameNotifyMsg {
    pub file_id: FileId,
    pub share_connect_path_hash: u64,
}
