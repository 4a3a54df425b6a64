//! The pre-authenticated caller identity the engine receives as a
//! precondition of `create_file`. Authentication and group resolution are
//! out of scope; this type is the already-resolved result of that process.

use super::Sid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityToken {
    pub uid: u32,
    pub primary_gid: u32,
    pub sids: Vec<Sid>,
    /// Mirrors the original's `uid == 0 || conn->admin_user` shortcut:
    /// bypasses DACL evaluation entirely.
    pub is_admin_or_root: bool,
}

impl SecurityToken {
    pub fn new(uid: u32, primary_gid: u32, sids: Vec<Sid>) -> Self {
        Self {
            uid,
            primary_gid,
            sids,
            is_admin_or_root: uid == 0,
        }
    }

    pub fn all_sids(&self) -> &[Sid] {
        &self.sids
    }
}
