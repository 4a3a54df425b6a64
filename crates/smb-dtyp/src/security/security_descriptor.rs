//! MS-DTYP 2.4.6: SECURITY_DESCRIPTOR, trimmed to the owner/group/DACL
//! fields the open-arbitration engine needs to resolve effective access.
//! Wire (de)serialization is out of scope; this is an in-memory shape only.

use super::{AccessMask, Acl, Sid};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityDescriptor {
    pub owner_sid: Option<Sid>,
    pub group_sid: Option<Sid>,
    /// Discretionary ACL. `None` means "no DACL": per Windows semantics
    /// this grants unrestricted access rather than denying it.
    pub dacl: Option<Acl>,
}

impl SecurityDescriptor {
    pub fn new(owner_sid: Sid) -> Self {
        Self {
            owner_sid: Some(owner_sid),
            group_sid: None,
            dacl: Some(Acl::new()),
        }
    }

    /// Resolves `requested` (already generic-mapped) against this
    /// descriptor's DACL for the given token SIDs. `is_admin_or_root`
    /// bypasses the DACL entirely, matching the original's
    /// `uid == 0 || conn->admin_user` shortcut.
    pub fn effective_access(
        &self,
        sids: &[Sid],
        requested: AccessMask,
        is_admin_or_root: bool,
    ) -> AccessMask {
        if is_admin_or_root {
            return requested;
        }
        match &self.dacl {
            None => requested,
            Some(dacl) => dacl.evaluate(sids, requested),
        }
    }
}
