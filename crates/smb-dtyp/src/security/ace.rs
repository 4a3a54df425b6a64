//! MS-DTYP 2.4.4: ACE

use bitflags::bitflags;

use super::{AccessMask, Sid};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AceFlags: u8 {
        const OBJECT_INHERIT = 0x01;
        const CONTAINER_INHERIT = 0x02;
        const NO_PROPAGATE_INHERIT = 0x04;
        const INHERIT_ONLY = 0x08;
        const INHERITED = 0x10;
        const SUCCESSFUL_ACCESS = 0x40;
        const FAILED_ACCESS = 0x80;
    }
}

impl AceFlags {
    pub fn inherited(&self) -> bool {
        self.contains(Self::INHERITED)
    }
}

/// The kind of access an [`Ace`] grants or denies. Object-specific ACE
/// types (MS-DTYP 2.4.4.2) are out of scope: this engine only evaluates
/// plain access-allowed/denied ACEs against file objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AceType {
    AccessAllowed,
    AccessDenied,
}

/// A single access control entry: grants or denies `access_mask` to `sid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ace {
    pub ace_type: AceType,
    pub ace_flags: AceFlags,
    pub access_mask: AccessMask,
    pub sid: Sid,
}

impl Ace {
    pub fn allow(sid: Sid, access_mask: AccessMask) -> Self {
        Self {
            ace_type: AceType::AccessAllowed,
            ace_flags: AceFlags::empty(),
            access_mask,
            sid,
        }
    }

    pub fn deny(sid: Sid, access_mask: AccessMask) -> Self {
        Self {
            ace_type: AceType::AccessDenied,
            ace_flags: AceFlags::empty(),
            access_mask,
            sid,
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self.ace_type, AceType::AccessAllowed)
    }
}
