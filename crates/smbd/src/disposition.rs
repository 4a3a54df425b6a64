//! C8: the create-disposition engine.

use smb_msg::{CreateDisposition, PrivateOptions, ShareAccess};

use crate::error::{Error, Result};
use crate::vfs::OpenFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Info {
    Created,
    Opened,
    Overwritten,
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub open_flags: OpenFlags,
    /// Alternate data streams must be deleted once the share-mode lock is
    /// held (the orchestrator does this at S9, never here: the file may
    /// still be in use).
    pub clear_ads: bool,
    /// The open-arbitration conformance deviation from the original
    /// (spec.md's Open Question, resolved in SPEC_FULL.md §4.8.1):
    /// `SUPERSEDE` of an existing file additionally requires `DELETE` in
    /// the resolved access mask.
    pub requires_delete_for_supersede: bool,
    pub info: Info,
}

/// Decides how to open `path` given `disposition` and its current
/// existence/kind. `read_only_share` strips `CREATE`/`TRUNCATE` and
/// rejects any writable disposition outright.
pub fn decide(
    disposition: CreateDisposition,
    file_exists: bool,
    is_directory: bool,
    read_only_share: bool,
) -> Result<Decision> {
    if file_exists && is_directory {
        return Err(Error::FileIsADirectory);
    }

    let decision = match (disposition, file_exists) {
        (CreateDisposition::Supersede, true) => Decision {
            open_flags: OpenFlags::CREATE | OpenFlags::TRUNCATE,
            clear_ads: true,
            requires_delete_for_supersede: true,
            info: Info::Superseded,
        },
        (CreateDisposition::Supersede, false) => Decision {
            open_flags: OpenFlags::CREATE,
            clear_ads: false,
            requires_delete_for_supersede: false,
            info: Info::Created,
        },
        (CreateDisposition::OverwriteIf, true) => Decision {
            open_flags: OpenFlags::CREATE | OpenFlags::TRUNCATE,
            clear_ads: true,
            requires_delete_for_supersede: false,
            info: Info::Overwritten,
        },
        (CreateDisposition::OverwriteIf, false) => Decision {
            open_flags: OpenFlags::CREATE,
            clear_ads: false,
            requires_delete_for_supersede: false,
            info: Info::Created,
        },
        (CreateDisposition::Open, true) => Decision {
            open_flags: OpenFlags::empty(),
            clear_ads: false,
            requires_delete_for_supersede: false,
            info: Info::Opened,
        },
        (CreateDisposition::Open, false) => return Err(Error::ObjectNameNotFound),
        (CreateDisposition::Overwrite, true) => Decision {
            open_flags: OpenFlags::TRUNCATE,
            clear_ads: true,
            requires_delete_for_supersede: false,
            info: Info::Overwritten,
        },
        (CreateDisposition::Overwrite, false) => return Err(Error::ObjectNameNotFound),
        (CreateDisposition::Create, true) => return Err(Error::ObjectNameCollision),
        (CreateDisposition::Create, false) => Decision {
            open_flags: OpenFlags::CREATE | OpenFlags::EXCLUSIVE,
            clear_ads: false,
            requires_delete_for_supersede: false,
            info: Info::Created,
        },
        (CreateDisposition::OpenIf, true) => Decision {
            open_flags: OpenFlags::empty(),
            clear_ads: false,
            requires_delete_for_supersede: false,
            info: Info::Opened,
        },
        (CreateDisposition::OpenIf, false) => Decision {
            open_flags: OpenFlags::CREATE,
            clear_ads: false,
            requires_delete_for_supersede: false,
            info: Info::Created,
        },
    };

    if read_only_share && decision.open_flags.intersects(OpenFlags::CREATE | OpenFlags::TRUNCATE) {
        return Err(Error::AccessDenied);
    }

    Ok(decision)
}

const DENY_DOS_EXEMPT_SUFFIXES: &[&str] = &[".com", ".dll", ".exe", ".sym"];

/// True for the DOS/OS2 executable suffixes that exempt a `DENY_DOS` open
/// from its usual share restriction.
fn is_deny_dos_exempt(base_name: &str) -> bool {
    let lower = base_name.to_ascii_lowercase();
    DENY_DOS_EXEMPT_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Computes the share-access set the share-mode table should use for
/// conflict checking, relaxing a `DENY_DOS` open to full read/write sharing
/// for `.com`/`.dll`/`.exe`/`.sym` targets (the DOS/OS2 loader quirk: these
/// suffixes are opened for execution by more than one process at once and
/// DENY_DOS is not meant to block that).
pub fn effective_share_access(
    base_name: &str,
    private_options: PrivateOptions,
    share_access: ShareAccess,
) -> ShareAccess {
    if private_options.deny_dos && is_deny_dos_exempt(base_name) {
        ShareAccess::READ | ShareAccess::WRITE
    } else {
        share_access
    }
}

/// Rejects base names containing Microsoft's wildcard glyphs, unless POSIX
/// extensions are in effect for this open. `/` is the VFS path separator,
/// not a filename glyph, so it is excluded from the forbidden set.
pub fn reject_wildcard_name(base_name: &str, posix_extensions: bool) -> Result<()> {
    const WILDCARDS: &[char] = &['*', '?', '"', '<', '>', '|'];
    if !posix_extensions && base_name.chars().any(|c| WILDCARDS.contains(&c)) {
        return Err(Error::ObjectNameInvalid(base_name.to_string()));
    }
    Ok(())
}
