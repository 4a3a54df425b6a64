//! C7: the access-mask resolver.

use smb_dtyp::{AccessMask, SecurityDescriptor, SecurityToken};

use crate::error::{Error, Result};

/// True if `mask`, after generic mapping, asserts only attribute-touching
/// bits — such an open bypasses share-mode checks and oplocks entirely.
pub fn is_stat_open(mask: AccessMask) -> bool {
    mask.map_generic().is_stat_open_mask()
}

/// Resolves `requested` (which may carry `GENERIC_*` or `MAXIMUM_ALLOWED`
/// bits) into the concrete mask to evaluate against share modes and
/// oplocks, and checks it against `sd`'s DACL for `token`.
///
/// `file_exists` controls the `MAXIMUM_ALLOWED` default for a
/// not-yet-created file: the effective set is `GENERIC_ALL` mapped, since
/// there is no security descriptor yet to consult.
///
/// `posix_extensions`, `parent_grants_delete_child`, and
/// `broken_symlink_stat_delete` feed the three access-denied overrides in
/// [`apply_overrides`]; the latter two are the orchestrator's own lookups
/// (the parent directory's DACL, and whether the target is a broken
/// symlink), since both resolutions happen one level up from a single
/// file's access check.
pub fn resolve_access(
    requested: AccessMask,
    token: &SecurityToken,
    sd: Option<&SecurityDescriptor>,
    file_exists: bool,
    posix_extensions: bool,
    parent_grants_delete_child: bool,
    broken_symlink_stat_delete: bool,
) -> Result<AccessMask> {
    let mapped = requested.map_generic();

    // This engine doesn't model SeSecurityPrivilege, so a SACL-touching open
    // is never granted, matching the original's unconditional denial.
    if mapped.contains(AccessMask::ACCESS_SYSTEM_SECURITY) {
        return Err(Error::PrivilegeNotHeld);
    }

    let wanted = if mapped.contains(AccessMask::MAXIMUM_ALLOWED) {
        if !file_exists {
            AccessMask::GENERIC_ALL.map_generic()
        } else {
            match sd {
                Some(sd) => sd.effective_access(
                    token.all_sids(),
                    AccessMask::GENERIC_ALL.map_generic(),
                    token.is_admin_or_root,
                ),
                None => AccessMask::GENERIC_ALL.map_generic(),
            }
        }
    } else {
        mapped - AccessMask::MAXIMUM_ALLOWED
    };

    if !mapped.contains(AccessMask::MAXIMUM_ALLOWED) {
        let granted = match sd {
            Some(sd) => sd.effective_access(token.all_sids(), wanted, token.is_admin_or_root),
            None => wanted,
        };
        if granted != wanted {
            let overridden = apply_overrides(
                wanted,
                granted,
                posix_extensions,
                parent_grants_delete_child,
                broken_symlink_stat_delete,
            )?;
            return Ok(overridden | AccessMask::IMPLICIT);
        }
        return Ok(wanted | AccessMask::IMPLICIT);
    }

    Ok(wanted | AccessMask::IMPLICIT)
}

/// Applies the three access-denied overrides (spec §7): a sole denial of
/// `WRITE_ATTRIBUTES` is tolerated unless POSIX extensions disabled the
/// DOS-attribute mapping that motivates it; a sole denial of `DELETE` is
/// tolerated when the parent directory would grant `FILE_DELETE_CHILD`; and,
/// under POSIX extensions, a sole denial of `DELETE` is also tolerated for a
/// stat-delete open targeting a broken symlink (there is no reachable file
/// to consult a DACL on).
fn apply_overrides(
    wanted: AccessMask,
    granted: AccessMask,
    posix_extensions: bool,
    parent_grants_delete_child: bool,
    broken_symlink_stat_delete: bool,
) -> Result<AccessMask> {
    let missing = wanted - granted;
    if missing == AccessMask::FILE_WRITE_ATTRIBUTES && !posix_extensions {
        return Ok(wanted);
    }
    if missing == AccessMask::DELETE && parent_grants_delete_child {
        return Ok(wanted);
    }
    if missing == AccessMask::DELETE && posix_extensions && broken_symlink_stat_delete {
        return Ok(wanted);
    }
    Err(Error::AccessDenied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use smb_dtyp::{Ace, Acl, Sid};

    #[test]
    fn admin_bypasses_dacl() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken {
            uid: 0,
            primary_gid: 0,
            sids: vec![sid.clone()],
            is_admin_or_root: true,
        };
        let mut sd = SecurityDescriptor::new(sid.clone());
        sd.dacl = Some(Acl { ace: vec![Ace::deny(sid, AccessMask::FILE_READ_DATA)] });
        let granted = resolve_access(AccessMask::FILE_READ_DATA, &token, Some(&sd), true, false, false, false).unwrap();
        assert!(granted.contains(AccessMask::FILE_READ_DATA));
    }

    #[test]
    fn denied_bit_surfaces_access_denied() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken::new(1000, 1000, vec![sid.clone()]);
        let mut sd = SecurityDescriptor::new(sid.clone());
        sd.dacl = Some(Acl { ace: vec![Ace::deny(sid, AccessMask::FILE_WRITE_DATA)] });
        let err = resolve_access(AccessMask::FILE_WRITE_DATA, &token, Some(&sd), true, false, false, false).unwrap_err();
        assert_eq!(err, Error::AccessDenied);
    }

    #[test]
    fn no_dacl_grants_everything() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken::new(1000, 1000, vec![sid.clone()]);
        let sd = SecurityDescriptor { owner_sid: Some(sid), group_sid: None, dacl: None };
        let granted = resolve_access(AccessMask::FILE_READ_DATA, &token, Some(&sd), true, false, false, false).unwrap();
        assert!(granted.contains(AccessMask::FILE_READ_DATA));
    }

    #[test]
    fn write_attributes_denial_overridden_by_default() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken::new(1000, 1000, vec![sid.clone()]);
        let mut sd = SecurityDescriptor::new(sid.clone());
        sd.dacl = Some(Acl { ace: vec![Ace::deny(sid, AccessMask::FILE_WRITE_ATTRIBUTES)] });
        let granted = resolve_access(AccessMask::FILE_WRITE_ATTRIBUTES, &token, Some(&sd), true, false, false, false).unwrap();
        assert!(granted.contains(AccessMask::FILE_WRITE_ATTRIBUTES));
    }

    #[test]
    fn write_attributes_denial_enforced_under_posix_extensions() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken::new(1000, 1000, vec![sid.clone()]);
        let mut sd = SecurityDescriptor::new(sid.clone());
        sd.dacl = Some(Acl { ace: vec![Ace::deny(sid, AccessMask::FILE_WRITE_ATTRIBUTES)] });
        let err = resolve_access(AccessMask::FILE_WRITE_ATTRIBUTES, &token, Some(&sd), true, true, false, false).unwrap_err();
        assert_eq!(err, Error::AccessDenied);
    }

    #[test]
    fn delete_denial_overridden_when_parent_grants_delete_child() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken::new(1000, 1000, vec![sid.clone()]);
        let mut sd = SecurityDescriptor::new(sid.clone());
        sd.dacl = Some(Acl { ace: vec![Ace::deny(sid, AccessMask::DELETE)] });
        let granted = resolve_access(AccessMask::DELETE, &token, Some(&sd), true, false, true, false).unwrap();
        assert!(granted.contains(AccessMask::DELETE));
    }

    #[test]
    fn delete_denial_overridden_for_broken_symlink_stat_delete_under_posix() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken::new(1000, 1000, vec![sid.clone()]);
        let mut sd = SecurityDescriptor::new(sid.clone());
        sd.dacl = Some(Acl { ace: vec![Ace::deny(sid, AccessMask::DELETE)] });
        let granted = resolve_access(AccessMask::DELETE, &token, Some(&sd), true, true, false, true).unwrap();
        assert!(granted.contains(AccessMask::DELETE));
    }

    #[test]
    fn delete_denial_for_broken_symlink_enforced_without_posix_extensions() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken::new(1000, 1000, vec![sid.clone()]);
        let mut sd = SecurityDescriptor::new(sid.clone());
        sd.dacl = Some(Acl { ace: vec![Ace::deny(sid, AccessMask::DELETE)] });
        let err = resolve_access(AccessMask::DELETE, &token, Some(&sd), true, false, false, true).unwrap_err();
        assert_eq!(err, Error::AccessDenied);
    }

    #[test]
    fn system_security_access_is_never_granted() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let token = SecurityToken::new(1000, 1000, vec![sid.clone()]);
        let sd = SecurityDescriptor::new(sid);
        let err = resolve_access(AccessMask::ACCESS_SYSTEM_SECURITY, &token, Some(&sd), true, false, false, false)
            .unwrap_err();
        assert_eq!(err, Error::PrivilegeNotHeld);
    }
}
