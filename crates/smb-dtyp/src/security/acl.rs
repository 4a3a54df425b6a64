//! MS-DTYP 2.4.5: ACL, plus the access-check evaluation this engine needs.

use super::{Ace, AccessMask, Sid};

/// An access control list: an ordered sequence of ACEs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Acl {
    pub ace: Vec<Ace>,
}

impl Acl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orders the ACEs according to the standard order.
    ///
    /// Note that since we do not have sufficient information about the
    /// inheritance chain here, we only apply the part of the ordering that
    /// is independent of inheritance depth:
    /// 1. All explicit ACEs are placed before any inherited ACEs.
    /// 2. Within the explicit group, access-denied ACEs come before
    ///    access-allowed ACEs.
    ///
    /// See [Order of ACEs in a DACL - MSDN](<https://learn.microsoft.com/en-us/windows/win32/secauthz/order-of-aces-in-a-dacl>).
    pub fn order_aces(&mut self) {
        self.ace.sort_by(Self::sort_aces_by);
    }

    pub fn is_ace_sorted(&self) -> bool {
        self.ace.is_sorted_by(|a, b| Self::sort_aces_by(a, b).is_le())
    }

    fn sort_aces_by(a: &Ace, b: &Ace) -> std::cmp::Ordering {
        let a_inherited = a.ace_flags.inherited();
        let b_inherited = b.ace_flags.inherited();
        if a_inherited != b_inherited {
            return a_inherited.cmp(&b_inherited);
        }
        if a_inherited {
            return std::cmp::Ordering::Equal;
        }
        a.is_allow().cmp(&b.is_allow())
    }

    pub fn insert_ace(&mut self, ace: Ace) {
        self.ace.push(ace);
        self.order_aces();
    }

    /// Evaluates `requested` against this ACL for `sids` (the token's SID
    /// plus its group SIDs), assuming the ACL is already ordered per
    /// [`order_aces`][Self::order_aces] (deny-before-allow among explicit
    /// ACEs). Once an applicable deny ACE removes a bit, no later allow ACE
    /// can re-grant it. Returns the subset of `requested` that is granted.
    pub fn evaluate(&self, sids: &[Sid], requested: AccessMask) -> AccessMask {
        let mut outstanding = requested;
        let mut granted = AccessMask::empty();
        for ace in &self.ace {
            if outstanding.is_empty() {
                break;
            }
            if !sids.contains(&ace.sid) {
                continue;
            }
            let relevant = ace.access_mask & outstanding;
            if relevant.is_empty() {
                continue;
            }
            match ace.ace_type {
                super::AceType::AccessDenied => outstanding -= relevant,
                super::AceType::AccessAllowed => {
                    granted |= relevant;
                    outstanding -= relevant;
                }
            }
        }
        granted
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::security::AceFlags;

    fn ace(sid: &str, allow: bool, mask: AccessMask, inherited: bool) -> Ace {
        let sid = Sid::from_str(sid).unwrap();
        let mut a = if allow {
            Ace::allow(sid, mask)
        } else {
            Ace::deny(sid, mask)
        };
        if inherited {
            a.ace_flags |= AceFlags::INHERITED;
        }
        a
    }

    #[test]
    fn orders_explicit_deny_before_allow_and_keeps_inherited_in_place() {
        let explicit_deny = ace(Sid::S_EVERYONE, false, AccessMask::FILE_READ_DATA, false);
        let explicit_allow = ace(Sid::S_EVERYONE, true, AccessMask::FILE_READ_DATA, false);
        let inherited_1 = ace(Sid::S_EVERYONE, true, AccessMask::FILE_READ_DATA, true);
        let inherited_2 = ace(Sid::S_EVERYONE, false, AccessMask::FILE_READ_DATA, true);

        let mut acl = Acl {
            ace: vec![
                inherited_1.clone(),
                explicit_allow.clone(),
                explicit_deny.clone(),
                inherited_2.clone(),
            ],
        };
        assert!(!acl.is_ace_sorted());
        acl.order_aces();
        assert!(acl.is_ace_sorted());
        assert_eq!(
            acl.ace,
            vec![explicit_deny, explicit_allow, inherited_1, inherited_2]
        );
    }

    #[test]
    fn deny_wins_once_seen_even_if_allow_appears_later_for_same_sid() {
        let sid = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let acl = Acl {
            ace: vec![
                Ace::deny(sid.clone(), AccessMask::FILE_WRITE_DATA),
                Ace::allow(sid.clone(), AccessMask::FILE_WRITE_DATA | AccessMask::FILE_READ_DATA),
            ],
        };
        let granted = acl.evaluate(
            &[sid],
            AccessMask::FILE_WRITE_DATA | AccessMask::FILE_READ_DATA,
        );
        assert_eq!(granted, AccessMask::FILE_READ_DATA);
    }

    #[test]
    fn unmatched_sid_grants_nothing() {
        let everyone = Sid::from_str(Sid::S_EVERYONE).unwrap();
        let other = Sid::from_str("S-1-5-21-1-2-3-1000").unwrap();
        let acl = Acl {
            ace: vec![Ace::allow(everyone, AccessMask::FILE_READ_DATA)],
        };
        assert!(acl.evaluate(&[other], AccessMask::FILE_READ_DATA).is_empty());
    }
}
