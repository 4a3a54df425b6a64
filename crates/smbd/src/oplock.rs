//! C6: the oplock arbitrator.
//!
//! Implements the two-pass break-and-defer algorithm: pass 1 breaks only
//! outstanding batch oplocks, pass 2 breaks any exclusive-or-batch entry
//! unconditionally. Both passes are invoked from the open orchestrator
//! around the share-mode check (S6a, S6c).

use smb_msg::{HandleId, OplockType};

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::share_mode::ShareModeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    BatchOnly,
    IncludeExclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OplockDecision {
    Grant(OplockType),
    SendBreakAndDefer { target: HandleId, break_to: OplockType },
}

/// Runs one pass of break arbitration, or (if no break is needed in this
/// pass) decides the oplock type to grant.
pub fn arbitrate(
    set: &ShareModeSet,
    requested: OplockType,
    is_stat_open: bool,
    delete_only: bool,
    pass: Pass,
    config: &ServerConfig,
) -> Result<OplockDecision> {
    if is_stat_open {
        return Ok(OplockDecision::Grant(OplockType::None));
    }

    if let Some(holder) = set.entries.iter().find(|e| e.oplock_type == OplockType::Batch) {
        let must_break = match pass {
            Pass::BatchOnly => !(delete_only && requested == OplockType::None),
            Pass::IncludeExclusive => true,
        };
        if must_break {
            return Ok(OplockDecision::SendBreakAndDefer {
                target: holder.handle_id,
                break_to: OplockType::None,
            });
        }
    }

    // A delete-only request downgrades pass 2 to "break batch only" — a
    // plain Exclusive (non-Batch) holder is left alone.
    if pass == Pass::IncludeExclusive && !delete_only {
        if let Some(holder) = set
            .entries
            .iter()
            .find(|e| e.oplock_type == OplockType::Exclusive)
        {
            return Ok(OplockDecision::SendBreakAndDefer {
                target: holder.handle_id,
                break_to: OplockType::None,
            });
        }
    }

    // Invariants I1/I2 (ShareModeSet.rs) forbid a set that carries both a
    // live exclusive-or-batch entry and a live level-II entry at once; by
    // this point either pass has already broken any exclusive/batch unless
    // a delete-only request suppressed it, so this classification should
    // see at most one of the two families.
    let has_exclusive_like = set.has_batch_or_exclusive();
    let has_level_ii = set.has_level_ii();
    if has_exclusive_like && has_level_ii {
        return Err(Error::Internal(
            "ShareModeSet carries both an exclusive-like and a level-II oplock entry".into(),
        ));
    }

    if has_exclusive_like {
        // Either the BatchOnly pass (exclusive/batch broken only on pass
        // 2), or a delete-only request on pass 2 that left the holder
        // unbroken above.
        return Ok(OplockDecision::Grant(OplockType::None));
    }

    let has_none = set.entries.iter().any(|e| e.oplock_type == OplockType::None);
    if has_none {
        return Ok(OplockDecision::Grant(OplockType::None));
    }

    if has_level_ii {
        let granted = if config.level2_oplocks && requested.is_level_ii_like() {
            OplockType::LevelII
        } else {
            OplockType::FakeLevelII
        };
        return Ok(OplockDecision::Grant(granted));
    }

    // No valid entry at all: grant as requested, upgrading a `None`
    // request to an internally-tracked `FakeLevelII` for cache-coherence
    // bookkeeping without advertising it to the client.
    let granted = match requested {
        OplockType::None => OplockType::FakeLevelII,
        other if config.level2_oplocks || !other.is_level_ii_like() => other,
        _ => OplockType::FakeLevelII,
    };
    Ok(OplockDecision::Grant(granted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use smb_dtyp::AccessMask;
    use smb_msg::{FileId, PrivateOptions, ServerProcessId, ShareAccess, ShareEntry};

    fn entry(oplock_type: OplockType, handle_id: u64) -> ShareEntry {
        ShareEntry {
            server_process_id: ServerProcessId(1),
            handle_id: HandleId(handle_id),
            access_mask: AccessMask::FILE_READ_DATA,
            share_access: ShareAccess::READ,
            private_options: PrivateOptions::default(),
            oplock_type,
            op_mid: 0,
            file_id: FileId::new(1, 1),
            open_time_unix_nanos: 0,
        }
    }

    #[test]
    fn batch_is_broken_on_pass_one() {
        let mut set = ShareModeSet::default();
        set.add_entry(entry(OplockType::Batch, 1));
        let decision = arbitrate(
            &set,
            OplockType::None,
            false,
            false,
            Pass::BatchOnly,
            &ServerConfig::default(),
        )
        .unwrap();
        assert_eq!(
            decision,
            OplockDecision::SendBreakAndDefer { target: HandleId(1), break_to: OplockType::None }
        );
    }

    #[test]
    fn delete_only_none_request_skips_batch_break_on_pass_one() {
        let mut set = ShareModeSet::default();
        set.add_entry(entry(OplockType::Batch, 1));
        let decision = arbitrate(
            &set,
            OplockType::None,
            false,
            true,
            Pass::BatchOnly,
            &ServerConfig::default(),
        )
        .unwrap();
        assert_eq!(decision, OplockDecision::Grant(OplockType::None));
    }

    #[test]
    fn exclusive_is_broken_only_on_pass_two() {
        let mut set = ShareModeSet::default();
        set.add_entry(entry(OplockType::Exclusive, 1));
        let pass1 = arbitrate(&set, OplockType::None, false, false, Pass::BatchOnly, &ServerConfig::default()).unwrap();
        assert_eq!(pass1, OplockDecision::Grant(OplockType::None));
        let pass2 = arbitrate(&set, OplockType::None, false, false, Pass::IncludeExclusive, &ServerConfig::default()).unwrap();
        assert_eq!(
            pass2,
            OplockDecision::SendBreakAndDefer { target: HandleId(1), break_to: OplockType::None }
        );
    }

    #[test]
    fn delete_only_request_never_breaks_plain_exclusive_holder() {
        let mut set = ShareModeSet::default();
        set.add_entry(entry(OplockType::Exclusive, 1));
        let decision = arbitrate(&set, OplockType::None, false, true, Pass::IncludeExclusive, &ServerConfig::default()).unwrap();
        assert_eq!(decision, OplockDecision::Grant(OplockType::None));
    }

    #[test]
    fn no_entries_upgrades_none_request_to_fake_level_ii() {
        let set = ShareModeSet::default();
        let decision = arbitrate(&set, OplockType::None, false, false, Pass::IncludeExclusive, &ServerConfig::default()).unwrap();
        assert_eq!(decision, OplockDecision::Grant(OplockType::FakeLevelII));
    }

    #[test]
    fn stat_open_always_grants_none() {
        let mut set = ShareModeSet::default();
        set.add_entry(entry(OplockType::Batch, 1));
        let decision = arbitrate(&set, OplockType::Batch, true, false, Pass::IncludeExclusive, &ServerConfig::default()).unwrap();
        assert_eq!(decision, OplockDecision::Grant(OplockType::None));
    }
}
