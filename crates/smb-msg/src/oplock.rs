//! Opportunistic lock vocabulary and break/acknowledge messages.

use crate::FileId;

/// The oplock type held by (or requested for) an open. Beyond the three
/// wire-visible levels (`None`, `LevelII`, `Exclusive`), the engine tracks
/// internal states that never cross the wire: `Batch` is a stronger
/// exclusive variant that also caches open/close, `FakeLevelII` is a
/// level-II the server tracks but never advertises, `Deferred` marks a
/// placeholder entry for a parked request, and `Unused` marks an entry
/// slot that has been vacated but not yet reclaimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OplockType {
    #[default]
    None,
    LevelII,
    Exclusive,
    Batch,
    FakeLevelII,
    Deferred,
    Unused,
}

impl OplockType {
    pub fn is_exclusive_or_batch(self) -> bool {
        matches!(self, Self::Exclusive | Self::Batch)
    }

    pub fn is_level_ii_like(self) -> bool {
        matches!(self, Self::LevelII | Self::FakeLevelII)
    }

    /// True for oplock types that occupy a real, currently-open handle
    /// slot (as opposed to bookkeeping placeholders).
    pub fn is_live(self) -> bool {
        !matches!(self, Self::Deferred | Self::Unused)
    }
}

/// Oplock Break Notification/Acknowledgment/Response message. The wire
/// encoding is identical for all three operations (MS-SMB2 2.2.23.1,
/// 2.2.24.1, 2.2.25.1); this engine only needs the semantic payload, not
/// its wire framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OplockBreakMsg {
    /// For notifications: the level the server will accept as the
    /// downgrade target. For acknowledgments: the level the client
    /// accepted. For responses: the level actually granted.
    pub oplock_level: OplockType,
    pub file_id: FileId,
    /// Correlates the break with the request that triggered it, so the
    /// eventual reply can find and replay the parked deferred-open record.
    pub mid: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_and_exclusive_are_exclusive_like() {
        assert!(OplockType::Batch.is_exclusive_or_batch());
        assert!(OplockType::Exclusive.is_exclusive_or_batch());
        assert!(!OplockType::LevelII.is_exclusive_or_batch());
    }

    #[test]
    fn deferred_and_unused_are_not_live() {
        assert!(!OplockType::Deferred.is_live());
        assert!(!OplockType::Unused.is_live());
        assert!(OplockType::None.is_live());
    }
}
