//! C5: the per-process deferred-open queue.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use smb_msg::FileId;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct DeferredOpenRecord {
    pub file_id: FileId,
    /// The absolute instant the *original* request arrived. Preserved
    /// across every replay of the same `mid` so the deadline never
    /// resets (P6).
    pub request_time: Instant,
    pub timeout: Duration,
    pub delayed_for_oplocks: bool,
}

impl DeferredOpenRecord {
    pub fn deadline(&self) -> Instant {
        self.request_time + self.timeout
    }

    pub fn timed_out_at(&self, now: Instant) -> bool {
        now >= self.deadline()
    }
}

#[derive(Debug, Default)]
pub struct DeferredOpenQueue {
    by_mid: HashMap<u64, DeferredOpenRecord>,
}

impl DeferredOpenQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks `mid`. If `mid` is already parked, this is a fatal internal
    /// error: re-deferring within the same pass indicates the orchestrator
    /// looped without detecting the existing record, which the original
    /// treats as an `SMB_ASSERT`-grade paranoia check.
    pub fn defer(
        &mut self,
        mid: u64,
        file_id: FileId,
        now: Instant,
        timeout: Duration,
        delayed_for_oplocks: bool,
    ) -> Result<()> {
        if self.by_mid.contains_key(&mid) {
            return Err(Error::Internal(format!(
                "mid {mid} deferred a second time in the same pass"
            )));
        }
        self.by_mid.insert(
            mid,
            DeferredOpenRecord {
                file_id,
                request_time: now,
                timeout,
                delayed_for_oplocks,
            },
        );
        Ok(())
    }

    /// Looks up a replay by `mid` without removing it; the orchestrator
    /// removes it explicitly once the replay is fully resolved (success,
    /// a different failure, or a second legitimate defer to a later pass).
    pub fn get(&self, mid: u64) -> Option<&DeferredOpenRecord> {
        self.by_mid.get(&mid)
    }

    pub fn remove(&mut self, mid: u64) -> Option<DeferredOpenRecord> {
        self.by_mid.remove(&mid)
    }

    pub fn is_timed_out(&self, mid: u64, now: Instant) -> bool {
        self.by_mid.get(&mid).is_some_and(|r| r.timed_out_at(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_time_survives_replay() {
        let mut q = DeferredOpenQueue::new();
        let start = Instant::now();
        let file_id = FileId::new(1, 1);
        q.defer(7, file_id, start, Duration::from_secs(1), false).unwrap();
        let rec = *q.get(7).unwrap();
        assert_eq!(rec.request_time, start);
    }

    #[test]
    fn double_defer_same_mid_is_fatal() {
        let mut q = DeferredOpenQueue::new();
        let file_id = FileId::new(1, 1);
        let now = Instant::now();
        q.defer(1, file_id, now, Duration::from_secs(1), false).unwrap();
        let err = q.defer(1, file_id, now, Duration::from_secs(1), false).unwrap_err();
        assert!(matches!(err, Error::Internal(_)));
    }
}
