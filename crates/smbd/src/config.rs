//! Runtime share policy, threaded explicitly through the orchestrator
//! instead of consulted via global getters (the original's `lp_*()`
//! family). See the design note on global shared mutable state.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Enforce share-mode checking at all (disabling this is a legacy
    /// escape hatch; the engine still tracks entries for correctness of
    /// delete-on-close and oplocks).
    pub share_modes: bool,
    /// Allow level-II oplocks to be granted at all; when false, any
    /// level-II grant is downgraded to `FakeLevelII`.
    pub level2_oplocks: bool,
    /// Park a transient sharing violation and retry instead of failing it
    /// immediately.
    pub defer_sharing_violations: bool,
    /// Honor POSIX create semantics (skip DOS-attribute mapping, allow
    /// wildcard glyphs in names).
    pub posix_extensions: bool,
    /// Re-parent ownership of newly created files/directories to the
    /// connecting user.
    pub inherit_owner: bool,
    /// Share is mounted read-only: strip TRUNC/CREAT and reject writable
    /// opens regardless of disposition.
    pub read_only: bool,

    pub sharing_violation_wait: Duration,
    pub oplock_break_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            share_modes: true,
            level2_oplocks: true,
            defer_sharing_violations: true,
            posix_extensions: false,
            inherit_owner: false,
            read_only: false,
            sharing_violation_wait: Duration::from_secs(1),
            oplock_break_timeout: Duration::from_secs(35),
        }
    }
}

impl ServerConfig {
    /// Deferred-open timeout for a request parked waiting on an oplock
    /// break: `2 × oplock_break_timeout`, matching the original's paranoia
    /// margin against a client that never acknowledges.
    pub fn oplock_defer_timeout(&self) -> Duration {
        self.oplock_break_timeout * 2
    }
}
