//! Error taxonomy for the open-arbitration engine.

use thiserror::Error;

/// Every outcome the engine can return from `create_file` or its
/// supporting components, modeled after the NT status codes the original
/// protocol surfaces, plus a handful of internal variants for invariant
/// violations the original treats as `SMB_ASSERT`/`smb_panic`.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("object name not found")]
    ObjectNameNotFound,
    #[error("object name collision")]
    ObjectNameCollision,
    #[error("object name invalid: {0}")]
    ObjectNameInvalid(String),
    #[error("file is a directory")]
    FileIsADirectory,
    #[error("not a directory")]
    NotADirectory,
    #[error("access denied")]
    AccessDenied,
    #[error("sharing violation")]
    SharingViolation,
    #[error("delete pending")]
    DeletePending,
    #[error("privilege not held")]
    PrivilegeNotHeld,
    #[error("disk full")]
    DiskFull,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("request timed out")]
    RequestTimedOut,

    #[error("I/O error: {0}")]
    Io(String),

    /// An invariant the engine depends on was violated. Reaching this
    /// indicates a defect in the engine itself, not a client error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
