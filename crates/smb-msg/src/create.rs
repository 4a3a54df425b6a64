//! Create-disposition and create-option vocabulary for open requests.
//!
//! Reference: MS-SMB2 2.2.13

use bitflags::bitflags;

/// Defines the action the server must take if the file already exists.
///
/// Reference: MS-SMB2 2.2.13
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateDisposition {
    /// If the file already exists, supersede it. Otherwise, create the file.
    Supersede = 0x0,
    /// If the file already exists, return success; otherwise, fail the operation.
    #[default]
    Open = 0x1,
    /// If the file already exists, fail the operation; otherwise, create the file.
    Create = 0x2,
    /// Open the file if it already exists; otherwise, create the file.
    OpenIf = 0x3,
    /// Overwrite the file if it already exists; otherwise, fail the operation.
    Overwrite = 0x4,
    /// Overwrite the file if it already exists; otherwise, create the file.
    OverwriteIf = 0x5,
}

bitflags! {
    /// Options to be applied when creating or opening the file.
    ///
    /// Reference: MS-SMB2 2.2.13
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CreateOptions: u32 {
        /// The file being created or opened is a directory file.
        const DIRECTORY_FILE = 0x0000_0001;
        /// The server performs file write-through.
        const WRITE_THROUGH = 0x0000_0002;
        /// Application intends to read or write at sequential offsets.
        const SEQUENTIAL_ONLY = 0x0000_0004;
        /// File buffering is not performed on this open.
        const NO_INTERMEDIATE_BUFFERING = 0x0000_0008;
        /// If the name matches an existing directory file, the server must
        /// fail the request.
        const NON_DIRECTORY_FILE = 0x0000_0040;
        /// The caller does not understand how to handle extended attributes.
        const NO_EA_KNOWLEDGE = 0x0000_0200;
        /// Application intends to read or write at random offsets.
        const RANDOM_ACCESS = 0x0000_0800;
        /// The file must be automatically deleted when the last open is closed.
        const DELETE_ON_CLOSE = 0x0000_1000;
        /// Must be 0; the server fails the request if set.
        const OPEN_BY_FILE_ID = 0x0000_2000;
        /// The file is being opened for backup intent.
        const OPEN_FOR_BACKUP_INTENT = 0x0000_4000;
        /// The file cannot be compressed.
        const NO_COMPRESSION = 0x0000_8000;
        /// If the file is a reparse point, open the reparse point itself.
        const OPEN_REPARSE_POINT = 0x0020_0000;
        /// In an HSM environment, the file should not be recalled from
        /// tertiary storage.
        const OPEN_NO_RECALL = 0x0040_0000;
        /// Open file to query for free space.
        const OPEN_FOR_FREE_SPACE_QUERY = 0x0080_0000;
    }
}

/// Legacy DOS/OS2 sharing semantics carried in the private portion of the
/// open request (not part of MS-SMB2 proper, but preserved here since the
/// engine's FCB/handle-duplication rule (S6d of the open orchestrator)
/// depends on it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PrivateOptions {
    pub deny_dos: bool,
    pub deny_fcb: bool,
    /// Delete access to a named stream only removes that stream.
    pub stream_delete: bool,
}

/// The action taken in establishing the open. Returned alongside the
/// granted handle.
///
/// Reference: MS-SMB2 2.2.14
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateAction {
    /// An existing file was deleted and a new file was created in its place.
    Superseded = 0x0,
    /// An existing file was opened.
    Opened = 0x1,
    /// A new file was created.
    Created = 0x2,
    /// An existing file was overwritten.
    Overwritten = 0x3,
}
