//! File attributes definition.
//!
//! [MS-FSCC 2.6](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-fscc/ca28ec38-f155-4768-81d6-4bfeb8586fc9>)

use bitflags::bitflags;

bitflags! {
    /// Attributes of a file or directory.
    ///
    /// They can be used in any combination unless noted in the description
    /// of the attribute's meaning.
    ///
    /// [MS-FSCC 2.6](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-fscc/ca28ec38-f155-4768-81d6-4bfeb8586fc9>)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FileAttributes: u32 {
        /// A file or directory that is read-only. For a file, applications
        /// can read the file but cannot write to it or delete it. For a
        /// directory, applications cannot delete it, but applications can
        /// create and delete files from that directory.
        const READONLY = 0x0000_0001;
        /// A file or directory that is hidden. Files and directories marked
        /// with this attribute do not appear in an ordinary directory listing.
        const HIDDEN = 0x0000_0002;
        /// A file or directory that the operating system uses a part of or
        /// uses exclusively.
        const SYSTEM = 0x0000_0004;
        /// This item is a directory.
        const DIRECTORY = 0x0000_0010;
        /// A file or directory that requires to be archived. Applications
        /// use this attribute to mark files for backup or removal.
        const ARCHIVE = 0x0000_0020;
        /// A file that does not have other attributes set. This flag is
        /// used to clear all other flags when specified alone; it MUST be
        /// ignored if other flags are set.
        const NORMAL = 0x0000_0080;
        /// A file that is being used for temporary storage.
        const TEMPORARY = 0x0000_0100;
        /// A file that is a sparse file.
        const SPARSE_FILE = 0x0000_0200;
        /// A file or directory that has an associated reparse point.
        const REPARSE_POINT = 0x0000_0400;
        /// A file or directory that is compressed.
        const COMPRESSED = 0x0000_0800;
        /// The data in this file is not available immediately; it has been
        /// physically moved to offline storage.
        const OFFLINE = 0x0000_1000;
        /// A file or directory that is not indexed by the content indexing
        /// service.
        const NOT_CONTENT_INDEXED = 0x0000_2000;
        /// A file or directory that is encrypted.
        const ENCRYPTED = 0x0000_4000;
        /// A file or directory configured with integrity support.
        const INTEGRITY_STREAM = 0x0000_8000;
        /// A file or directory excluded from the data integrity scan.
        const NO_SCRUB_DATA = 0x0002_0000;
        /// Appears only in directory enumeration classes: the item has no
        /// physical representation on the local system.
        const RECALL_ON_OPEN = 0x0004_0000;
        /// User intent that the item be kept fully present locally.
        const PINNED = 0x0008_0000;
        /// The item should not be kept fully present locally except when
        /// actively accessed.
        const UNPINNED = 0x0010_0000;
        /// The item is not fully present locally.
        const RECALL_ON_DATA_ACCESS = 0x0040_0000;
    }
}

impl FileAttributes {
    /// Attribute bits the original's attribute-match rule (S4 of the open
    /// orchestrator) excludes from comparison: `ARCHIVE` is expected to
    /// differ across overwrites.
    pub const NON_ARCHIVE_MASK: Self = Self::all().difference(Self::ARCHIVE);

    /// True if `self`'s non-archive bits are a subset of `other`'s
    /// non-archive bits, per the open orchestrator's S4 attribute-match
    /// rule for OVERWRITE/OVERWRITE_IF of an existing file.
    pub fn non_archive_subset_of(self, other: Self) -> bool {
        (self & Self::NON_ARCHIVE_MASK).difference(other & Self::NON_ARCHIVE_MASK).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_bit_is_excluded_from_match() {
        let old = FileAttributes::READONLY | FileAttributes::ARCHIVE;
        let new = FileAttributes::READONLY;
        assert!(old.non_archive_subset_of(new));
    }

    #[test]
    fn extra_non_archive_bit_fails_match() {
        let old = FileAttributes::READONLY | FileAttributes::HIDDEN;
        let new = FileAttributes::READONLY;
        assert!(!old.non_archive_subset_of(new));
    }
}
