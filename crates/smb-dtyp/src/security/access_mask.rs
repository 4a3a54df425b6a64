//! MS-DTYP 2.4.3 / MS-SMB2 2.2.13.1: ACCESS_MASK

use bitflags::bitflags;

bitflags! {
    /// A 32-bit access mask as used throughout MS-DTYP ACEs and MS-SMB2
    /// create requests. Generic rights (`GENERIC_*`) are resolved against
    /// a target's generic mapping before evaluation; `MAXIMUM_ALLOWED`
    /// is resolved against the target's security descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessMask: u32 {
        // File/directory-specific rights (low 16 bits).
        const FILE_READ_DATA = 0x0000_0001;
        const FILE_WRITE_DATA = 0x0000_0002;
        const FILE_APPEND_DATA = 0x0000_0004;
        const FILE_READ_EA = 0x0000_0008;
        const FILE_WRITE_EA = 0x0000_0010;
        const FILE_EXECUTE = 0x0000_0020;
        const FILE_DELETE_CHILD = 0x0000_0040;
        const FILE_READ_ATTRIBUTES = 0x0000_0080;
        const FILE_WRITE_ATTRIBUTES = 0x0000_0100;

        // Standard rights (next byte).
        const DELETE = 0x0001_0000;
        const READ_CONTROL = 0x0002_0000;
        const WRITE_DAC = 0x0004_0000;
        const WRITE_OWNER = 0x0008_0000;
        const SYNCHRONIZE = 0x0010_0000;

        // Security/audit rights.
        const ACCESS_SYSTEM_SECURITY = 0x0100_0000;

        // Reserved/bookkeeping.
        const MAXIMUM_ALLOWED = 0x0200_0000;

        // Generic rights, resolved via generic mapping before use.
        const GENERIC_ALL = 0x1000_0000;
        const GENERIC_EXECUTE = 0x2000_0000;
        const GENERIC_WRITE = 0x4000_0000;
        const GENERIC_READ = 0x8000_0000;
    }
}

impl AccessMask {
    /// The rights implicitly granted on every successful open, regardless
    /// of what was requested.
    pub const IMPLICIT: Self = Self::FILE_READ_ATTRIBUTES;

    /// Combination considered a "generic" right requiring mapping.
    pub const GENERIC_ALL_BITS: Self = Self::GENERIC_ALL
        .union(Self::GENERIC_EXECUTE)
        .union(Self::GENERIC_WRITE)
        .union(Self::GENERIC_READ);

    /// Resolves `GENERIC_*` bits to their concrete file-object equivalents
    /// using the standard MS-DTYP file generic mapping, leaving any
    /// already-specific bits untouched. `MAXIMUM_ALLOWED` is left for the
    /// caller to resolve against a security descriptor.
    pub fn map_generic(self) -> Self {
        let mut out = self - Self::GENERIC_ALL_BITS;
        if self.contains(Self::GENERIC_READ) {
            out |= Self::FILE_READ_DATA | Self::FILE_READ_EA | Self::FILE_READ_ATTRIBUTES | Self::READ_CONTROL | Self::SYNCHRONIZE;
        }
        if self.contains(Self::GENERIC_WRITE) {
            out |= Self::FILE_WRITE_DATA
                | Self::FILE_APPEND_DATA
                | Self::FILE_WRITE_EA
                | Self::FILE_WRITE_ATTRIBUTES
                | Self::READ_CONTROL
                | Self::SYNCHRONIZE;
        }
        if self.contains(Self::GENERIC_EXECUTE) {
            out |= Self::FILE_EXECUTE | Self::FILE_READ_ATTRIBUTES | Self::READ_CONTROL | Self::SYNCHRONIZE;
        }
        if self.contains(Self::GENERIC_ALL) {
            out = Self::all() - Self::GENERIC_ALL_BITS - Self::MAXIMUM_ALLOWED;
        }
        out
    }

    /// True if this mask, once generic-mapped, asserts only bits a "stat
    /// open" is allowed to assert: at least one of synchronize/read-attrs/
    /// write-attrs, and nothing else.
    pub fn is_stat_open_mask(self) -> bool {
        const STAT_BITS: AccessMask = AccessMask::SYNCHRONIZE
            .union(AccessMask::FILE_READ_ATTRIBUTES)
            .union(AccessMask::FILE_WRITE_ATTRIBUTES);
        !self.is_empty() && STAT_BITS.contains(self) && !self.intersection(STAT_BITS).is_empty()
    }
}
