//! Share-access vocabulary for open requests.
//!
//! Reference: MS-SMB2 2.2.13

use bitflags::bitflags;

bitflags! {
    /// Specifies the sharing mode for the open: which operations other
    /// concurrent opens of the same object are allowed to perform.
    ///
    /// Reference: MS-SMB2 2.2.13
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShareAccess: u32 {
        /// Other opens are allowed to read this file while this open is present.
        const READ = 0x0000_0001;
        /// Other opens are allowed to write this file while this open is present.
        const WRITE = 0x0000_0002;
        /// Other opens are allowed to delete or rename this file while this open is present.
        const DELETE = 0x0000_0004;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_share_is_empty() {
        assert!(ShareAccess::empty().is_empty());
    }
}
