//! Alternate data stream enumeration.
//!
//! [MS-FSCC 2.4.43](<https://learn.microsoft.com/en-us/openspecs/windows_protocols/ms-fscc/6f9a6b17-9345-4565-a0ba-03a4a75fbc6b>)

/// One entry of a stream enumeration, as returned by the VFS's
/// `stream_info` operation (C1). `name` is the stream name including its
/// leading colon and `:$DATA` type suffix for the default stream's named
/// siblings, matching what `FILE_STREAM_INFORMATION` reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamInfo {
    pub name: String,
    pub size: u64,
    pub allocation_size: u64,
}

impl StreamInfo {
    pub fn default_stream(size: u64, allocation_size: u64) -> Self {
        Self {
            name: "::$DATA".to_string(),
            size,
            allocation_size,
        }
    }

    pub fn is_default(&self) -> bool {
        self.name == "::$DATA"
    }
}
