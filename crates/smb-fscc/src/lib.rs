#![forbid(unsafe_code)]
//! FSCC (File System Control Codes) types the open-arbitration engine
//! needs: file attributes and alternate-stream enumeration.

mod file_attributes;
mod stream_info;

pub use file_attributes::FileAttributes;
pub use stream_info::StreamInfo;
