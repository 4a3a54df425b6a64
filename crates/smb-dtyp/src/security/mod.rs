//! Security types: SIDs, ACEs, ACLs, security descriptors, access masks,
//! and the authenticated token shape.

mod access_mask;
mod ace;
mod acl;
mod security_descriptor;
mod sid;
mod token;

pub use access_mask::AccessMask;
pub use ace::{Ace, AceFlags, AceType};
pub use acl::Acl;
pub use security_descriptor::SecurityDescriptor;
pub use sid::{Sid, SidParseError};
pub use token::SecurityToken;
