#![forbid(unsafe_code)]
//! A CIFS/SMB-compatible file-open arbitration engine: create-disposition
//! resolution, share-mode conflict checking, opportunistic-lock
//! coordination, and deferred-open retry, independent of any wire
//! transport.
//!
//! [`orchestrator::OpenOrchestrator`] is the entry point. It composes:
//! - [`vfs::Vfs`] (C1): the abstract filesystem the engine is built against
//! - [`handles`] (C4): the in-process open-handle registry
//! - [`share_mode`] (C3): the cross-process share-mode table
//! - [`deferred`] (C5): the per-process deferred-open queue
//! - [`oplock`] (C6): the break-and-defer arbitrator
//! - [`access`] (C7): the access-mask resolver
//! - [`disposition`] (C8): the create-disposition engine
//! - [`directory`] (C10): the directory-open path

pub mod access;
pub mod config;
pub mod deferred;
pub mod directory;
pub mod disposition;
pub mod error;
pub mod handles;
pub mod oplock;
pub mod orchestrator;
pub mod share_mode;
pub mod vfs;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use orchestrator::{BreakSender, CreateFileRequest, OpenOrchestrator};
