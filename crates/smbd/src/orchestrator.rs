//! C9: the open orchestrator — the top-level `create_file` state machine.

use std::time::{Duration, Instant};

use smb_dtyp::{AccessMask, SecurityDescriptor, SecurityToken};
use smb_fscc::FileAttributes;
use smb_msg::{
    CreateDisposition, CreateOptions, FileId, HandleId, OplockBreakMsg, OplockType, PathName,
    PrivateOptions, ServerProcessId, ShareAccess, ShareEntry,
};

use crate::access;
use crate::config::ServerConfig;
use crate::deferred::DeferredOpenQueue;
use crate::directory::{self, DirectoryOpenRequest};
use crate::disposition::{self, Info};
use crate::error::{Error, Result};
use crate::handles::{Fsp, HandleRegistry};
use crate::oplock::{self, OplockDecision, Pass};
use crate::share_mode::{share_conflict, ShareModeSet, ShareModeStore};
use crate::vfs::{OpenFlags, Vfs};

/// Sink for oplock break notifications the arbitrator decides to send.
/// Delivery and the client's eventual acknowledgment are out of scope;
/// this is only the composition/emission point.
pub trait BreakSender: Send + Sync {
    fn send_break(&self, target: ServerProcessId, msg: OplockBreakMsg);
}

pub struct NullBreakSender;
impl BreakSender for NullBreakSender {
    fn send_break(&self, _target: ServerProcessId, _msg: OplockBreakMsg) {}
}

/// Outcome of [`OpenOrchestrator::arbitrate_and_check`]: either the oplock
/// type to grant a freshly-opened fd, or a compatible handle to duplicate
/// instead of opening at all (FCB/DENY_DOS, S6d).
enum Arbitration {
    Open(OplockType),
    Duplicate(HandleId),
}

pub struct CreateFileRequest<'a> {
    pub path: PathName,
    /// Nonzero means `path` is relative to this already-open directory
    /// handle; resolved by prepending that handle's base_name (§6).
    pub root_dir_handle: Option<HandleId>,
    pub access_mask: AccessMask,
    pub share_access: ShareAccess,
    pub disposition: CreateDisposition,
    pub create_options: CreateOptions,
    pub private_options: PrivateOptions,
    pub file_attributes: FileAttributes,
    pub oplock_request: OplockType,
    pub allocation_size: u64,
    pub security_descriptor: Option<SecurityDescriptor>,
    pub token: &'a SecurityToken,
    pub vuid: u64,
    pub pid: u32,
    pub mid: u64,
}

pub struct OpenOrchestrator {
    pub share_modes: ShareModeStore,
    pub handles: std::sync::Mutex<HandleRegistry>,
    pub deferred: std::sync::Mutex<DeferredOpenQueue>,
    pub vfs: Box<dyn Vfs>,
    pub config: ServerConfig,
    pub process_id: ServerProcessId,
    pub break_sender: Box<dyn BreakSender>,
}

impl OpenOrchestrator {
    pub fn new(vfs: Box<dyn Vfs>, config: ServerConfig, process_id: ServerProcessId) -> Self {
        Self {
            share_modes: ShareModeStore::new(),
            handles: std::sync::Mutex::new(HandleRegistry::new()),
            deferred: std::sync::Mutex::new(DeferredOpenQueue::new()),
            vfs,
            config,
            process_id,
            break_sender: Box::new(NullBreakSender),
        }
    }

    /// S0-S9: resolves a create request into a granted handle, or a
    /// retryable/fatal error. `request.mid` identifies this request across
    /// replays; a caller that gets back `Err(Error::SharingViolation)` is
    /// expected to replay with the identical `mid` once the break ack or
    /// the sharing-violation wait elapses.
    pub fn create_file(&self, request: CreateFileRequest<'_>) -> Result<(HandleId, Info)> {
        let mut request = request;

        // S0: preflight. A nonzero root_dir_handle makes `path` relative to
        // that handle's base_name; resolve it before anything else sees it.
        if let Some(root) = request.root_dir_handle {
            let handles = self.handles.lock().unwrap();
            let root_fsp = handles.get(root).ok_or(Error::ObjectNameNotFound)?;
            request.path.base_name = format!("{}/{}", root_fsp.path.base_name.trim_end_matches('/'), request.path.base_name.trim_start_matches('/'));
        }

        if request.path.is_stream_open() && request.create_options.contains(CreateOptions::DIRECTORY_FILE) {
            return Err(Error::InvalidParameter("stream open of a directory".into()));
        }

        // S5: deferred-replay detection. `request_time` is carried forward
        // from the original attempt so the deadline never resets (P6).
        let mut original_request_time: Option<Instant> = None;
        if let Some(rec) = self.deferred.lock().unwrap().remove(request.mid) {
            let mut lease = self.share_modes.lease(rec.file_id);
            lease.del_deferred(request.mid);
            drop(lease);
            if rec.timed_out_at(Instant::now()) {
                return Err(Error::RequestTimedOut);
            }
            original_request_time = Some(rec.request_time);
        }

        // S1: path & existence.
        let existing_meta = self.vfs.stat(&request.path.base_name).ok();
        let file_exists = existing_meta.is_some();
        let is_directory = existing_meta.as_ref().is_some_and(|m| m.is_directory);

        if is_directory && request.create_options.contains(CreateOptions::NON_DIRECTORY_FILE) {
            return Err(Error::FileIsADirectory);
        }

        disposition::reject_wildcard_name(&request.path.base_name, self.config.posix_extensions)?;

        // S2: access resolution.
        let sd = if file_exists {
            self.vfs.get_nt_acl(&request.path.base_name).ok()
        } else {
            None
        };
        let parent_grants_delete_child = self.parent_grants_delete_child(&request.path.base_name, request.token);
        let broken_symlink_stat_delete =
            access::is_stat_open(request.access_mask) && self.is_broken_symlink(&request.path.base_name);
        let resolved_access = access::resolve_access(
            request.access_mask,
            request.token,
            sd.as_ref(),
            file_exists,
            self.config.posix_extensions,
            parent_grants_delete_child,
            broken_symlink_stat_delete,
        )?;

        // S3: disposition.
        let decision = disposition::decide(request.disposition, file_exists, is_directory, self.config.read_only)?;

        if decision.requires_delete_for_supersede && !resolved_access.contains(AccessMask::DELETE) {
            return Err(Error::AccessDenied);
        }

        // S4: attribute match on overwrite of an existing file.
        if let Some(meta) = &existing_meta {
            if matches!(request.disposition, CreateDisposition::Overwrite | CreateDisposition::OverwriteIf)
                && !meta.attributes.non_archive_subset_of(request.file_attributes)
            {
                return Err(Error::AccessDenied);
            }
        }

        let is_stat_open = access::is_stat_open(request.access_mask);
        let delete_only = resolved_access.contains(AccessMask::DELETE)
            && !resolved_access.intersects(
                AccessMask::FILE_READ_DATA | AccessMask::FILE_WRITE_DATA | AccessMask::FILE_APPEND_DATA | AccessMask::FILE_EXECUTE,
            );

        // S6: existed branch, critical section.
        let mut granted_oplock = OplockType::None;
        if let Some(meta) = &existing_meta {
            match self.arbitrate_and_check(
                meta.file_id,
                &request,
                resolved_access,
                is_stat_open,
                delete_only,
                original_request_time,
            )? {
                Arbitration::Open(t) => granted_oplock = t,
                Arbitration::Duplicate(src_handle) => {
                    return self.finish_via_duplicate(src_handle, &request, resolved_access, decision.info);
                }
            }
        }

        // S7: actual open.
        let fd = self.vfs.open(&request.path.base_name, decision.open_flags)?;
        let meta = match self.vfs.fstat(fd) {
            Ok(m) => m,
            Err(e) => {
                let _ = self.vfs.close(fd);
                return Err(e);
            }
        };

        // S8: race branch — the file sprang into existence between S1 and
        // S7 on a disposition that didn't require exclusivity. Re-run
        // arbitration against the identity we actually opened.
        if !file_exists {
            match self.arbitrate_and_check(meta.file_id, &request, resolved_access, is_stat_open, delete_only, original_request_time) {
                Ok(Arbitration::Open(t)) => granted_oplock = t,
                Ok(Arbitration::Duplicate(src_handle)) => {
                    let _ = self.vfs.close(fd);
                    return self.finish_via_duplicate(src_handle, &request, resolved_access, decision.info);
                }
                Err(e) => {
                    let _ = self.vfs.close(fd);
                    return Err(e);
                }
            }
        }

        // S9: post-open.
        if decision.clear_ads {
            if let Ok(streams) = self.vfs.stream_info(&request.path.base_name) {
                for s in streams.iter().filter(|s| !s.is_default()) {
                    let _ = self.vfs.delete_stream(&request.path.base_name, &s.name);
                }
            }
        }

        if self.vfs.kernel_flock(fd, resolved_access.contains(AccessMask::FILE_WRITE_DATA)).is_err() {
            let _ = self.vfs.close(fd);
            return Err(Error::SharingViolation);
        }

        if decision.open_flags.contains(OpenFlags::TRUNCATE) {
            if let Err(e) = self.vfs.ftruncate(fd, 0) {
                let _ = self.vfs.close(fd);
                return Err(e);
            }
        }

        if request.allocation_size > 0 {
            if let Err(e) = self.vfs.ftruncate(fd, request.allocation_size) {
                let _ = self.vfs.close(fd);
                return Err(e);
            }
        }

        if let Some(sd) = &request.security_descriptor {
            if matches!(decision.info, Info::Created) {
                let _ = self.vfs.fset_nt_acl(fd, sd);
            }
        }

        let mut handles = self.handles.lock().unwrap();
        let handle_id = handles.allocate_id();
        let granted_access = resolved_access | AccessMask::IMPLICIT;
        let fsp = Fsp {
            handle_id,
            file_id: meta.file_id,
            path: request.path.clone(),
            fd: Some(fd),
            access_mask: granted_access,
            share_access: request.share_access,
            private_options: request.private_options,
            create_options: request.create_options,
            oplock_type: granted_oplock,
            sent_oplock_break: false,
            can_read: granted_access.contains(AccessMask::FILE_READ_DATA),
            can_write: granted_access.contains(AccessMask::FILE_WRITE_DATA),
            can_lock: !is_directory,
            is_directory,
            posix_open: self.config.posix_extensions,
            initial_delete_on_close: request.create_options.contains(CreateOptions::DELETE_ON_CLOSE),
            initial_allocation_size: request.allocation_size,
            vuid: request.vuid,
            pid: request.pid,
            open_time_unix_nanos: 0,
            base_fsp: None,
        };

        {
            let effective_share_access =
                disposition::effective_share_access(&request.path.base_name, fsp.private_options, fsp.share_access);
            let mut lease = self.share_modes.lease(meta.file_id);
            lease.add_entry(ShareEntry {
                server_process_id: self.process_id,
                handle_id,
                access_mask: fsp.access_mask,
                share_access: effective_share_access,
                private_options: fsp.private_options,
                oplock_type: fsp.oplock_type,
                op_mid: 0,
                file_id: fsp.file_id,
                open_time_unix_nanos: 0,
            });
            if request.create_options.contains(CreateOptions::DELETE_ON_CLOSE) {
                if !resolved_access.contains(AccessMask::DELETE) {
                    lease.del_entry(handle_id);
                    drop(lease);
                    let _ = self.vfs.close(fd);
                    return Err(Error::AccessDenied);
                }
                lease.delete_on_close = true;
            }
        }

        handles.insert(fsp);
        Ok((handle_id, decision.info))
    }

    /// Opens or creates a directory (C10), allocating and tracking a handle
    /// the same way [`create_file`](Self::create_file) does, so a
    /// subsequent file open can name this directory as its
    /// `root_dir_handle`.
    pub fn open_directory(&self, token: &SecurityToken, req: &DirectoryOpenRequest<'_>) -> Result<(HandleId, bool)> {
        let mut handles = self.handles.lock().unwrap();
        let handle_id = handles.allocate_id();
        let (fsp, _file_id, created) = directory::open_directory(
            self.vfs.as_ref(),
            &self.config,
            token,
            &self.share_modes,
            self.process_id,
            req,
            handle_id,
        )?;
        handles.insert(fsp);
        Ok((handle_id, created))
    }

    /// Runs both oplock-arbitration passes and the share-conflict check
    /// (S6a-S6d / S8) against `file_id`'s live ShareModeSet. On success,
    /// returns the oplock type to grant, or — if a live FCB/DENY_DOS
    /// handle is found compatible with a conflicting request — the handle
    /// to duplicate instead of opening fresh. On a break or an
    /// unresolvable conflict, registers a deferred entry and returns
    /// `SharingViolation`.
    fn arbitrate_and_check(
        &self,
        file_id: FileId,
        request: &CreateFileRequest<'_>,
        resolved_access: AccessMask,
        is_stat_open: bool,
        delete_only: bool,
        original_request_time: Option<Instant>,
    ) -> Result<Arbitration> {
        let mut lease = self.share_modes.lease(file_id);

        if is_stat_open {
            return Ok(Arbitration::Open(OplockType::None));
        }
        if lease.delete_on_close {
            return Err(Error::DeletePending);
        }

        let effective_share_access =
            disposition::effective_share_access(&request.path.base_name, request.private_options, request.share_access);

        let mut granted = OplockType::None;
        for pass in [Pass::BatchOnly, Pass::IncludeExclusive] {
            match oplock::arbitrate(&lease, request.oplock_request, is_stat_open, delete_only, pass, &self.config)? {
                OplockDecision::SendBreakAndDefer { target, break_to } => {
                    self.break_sender.send_break(
                        self.process_id,
                        OplockBreakMsg { oplock_level: break_to, file_id, mid: request.mid },
                    );
                    for entry in lease.entries.iter_mut().filter(|e| e.handle_id == target) {
                        entry.op_mid = request.mid;
                    }
                    self.defer_mid(&mut lease, request.mid, file_id, original_request_time, self.config.oplock_defer_timeout(), true)?;
                    return Err(Error::SharingViolation);
                }
                OplockDecision::Grant(t) => granted = t,
            }

            if pass == Pass::BatchOnly && self.config.share_modes {
                let conflict = lease
                    .entries
                    .iter()
                    .any(|e| share_conflict(e.access_mask, e.share_access, resolved_access, effective_share_access));
                if conflict {
                    if let Some(dup_handle) = self.find_fcb_duplicate(&request.path, request.vuid, request.pid) {
                        return Ok(Arbitration::Duplicate(dup_handle));
                    }
                    if self.config.defer_sharing_violations {
                        self.defer_mid(&mut lease, request.mid, file_id, original_request_time, self.config.sharing_violation_wait, false)?;
                    }
                    return Err(Error::SharingViolation);
                }
            }
        }

        Ok(Arbitration::Open(granted))
    }

    fn defer_mid(
        &self,
        lease: &mut ShareModeSet,
        mid: u64,
        file_id: FileId,
        original_request_time: Option<Instant>,
        timeout: Duration,
        delayed_for_oplocks: bool,
    ) -> Result<()> {
        lease.add_deferred(mid, file_id)?;
        let request_time = original_request_time.unwrap_or_else(Instant::now);
        self.deferred.lock().unwrap().defer(mid, file_id, request_time, timeout, delayed_for_oplocks)?;
        Ok(())
    }

    /// §7 override 2: a sole `DELETE` denial on the target is tolerated
    /// when the parent directory's DACL would grant `FILE_DELETE_CHILD` to
    /// this token.
    fn parent_grants_delete_child(&self, base_name: &str, token: &SecurityToken) -> bool {
        let parent = match base_name.rfind('/') {
            Some(0) => "/",
            Some(idx) => &base_name[..idx],
            None => return false,
        };
        match self.vfs.get_nt_acl(parent) {
            Ok(sd) => {
                let granted = sd.effective_access(token.all_sids(), AccessMask::FILE_DELETE_CHILD, token.is_admin_or_root);
                granted.contains(AccessMask::FILE_DELETE_CHILD)
            }
            Err(_) => false,
        }
    }

    fn find_fcb_duplicate(&self, path: &PathName, vuid: u64, pid: u32) -> Option<HandleId> {
        let handles = self.handles.lock().unwrap();
        handles.find_fcb_candidate(path, vuid, pid).map(|f| f.handle_id)
    }

    /// Finishes an open via FCB/DENY_DOS handle duplication: duplicates
    /// `src_handle`'s already-open fd instead of performing a fresh
    /// `vfs.open`, and skips truncation, the kernel flock, and
    /// security-descriptor application entirely — `src_handle` already did
    /// all of that for this same underlying file.
    fn finish_via_duplicate(
        &self,
        src_handle: HandleId,
        request: &CreateFileRequest<'_>,
        resolved_access: AccessMask,
        info: Info,
    ) -> Result<(HandleId, Info)> {
        let (src_fd, file_id, is_directory) = {
            let handles = self.handles.lock().unwrap();
            let src = handles
                .get(src_handle)
                .ok_or_else(|| Error::Internal("fcb duplicate candidate vanished".into()))?;
            let src_fd = src
                .fd
                .ok_or_else(|| Error::Internal("fcb duplicate candidate has no fd".into()))?;
            (src_fd, src.file_id, src.is_directory)
        };
        let new_fd = self.vfs.dup(src_fd)?;

        let granted_access = resolved_access | AccessMask::IMPLICIT;
        let effective_share_access =
            disposition::effective_share_access(&request.path.base_name, request.private_options, request.share_access);
        let mut handles = self.handles.lock().unwrap();
        let handle_id = handles.allocate_id();
        let fsp = Fsp {
            handle_id,
            file_id,
            path: request.path.clone(),
            fd: Some(new_fd),
            access_mask: granted_access,
            share_access: request.share_access,
            private_options: request.private_options,
            create_options: request.create_options,
            oplock_type: OplockType::None,
            sent_oplock_break: false,
            can_read: granted_access.contains(AccessMask::FILE_READ_DATA),
            can_write: granted_access.contains(AccessMask::FILE_WRITE_DATA),
            can_lock: !is_directory,
            is_directory,
            posix_open: self.config.posix_extensions,
            initial_delete_on_close: request.create_options.contains(CreateOptions::DELETE_ON_CLOSE),
            initial_allocation_size: request.allocation_size,
            vuid: request.vuid,
            pid: request.pid,
            open_time_unix_nanos: 0,
            base_fsp: None,
        };

        {
            let mut lease = self.share_modes.lease(file_id);
            lease.add_entry(ShareEntry {
                server_process_id: self.process_id,
                handle_id,
                access_mask: fsp.access_mask,
                share_access: effective_share_access,
                private_options: fsp.private_options,
                oplock_type: fsp.oplock_type,
                op_mid: 0,
                file_id: fsp.file_id,
                open_time_unix_nanos: 0,
            });
            if request.create_options.contains(CreateOptions::DELETE_ON_CLOSE) {
                if !resolved_access.contains(AccessMask::DELETE) {
                    lease.del_entry(handle_id);
                    drop(lease);
                    let _ = self.vfs.close(new_fd);
                    return Err(Error::AccessDenied);
                }
                lease.delete_on_close = true;
            }
        }

        handles.insert(fsp);
        Ok((handle_id, info))
    }

    /// §7 override 3: a POSIX stat-delete open targeting a broken symlink
    /// (the link itself resolves but its target does not) is let through
    /// even though there is no reachable DACL to grant `DELETE`.
    fn is_broken_symlink(&self, base_name: &str) -> bool {
        self.vfs.lstat(base_name).is_ok() && self.vfs.stat(base_name).is_err()
    }

    /// Closes a handle, releasing its share-mode entry and applying a
    /// pending delete-on-close if this was the last live entry.
    pub fn close(&self, handle_id: HandleId) -> Result<()> {
        let mut handles = self.handles.lock().unwrap();
        let fsp = handles.remove(handle_id).ok_or_else(|| Error::Internal("close of unknown handle".into()))?;
        if let Some(fd) = fsp.fd {
            self.vfs.close(fd)?;
        }
        let mut lease = self.share_modes.lease(fsp.file_id);
        lease.del_entry(handle_id);
        let delete_pending = lease.delete_on_close && lease.is_empty_of_live_entries();
        drop(lease);
        self.share_modes.reap_if_empty(fsp.file_id);
        if delete_pending {
            if fsp.is_directory {
                self.vfs.rmdir(&fsp.path.base_name)?;
            } else {
                self.vfs.unlink(&fsp.path.base_name)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::testing::MemoryVfs;

    fn token() -> SecurityToken {
        SecurityToken::new(1000, 1000, vec![])
    }

    fn base_request<'a>(path: &str, token: &'a SecurityToken, mid: u64) -> CreateFileRequest<'a> {
        CreateFileRequest {
            path: PathName::new(path),
            root_dir_handle: None,
            access_mask: AccessMask::FILE_READ_DATA | AccessMask::FILE_WRITE_DATA,
            share_access: ShareAccess::empty(),
            disposition: CreateDisposition::OpenIf,
            create_options: CreateOptions::empty(),
            private_options: PrivateOptions::default(),
            file_attributes: FileAttributes::empty(),
            oplock_request: OplockType::None,
            allocation_size: 0,
            security_descriptor: None,
            token,
            vuid: 1,
            pid: 1,
            mid,
        }
    }

    #[test]
    fn create_if_missing_then_open_reports_correct_info() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let (_, info) = orch.create_file(base_request("/f", &tok, 1)).unwrap();
        assert_eq!(info, Info::Created);
        let (_, info2) = orch.create_file(base_request("/f", &tok, 2)).unwrap();
        assert_eq!(info2, Info::Opened);
    }

    #[test]
    fn write_write_conflict_is_rejected() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req_a = base_request("/f", &tok, 1);
        req_a.share_access = ShareAccess::READ;
        orch.create_file(req_a).unwrap();

        let mut req_b = base_request("/f", &tok, 2);
        req_b.share_access = ShareAccess::READ | ShareAccess::WRITE;
        let err = orch.create_file(req_b).unwrap_err();
        assert_eq!(err, Error::SharingViolation);

        let d = orch.deferred.lock().unwrap();
        assert!(d.get(2).is_some());
    }

    #[test]
    fn compatible_read_opens_do_not_conflict() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req_a = base_request("/f", &tok, 1);
        req_a.access_mask = AccessMask::FILE_READ_DATA;
        req_a.share_access = ShareAccess::READ;
        orch.create_file(req_a).unwrap();

        let mut req_b = base_request("/f", &tok, 2);
        req_b.access_mask = AccessMask::FILE_READ_DATA;
        req_b.share_access = ShareAccess::READ;
        assert!(orch.create_file(req_b).is_ok());
    }

    #[test]
    fn delete_pending_is_immediate_no_retry() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req_a = base_request("/f", &tok, 1);
        req_a.create_options = CreateOptions::DELETE_ON_CLOSE;
        req_a.access_mask |= AccessMask::DELETE;
        orch.create_file(req_a).unwrap();

        let req_b = base_request("/f", &tok, 2);
        let err = orch.create_file(req_b).unwrap_err();
        assert_eq!(err, Error::DeletePending);
    }

    #[test]
    fn create_only_on_existing_collides() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req_a = base_request("/new", &tok, 1);
        req_a.disposition = CreateDisposition::Create;
        let (_, info) = orch.create_file(req_a).unwrap();
        assert_eq!(info, Info::Created);

        let mut req_b = base_request("/new", &tok, 2);
        req_b.disposition = CreateDisposition::Create;
        let err = orch.create_file(req_b).unwrap_err();
        assert_eq!(err, Error::ObjectNameCollision);
    }

    #[test]
    fn wildcard_base_name_rejected() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req = base_request("/weird*name", &tok, 1);
        req.disposition = CreateDisposition::Create;
        let err = orch.create_file(req).unwrap_err();
        assert!(matches!(err, Error::ObjectNameInvalid(_)));
    }

    #[test]
    fn close_applies_delete_on_close_when_last_handle() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req = base_request("/gone", &tok, 1);
        req.create_options = CreateOptions::DELETE_ON_CLOSE;
        req.access_mask |= AccessMask::DELETE;
        let (handle_id, _) = orch.create_file(req).unwrap();
        orch.close(handle_id).unwrap();
        assert!(orch.vfs.stat("/gone").is_err());
    }

    #[test]
    fn root_dir_handle_resolves_path_relative_to_open_directory() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();

        let dir_path = PathName::new("/dir");
        let dir_req = crate::directory::DirectoryOpenRequest {
            path: &dir_path,
            access_mask: AccessMask::FILE_READ_DATA,
            share_access: ShareAccess::READ,
            disposition: CreateDisposition::OpenIf,
            delete_on_close: false,
            vuid: 1,
            pid: 1,
        };
        let (dir_handle, created) = orch.open_directory(&tok, &dir_req).unwrap();
        assert!(created);

        let mut child_req = base_request("child", &tok, 2);
        child_req.root_dir_handle = Some(dir_handle);
        let (_, info) = orch.create_file(child_req).unwrap();
        assert_eq!(info, Info::Created);
        assert!(orch.vfs.stat("/dir/child").is_ok());
    }

    #[test]
    fn fcb_duplicate_bypasses_conflict_for_same_principal() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req_a = base_request("/f", &tok, 1);
        req_a.share_access = ShareAccess::empty();
        req_a.private_options.deny_dos = true;
        orch.create_file(req_a).unwrap();

        let mut req_b = base_request("/f", &tok, 2);
        req_b.share_access = ShareAccess::empty();
        assert!(orch.create_file(req_b).is_ok());
    }

    #[test]
    fn delete_on_close_without_delete_access_is_denied() {
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req = base_request("/f", &tok, 1);
        req.create_options = CreateOptions::DELETE_ON_CLOSE;
        let err = orch.create_file(req).unwrap_err();
        assert_eq!(err, Error::AccessDenied);
        assert!(orch.vfs.stat("/f").is_ok());
    }

    #[test]
    fn allocation_size_exceeding_free_space_maps_to_disk_full() {
        let vfs = MemoryVfs::new();
        vfs.fill_disk();
        let orch = OpenOrchestrator::new(Box::new(vfs), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req = base_request("/f", &tok, 1);
        req.allocation_size = 4096;
        let err = orch.create_file(req).unwrap_err();
        assert_eq!(err, Error::DiskFull);
    }

    #[test]
    fn deny_dos_on_executable_suffix_lets_second_open_through() {
        // Distinct vuid/pid on the second request rules out the FCB/DENY_DOS
        // duplicate path (it requires a match on both); this isolates the
        // executable-suffix share relaxation as the reason the second open
        // succeeds despite empty share_access.
        let orch = OpenOrchestrator::new(Box::new(MemoryVfs::new()), ServerConfig::default(), ServerProcessId(1));
        let tok = token();
        let mut req_a = base_request("/app.exe", &tok, 1);
        req_a.share_access = ShareAccess::empty();
        req_a.private_options.deny_dos = true;
        orch.create_file(req_a).unwrap();

        let mut req_b = base_request("/app.exe", &tok, 2);
        req_b.share_access = ShareAccess::empty();
        req_b.private_options.deny_dos = true;
        req_b.vuid = 2;
        req_b.pid = 2;
        assert!(orch.create_file(req_b).is_ok());
    }
}
