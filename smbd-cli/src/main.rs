mod cli;
mod fs_vfs;

use clap::Parser;
use smb_dtyp::{AccessMask, SecurityToken};
use smb_msg::{CreateOptions, PathName, PrivateOptions, ServerProcessId, ShareAccess};
use smbd::{CreateFileRequest, OpenOrchestrator, ServerConfig};

use cli::{Cli, Commands, OpenCmd};
use fs_vfs::FsVfs;

fn parse_share(spec: &str) -> ShareAccess {
    let mut access = ShareAccess::empty();
    for c in spec.chars() {
        access |= match c {
            'r' => ShareAccess::READ,
            'w' => ShareAccess::WRITE,
            'd' => ShareAccess::DELETE,
            other => {
                log::warn!("ignoring unknown share-mode flag '{other}'");
                ShareAccess::empty()
            }
        };
    }
    access
}

fn run_open(cli: &Cli, cmd: &OpenCmd) {
    let vfs = FsVfs::new(cli.root.as_str());
    let orchestrator = OpenOrchestrator::new(Box::new(vfs), ServerConfig::default(), ServerProcessId(std::process::id() as u64));
    let token = SecurityToken::new(cli.uid, cli.uid, vec![]);

    let mut access_mask = AccessMask::FILE_READ_DATA;
    if cmd.write {
        access_mask |= AccessMask::FILE_WRITE_DATA;
    }
    if cmd.delete {
        access_mask |= AccessMask::DELETE;
    }

    let mut create_options = CreateOptions::empty();
    if cmd.delete_on_close {
        create_options |= CreateOptions::DELETE_ON_CLOSE;
    }

    let request = CreateFileRequest {
        path: PathName::new(cmd.path.clone()),
        root_dir_handle: None,
        access_mask,
        share_access: parse_share(&cmd.share),
        disposition: cmd.disposition.into(),
        create_options,
        private_options: PrivateOptions::default(),
        file_attributes: smb_fscc::FileAttributes::empty(),
        oplock_request: smb_msg::OplockType::None,
        allocation_size: 0,
        security_descriptor: None,
        token: &token,
        vuid: 1,
        pid: std::process::id(),
        mid: 1,
    };

    match orchestrator.create_file(request) {
        Ok((handle_id, info)) => {
            log::info!("opened {} as {handle_id}: {info:?}", cmd.path);
            let _ = orchestrator.close(handle_id);
        }
        Err(e) => log::error!("open of {} failed: {e}", cmd.path),
    }
}

fn run_mkdir(cli: &Cli, cmd: &OpenCmd) {
    let vfs = FsVfs::new(cli.root.as_str());
    let orchestrator = OpenOrchestrator::new(Box::new(vfs), ServerConfig::default(), ServerProcessId(std::process::id() as u64));
    let token = SecurityToken::new(cli.uid, cli.uid, vec![]);
    let path = PathName::new(cmd.path.clone());

    let req = smbd::directory::DirectoryOpenRequest {
        path: &path,
        access_mask: AccessMask::FILE_READ_DATA,
        share_access: parse_share(&cmd.share),
        disposition: cmd.disposition.into(),
        delete_on_close: cmd.delete_on_close,
        vuid: 1,
        pid: std::process::id(),
    };

    match orchestrator.open_directory(&token, &req) {
        Ok((_, created)) => log::info!("{} directory {}", if created { "created" } else { "opened" }, cmd.path),
        Err(e) => log::error!("mkdir of {} failed: {e}", cmd.path),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Open(cmd) => run_open(&cli, cmd),
        Commands::Mkdir(cmd) => run_mkdir(&cli, cmd),
    }
}
