use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(version, about = "Exercises the smbd open-arbitration engine against a local directory", long_about = None)]
pub struct Cli {
    /// Directory the demo VFS treats as the share root.
    #[arg(long, default_value = ".")]
    pub root: String,

    /// Authenticated uid/gid the demo token presents as.
    #[arg(long, default_value_t = 1000)]
    pub uid: u32,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Opens (creating if needed) a file and reports the action taken.
    Open(OpenCmd),
    /// Opens a directory, creating it if needed.
    Mkdir(OpenCmd),
}

#[derive(clap::Args)]
pub struct OpenCmd {
    /// Path relative to --root.
    pub path: String,

    #[arg(long, value_enum, default_value_t = CliDisposition::OpenIf)]
    pub disposition: CliDisposition,

    /// Requests write access in addition to read.
    #[arg(long)]
    pub write: bool,

    /// Requests delete access.
    #[arg(long)]
    pub delete: bool,

    /// Share-mode bits this open is willing to grant to others:
    /// any combination of 'r', 'w', 'd'.
    #[arg(long, default_value = "")]
    pub share: String,

    /// Deletes the file/directory when the last handle closes.
    #[arg(long)]
    pub delete_on_close: bool,
}

#[derive(ValueEnum, Copy, Clone, Debug)]
pub enum CliDisposition {
    Supersede,
    Open,
    Create,
    OpenIf,
    Overwrite,
    OverwriteIf,
}

impl From<CliDisposition> for smb_msg::CreateDisposition {
    fn from(d: CliDisposition) -> Self {
        match d {
            CliDisposition::Supersede => Self::Supersede,
            CliDisposition::Open => Self::Open,
            CliDisposition::Create => Self::Create,
            CliDisposition::OpenIf => Self::OpenIf,
            CliDisposition::Overwrite => Self::Overwrite,
            CliDisposition::OverwriteIf => Self::OverwriteIf,
        }
    }
}
