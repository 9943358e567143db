use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Arguments for halfwidth punctuation conversion
#[derive(Args, Debug)]
pub struct HalfwidthArgs {
    /// Files to convert
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Rewrite files in place instead of printing to stdout
    #[arg(short = 'i', long)]
    pub inplace: bool,
}

/// Arguments for re-encoding text files as UTF-8
#[derive(Args, Debug)]
pub struct IconvArgs {
    /// Directory to search
    #[arg(short = 'r', long, default_value = ".")]
    pub root: PathBuf,

    /// File name pattern (default from settings)
    #[arg(short = 'g', long)]
    pub glob: Option<String>,

    /// Skip files ignored by .gitignore
    #[arg(long)]
    pub gitignore: bool,

    /// Write converted files under this directory, mirroring the tree
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing output files
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Only report what would be converted
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Arguments for date-prefix renaming
#[derive(Args, Debug)]
pub struct RenameDateArgs {
    /// Directory to search
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// File name pattern (default from settings)
    #[arg(short = 'g', long)]
    pub glob: Option<String>,

    /// Actually rename; without it the renames are only logged
    #[arg(long)]
    pub apply: bool,
}

/// Arguments for JSON key sorting
#[derive(Args, Debug)]
pub struct SortKeysArgs {
    /// JSON files to rewrite
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,
}

/// Arguments for APT list statistics
#[derive(Args, Debug)]
pub struct AptListsArgs {
    /// APT lists directory (default from settings)
    #[arg(short = 'd', long)]
    pub dir: Option<PathBuf>,
}

/// Arguments for Debian package extraction
#[derive(Args, Debug)]
pub struct DebExtractArgs {
    /// Packages to extract
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Remove extraction directories instead
    #[arg(short = 'd', long)]
    pub delete: bool,
}

/// qBittorrent subcommands
#[derive(Subcommand, Debug)]
pub enum QbtAction {
    /// Print .torrent / .fastresume files as JSON
    Dump {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },

    /// Rewrite save paths in BT_backup
    Migrate(MigrateArgs),
}

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// BT_backup directory (default from settings)
    #[arg(short = 'b', long)]
    pub bt_backup: Option<PathBuf>,

    /// Regex matched against save_path (default from settings)
    #[arg(short = 'p', long)]
    pub pattern: Option<String>,

    /// Replacement, `$1` style group references allowed (default from settings)
    #[arg(short = 'r', long)]
    pub repl: Option<String>,

    /// Only tasks with this auto_managed flag
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub auto_managed: Option<u8>,

    /// Only tasks whose torrent has this private flag
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub private: Option<u8>,

    /// Write the changes back
    #[arg(long)]
    pub apply: bool,
}

/// QR code subcommands
#[cfg(feature = "qr")]
#[derive(Subcommand, Debug)]
pub enum QrAction {
    /// Split a file into QR code images
    Split(QrSplitArgs),

    /// Merge QR code images back into a file
    Merge(QrMergeArgs),
}

#[cfg(feature = "qr")]
#[derive(Args, Debug)]
pub struct QrSplitArgs {
    /// File to split
    pub file: PathBuf,

    /// Output directory (default: <output_root>/<file stem>)
    #[arg(short = 'O', long)]
    pub output_dir: Option<PathBuf>,

    /// Bytes per QR code (default from settings)
    #[arg(short = 'c', long)]
    pub chunk_size: Option<usize>,

    /// Only print how many images are needed
    #[arg(short = 'C', long)]
    pub calc: bool,

    /// Continue after the highest index already present
    #[arg(short = 'r', long)]
    pub resume: bool,

    /// Generate at most this many images
    #[arg(short = 'l', long)]
    pub limit: Option<usize>,

    /// Worker threads (default from settings)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,
}

#[cfg(feature = "qr")]
#[derive(Args, Debug)]
pub struct QrMergeArgs {
    /// Directory holding the QR code images
    pub dir: PathBuf,

    /// Where to write the merged file
    #[arg(short = 'o', long)]
    pub output_file: PathBuf,

    /// Worker threads (default from settings)
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,
}

/// Config subcommand actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the settings files that are consulted
    Path,
}
