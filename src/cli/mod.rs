mod args;
mod config;
mod global;
mod handlers;
mod logging;

use clap::{Parser, Subcommand};
use std::fmt::Display;
use std::process::ExitCode;

use args::{
    AptListsArgs, ConfigAction, DebExtractArgs, HalfwidthArgs, IconvArgs, QbtAction,
    RenameDateArgs, SortKeysArgs,
};
use global::GlobalArgs;

#[derive(Parser)]
#[command(name = "chaos-box")]
#[command(version)]
#[command(about = "Small file-munging tools: halfwidth punctuation, UTF-8 re-encoding, date renames and more", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert fullwidth CJK punctuation to ASCII
    Halfwidth(HalfwidthArgs),

    /// Re-encode legacy-encoded text files as UTF-8
    Iconv(IconvArgs),

    /// Prefix file names with their modification date
    RenameDate(RenameDateArgs),

    /// Sort the keys of JSON files in place
    SortKeys(SortKeysArgs),

    /// Count packages per APT list file
    AptLists(AptListsArgs),

    /// Extract control and data tarballs of .deb packages
    DebExtract(DebExtractArgs),

    /// qBittorrent metadata tools
    Qbt {
        #[command(subcommand)]
        action: QbtAction,
    },

    /// Transfer files as series of QR code images
    #[cfg(feature = "qr")]
    Qr {
        #[command(subcommand)]
        action: args::QrAction,
    },

    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Parses the command line, runs the chosen tool and reports its error.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    logging::init(&cli.global);

    let color = cli.global.use_color();
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", format_error(&e, color));
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = config::load_settings(&cli.global)?;

    match cli.command {
        Commands::Halfwidth(args) => handlers::halfwidth::handle(args),
        Commands::Iconv(args) => handlers::iconv::handle(args, &settings),
        Commands::RenameDate(args) => handlers::rename_date::handle(args, &settings),
        Commands::SortKeys(args) => handlers::sort_keys::handle(args),
        Commands::AptLists(args) => handlers::apt_lists::handle(args, &settings),
        Commands::DebExtract(args) => handlers::deb_extract::handle(args),
        Commands::Qbt { action } => handlers::qbt::handle(action, &settings),
        #[cfg(feature = "qr")]
        Commands::Qr { action } => handlers::qr::handle(action, &settings),
        Commands::Config { action } => handlers::config::handle(action, &cli.global, &settings),
    }
}

fn format_error(e: &dyn Display, color: bool) -> String {
    if color {
        format!("\x1b[1;31merror:\x1b[0m {}", e)
    } else {
        format!("error: {}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_plain() {
        assert_eq!(format_error(&"boom", false), "error: boom");
    }

    #[test]
    fn test_format_error_colored() {
        let line = format_error(&"boom", true);
        assert!(line.starts_with("\x1b[1;31merror:"));
        assert!(line.ends_with(" boom"));
    }

    #[test]
    fn test_no_color_flag_is_global() {
        let cli = Cli::try_parse_from(["chaos-box", "config", "path", "--no-color"]).unwrap();
        assert!(cli.global.no_color);
        assert!(!cli.global.use_color());
    }

    #[test]
    fn test_no_color_as_file_name_keeps_color_setting() {
        let cli = Cli::try_parse_from(["chaos-box", "halfwidth", "--", "--no-color"]).unwrap();
        assert!(!cli.global.no_color);
        match cli.command {
            Commands::Halfwidth(args) => {
                assert_eq!(args.files, vec![std::path::PathBuf::from("--no-color")])
            }
            _ => panic!("expected halfwidth"),
        }
    }
}
