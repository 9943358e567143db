use crate::cli::{
    args::{MigrateArgs, QbtAction},
    config::path_or,
};
use chaos_box::Settings;
use chaos_box::files::to_json_pretty;
use chaos_box::qbt::{MigrateOptions, dump, migrate};
use regex::Regex;
use std::path::PathBuf;

pub fn handle(action: QbtAction, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        QbtAction::Dump { files } => handle_dump(&files),
        QbtAction::Migrate(args) => handle_migrate(args, settings),
    }
}

fn handle_dump(files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    for file in files {
        match dump(file)? {
            Some(json) => print!("{}", to_json_pretty(&json)?),
            None => tracing::warn!("skipping {}: not a .torrent or .fastresume file", file.display()),
        }
    }
    Ok(())
}

fn handle_migrate(args: MigrateArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let bt_backup = path_or(args.bt_backup.as_deref(), &settings.qbt.bt_backup);
    let pattern = args.pattern.as_deref().unwrap_or(&settings.qbt.pattern);
    let options = MigrateOptions {
        pattern: Regex::new(pattern)?,
        repl: args.repl.unwrap_or_else(|| settings.qbt.repl.clone()),
        auto_managed: args.auto_managed.map(|v| v == 1),
        private: args.private.map(|v| v == 1),
        apply: args.apply,
    };

    let migrations = migrate(&bt_backup, &options)?;
    if options.apply {
        tracing::info!("rewrote {} file(s)", migrations.len());
    } else {
        tracing::info!("{} file(s) would change, pass --apply to write", migrations.len());
    }
    Ok(())
}
