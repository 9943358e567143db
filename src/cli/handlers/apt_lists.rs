use crate::cli::{args::AptListsArgs, config::path_or};
use chaos_box::Settings;
use chaos_box::apt_lists::{format_stat, repo_stats};

pub fn handle(args: AptListsArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let dir = path_or(args.dir.as_deref(), &settings.apt.lists_dir);
    let stats = repo_stats(&dir)?;
    if stats.is_empty() {
        tracing::warn!("no *_Packages files in {}", dir.display());
    }
    for (file, packages) in &stats {
        println!("{}", format_stat(file, packages.len()));
    }
    Ok(())
}
