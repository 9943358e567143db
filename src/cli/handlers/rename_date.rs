use crate::cli::args::RenameDateArgs;
use chaos_box::Settings;
use chaos_box::config::expand_path;
use chaos_box::date_rename::rename_files;
use chaos_box::walk::{WalkOptions, rglob};

pub fn handle(args: RenameDateArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let dir = expand_path(&args.dir);
    let pattern = args.glob.as_deref().unwrap_or(&settings.rename.glob);
    let files = rglob(
        &dir,
        pattern,
        WalkOptions {
            respect_gitignore: true,
        },
    )?;
    tracing::debug!("{} file(s) match {}", files.len(), pattern);

    let renames = rename_files(&files, args.apply);
    if !args.apply && !renames.is_empty() {
        tracing::info!("dry run: {} file(s) would be renamed, pass --apply", renames.len());
    }
    Ok(())
}
