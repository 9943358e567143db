use crate::cli::args::IconvArgs;
use chaos_box::Settings;
use chaos_box::config::expand_path;
use chaos_box::iconv::Converter;
use chaos_box::walk::{WalkOptions, rglob};

pub fn handle(args: IconvArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let root = expand_path(&args.root);
    let pattern = args.glob.as_deref().unwrap_or(&settings.iconv.glob);
    let inputs = rglob(
        &root,
        pattern,
        WalkOptions {
            respect_gitignore: args.gitignore,
        },
    )?;
    if inputs.is_empty() {
        tracing::warn!("no files matching {} under {}", pattern, root.display());
        return Ok(());
    }

    let converter = Converter {
        root,
        output_dir: args.output_dir.as_deref().map(expand_path),
        suffix: settings.iconv.suffix.clone(),
        detect_bytes: settings.iconv.detect_bytes,
        dry_run: args.dry_run,
        force: args.force,
    };
    let summary = converter.run(&inputs);

    if !summary.skipped.is_empty() {
        tracing::info!("skipped {} file(s) already in UTF-8:", summary.skipped.len());
        for file in &summary.skipped {
            tracing::info!("  {}", file.display());
        }
    }
    if !summary.failed.is_empty() {
        tracing::error!("failed to convert {} file(s):", summary.failed.len());
        for file in &summary.failed {
            tracing::error!("  {}", file.display());
        }
        return Err(format!("{} file(s) failed", summary.failed.len()).into());
    }
    tracing::info!("converted {} file(s)", summary.converted);
    Ok(())
}
