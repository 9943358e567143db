use crate::cli::args::{QrAction, QrMergeArgs, QrSplitArgs};
use chaos_box::Settings;
use chaos_box::config::expand_path;
use chaos_box::qr::{self, SplitOptions};
use std::fs;

pub fn handle(action: QrAction, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        QrAction::Split(args) => handle_split(args, settings),
        QrAction::Merge(args) => handle_merge(args, settings),
    }
}

fn handle_split(args: QrSplitArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let file = expand_path(&args.file);
    let chunk_size = args.chunk_size.unwrap_or(settings.qr.chunk_size);
    if chunk_size == 0 {
        return Err("--chunk-size must be positive".into());
    }

    if args.calc {
        let size = fs::metadata(&file)?.len();
        println!("{}", qr::total_chunks(size, chunk_size));
        return Ok(());
    }

    let output_dir = match &args.output_dir {
        Some(dir) => expand_path(dir),
        None => qr::default_output_dir(&expand_path(&settings.qr.output_root), &file),
    };
    let report = qr::split(
        &file,
        &SplitOptions {
            chunk_size,
            output_dir,
            resume: args.resume,
            limit: args.limit,
            jobs: args.jobs.unwrap_or(settings.qr.jobs),
        },
    )?;

    if report.failed > 0 {
        return Err(format!("{} QR code(s) failed", report.failed).into());
    }
    tracing::info!("generated {} of {} QR code(s)", report.generated, report.total);
    Ok(())
}

fn handle_merge(args: QrMergeArgs, settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let dir = expand_path(&args.dir);
    if !dir.is_dir() {
        return Err(format!("not a directory: {}", dir.display()).into());
    }
    let report = qr::merge(
        &dir,
        &expand_path(&args.output_file),
        args.jobs.unwrap_or(settings.qr.jobs),
    )?;
    tracing::info!(
        "merged {} chunk(s), {} byte(s); {} image(s) unreadable",
        report.chunks,
        report.bytes,
        report.skipped
    );
    Ok(())
}
