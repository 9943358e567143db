use crate::cli::args::HalfwidthArgs;
use chaos_box::files::{read_utf8, write_atomic};
use chaos_box::halfwidth::convert_text;
use std::io::{self, Write};

pub fn handle(args: HalfwidthArgs) -> Result<(), Box<dyn std::error::Error>> {
    // all inputs must exist before anything is written
    let missing: Vec<_> = args.files.iter().filter(|f| !f.is_file()).collect();
    if !missing.is_empty() {
        for file in &missing {
            tracing::error!("file not found: {}", file.display());
        }
        return Err(format!("{} input file(s) not found", missing.len()).into());
    }

    let stdout = io::stdout();
    for file in &args.files {
        // the BOM is not part of the first line
        let source = read_utf8(file)?;
        let converted = source.restore_bom(convert_text(&source.text));
        if args.inplace {
            write_atomic(file, converted.as_bytes())?;
            tracing::debug!("rewrote {}", file.display());
        } else {
            stdout.lock().write_all(converted.as_bytes())?;
        }
    }
    Ok(())
}
