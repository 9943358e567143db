use crate::cli::args::SortKeysArgs;
use chaos_box::files::sort_json_keys;

pub fn handle(args: SortKeysArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut failures = 0;
    for file in &args.files {
        match sort_json_keys(file) {
            Ok(()) => tracing::info!("sorted {}", file.display()),
            Err(e) => {
                failures += 1;
                tracing::error!("{}: {}", file.display(), e);
            }
        }
    }
    if failures > 0 {
        return Err(format!("{} file(s) could not be sorted", failures).into());
    }
    Ok(())
}
