use crate::cli::args::DebExtractArgs;
use chaos_box::deb::DebExtractor;

pub fn handle(args: DebExtractArgs) -> Result<(), Box<dyn std::error::Error>> {
    let failures = DebExtractor::new(args.delete).run(&args.files);
    if failures > 0 {
        return Err(format!("{} package(s) failed", failures).into());
    }
    Ok(())
}
