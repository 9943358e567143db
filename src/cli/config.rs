use chaos_box::Settings;
use chaos_box::config::expand_path;
use std::path::{Path, PathBuf};

use crate::cli::global::GlobalArgs;

/// Settings with the user, local and `--config` layers applied.
pub fn load_settings(global: &GlobalArgs) -> Result<Settings, Box<dyn std::error::Error>> {
    let explicit = global.config.as_deref().map(expand_path);
    Ok(Settings::load_with_overrides(explicit.as_deref())?)
}

/// A CLI path if given, else the settings value; tilde-expanded either way.
pub fn path_or(cli: Option<&Path>, fallback: &Path) -> PathBuf {
    expand_path(cli.unwrap_or(fallback))
}
