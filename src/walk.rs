//! Recursive globbing, optionally honoring `.gitignore` at every level.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;

use crate::error::Result;

/// Options for [`rglob`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Skip whatever `.gitignore` files under the root exclude.
    pub respect_gitignore: bool,
}

/// Compile a glob the way `rglob` applies it.
///
/// Patterns without a `/` match the file name in any directory; patterns with
/// one match the path relative to the root.
fn matcher(pattern: &str) -> Result<(GlobMatcher, bool)> {
    let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
    Ok((glob.compile_matcher(), pattern.contains('/')))
}

/// All files under `root` matching `pattern`, sorted.
///
/// `.git` directories are never entered.
pub fn rglob(root: &Path, pattern: &str, options: WalkOptions) -> Result<Vec<PathBuf>> {
    let (glob, match_relative) = matcher(pattern)?;

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .git_ignore(options.respect_gitignore)
        .require_git(false)
        .parents(false)
        .filter_entry(|entry| entry.file_name() != ".git");

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        let matched = if match_relative {
            path.strip_prefix(root).is_ok_and(|rel| glob.is_match(rel))
        } else {
            glob.is_match(entry.file_name())
        };
        if matched {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    tracing::debug!(root = %root.display(), pattern, count = files.len(), "glob done");
    Ok(files)
}

/// Files directly inside `dir` (no recursion) whose name matches `pattern`.
pub fn glob_dir(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let (glob, _) = matcher(pattern)?;
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(crate::error::at(dir))? {
        let entry = entry.map_err(crate::error::at(dir))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && glob.is_match(entry.file_name()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
