//! Prefix file names with their last-modified date.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::error::{Result, at};

/// `YYYY-MM-DD-` or `NN-` at the start of a name.
static DATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([0-9]{4}-[0-9]{2}-[0-9]{2}|[0-9]{2})-)?").expect("valid date prefix regex")
});

pub fn strip_date_prefix(name: &str) -> &str {
    match DATE_PREFIX.find(name) {
        Some(m) => &name[m.end()..],
        None => name,
    }
}

/// Local-time `YYYY-MM-DD` of the file's modification time.
pub fn mtime_date(path: &Path) -> Result<String> {
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(at(path))?;
    let local: DateTime<Local> = modified.into();
    Ok(local.format("%Y-%m-%d").to_string())
}

/// Destination of `src` after re-prefixing, and whether it differs from `src`.
pub fn dest_filename(src: &Path) -> Result<(PathBuf, bool)> {
    let date = mtime_date(src)?;
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dest = src.with_file_name(format!("{}-{}", date, strip_date_prefix(&name)));
    let should_rename = dest != src;
    Ok((dest, should_rename))
}

/// A rename that was planned or carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub src: PathBuf,
    pub dest: PathBuf,
}

/// Rename every file that needs it. With `apply` false nothing is touched.
///
/// Failures are logged and skipped; the returned list holds the renames that
/// were planned (dry run) or done.
pub fn rename_files(files: &[PathBuf], apply: bool) -> Vec<Rename> {
    let mut done = Vec::new();
    for src in files {
        let (dest, should_rename) = match dest_filename(src) {
            Ok(planned) => planned,
            Err(e) => {
                tracing::error!("{}", e);
                continue;
            }
        };
        if !should_rename {
            continue;
        }

        if apply {
            if dest.exists() {
                tracing::error!("not renaming {}: {} already exists", src.display(), dest.display());
                continue;
            }
            if let Err(e) = fs::rename(src, &dest) {
                tracing::error!("error renaming {}: {}", src.display(), e);
                continue;
            }
        }
        tracing::info!("src:  {}\ndest: {}\n", src.display(), dest.display());
        done.push(Rename {
            src: src.clone(),
            dest,
        });
    }
    done
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs::File;
    use std::time::SystemTime;
    use tempfile::tempdir;

    const FIXED_PREFIX: &str = "2024-01-15";

    fn touch_at(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let when = Local.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        file.set_modified(SystemTime::from(when)).unwrap();
        path
    }

    #[test]
    fn test_strip_date_prefix() {
        assert_eq!(strip_date_prefix("2020-03-22-notes.md"), "notes.md");
        assert_eq!(strip_date_prefix("25-notes.md"), "notes.md");
        assert_eq!(strip_date_prefix("notes.md"), "notes.md");
        assert_eq!(strip_date_prefix("2020-notes.md"), "2020-notes.md");
        assert_eq!(strip_date_prefix("1-notes.md"), "1-notes.md");
    }

    #[test]
    fn test_no_prefix_gets_date_prefixed() {
        let dir = tempdir().unwrap();
        let f = touch_at(dir.path(), "myfile.txt");
        let (dest, should_rename) = dest_filename(&f).unwrap();
        assert_eq!(dest.file_name().unwrap(), format!("{FIXED_PREFIX}-myfile.txt").as_str());
        assert!(should_rename);
    }

    #[test]
    fn test_already_correct_prefix_no_rename() {
        let dir = tempdir().unwrap();
        let f = touch_at(dir.path(), &format!("{FIXED_PREFIX}-myfile.txt"));
        let (dest, should_rename) = dest_filename(&f).unwrap();
        assert_eq!(dest, f);
        assert!(!should_rename);
    }

    #[test]
    fn test_old_date_prefix_gets_updated() {
        let dir = tempdir().unwrap();
        let f = touch_at(dir.path(), "2020-03-22-myfile.txt");
        let (dest, should_rename) = dest_filename(&f).unwrap();
        assert_eq!(dest.file_name().unwrap(), format!("{FIXED_PREFIX}-myfile.txt").as_str());
        assert!(should_rename);
    }

    #[test]
    fn test_two_digit_prefix_gets_replaced() {
        let dir = tempdir().unwrap();
        let f = touch_at(dir.path(), "25-myfile.txt");
        let (dest, _) = dest_filename(&f).unwrap();
        assert_eq!(dest.file_name().unwrap(), format!("{FIXED_PREFIX}-myfile.txt").as_str());
    }

    #[test]
    fn test_dest_path_is_sibling_and_keeps_extensionless_names() {
        let dir = tempdir().unwrap();
        let f = touch_at(dir.path(), "README");
        let (dest, _) = dest_filename(&f).unwrap();
        assert_eq!(dest.parent().unwrap(), dir.path());
        assert_eq!(dest.file_name().unwrap(), format!("{FIXED_PREFIX}-README").as_str());
    }

    #[test]
    fn test_rename_files_dry_run_and_apply() {
        let dir = tempdir().unwrap();
        let a = touch_at(dir.path(), "a.md");
        let b = touch_at(dir.path(), &format!("{FIXED_PREFIX}-b.md"));
        let files = vec![a.clone(), b.clone()];

        let planned = rename_files(&files, false);
        assert_eq!(planned.len(), 1);
        assert!(a.exists());

        let done = rename_files(&files, true);
        assert_eq!(done.len(), 1);
        assert!(!a.exists());
        assert!(dir.path().join(format!("{FIXED_PREFIX}-a.md")).exists());
        assert!(b.exists());
    }

    #[test]
    fn test_rename_skips_missing_file() {
        let dir = tempdir().unwrap();
        let done = rename_files(&[dir.path().join("gone.md")], true);
        assert!(done.is_empty());
    }
}
