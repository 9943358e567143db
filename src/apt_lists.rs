//! Package counts per APT list file.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, at};
use crate::walk::glob_dir;

/// Distinct package names per `*_Packages` file in `lists_dir`, keyed by file name.
pub fn repo_stats(lists_dir: &Path) -> Result<BTreeMap<String, BTreeSet<String>>> {
    let mut stats = BTreeMap::new();
    for path in glob_dir(lists_dir, "*_Packages")? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let packages = package_names(&path)?;
        tracing::debug!(file = %name, count = packages.len(), "scanned package list");
        stats.insert(name, packages);
    }
    Ok(stats)
}

fn package_names(path: &Path) -> Result<BTreeSet<String>> {
    let reader = BufReader::new(File::open(path).map_err(at(path))?);
    let mut names = BTreeSet::new();
    for line in reader.split(b'\n') {
        let line = line.map_err(at(path))?;
        if let Some(rest) = line.strip_prefix(b"Package: ") {
            let name = String::from_utf8_lossy(rest).trim().to_string();
            if !name.is_empty() {
                names.insert(name);
            }
        }
    }
    Ok(names)
}

/// One report line: `{count:5} | {file}`.
pub fn format_stat(file: &str, count: usize) -> String {
    format!("{:5} | {}", count, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_repo_stats_counts_distinct_packages() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("deb.debian.org_debian_dists_main_binary-amd64_Packages"),
            "Package: bash\nVersion: 5.2\n\nPackage: coreutils\n\nPackage: bash\nVersion: 5.1\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("mirror_dists_contrib_binary-amd64_Packages"),
            "Package: foo\r\n",
        )
        .unwrap();
        fs::write(dir.path().join("mirror_dists_InRelease"), "Package: ignored\n").unwrap();

        let stats = repo_stats(dir.path()).unwrap();

        assert_eq!(stats.len(), 2);
        let main = &stats["deb.debian.org_debian_dists_main_binary-amd64_Packages"];
        assert_eq!(main.len(), 2);
        assert!(main.contains("coreutils"));
        assert!(stats["mirror_dists_contrib_binary-amd64_Packages"].contains("foo"));
    }

    #[test]
    fn test_repo_stats_missing_dir() {
        let dir = tempdir().unwrap();
        assert!(repo_stats(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_format_stat() {
        assert_eq!(format_stat("x_Packages", 42), "   42 | x_Packages");
    }
}
