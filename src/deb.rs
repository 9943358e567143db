//! Unpack the control and data tarballs of Debian packages.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result, at};

/// Compression of a `control.tar*` / `data.tar*` member, by suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCompression {
    None,
    Gzip,
    Xz,
    Zstd,
}

impl TarCompression {
    pub fn from_member_name(name: &str) -> Option<Self> {
        let suffix = name.split_once(".tar").map(|(_, rest)| rest)?;
        match suffix {
            "" => Some(TarCompression::None),
            ".gz" => Some(TarCompression::Gzip),
            ".xz" => Some(TarCompression::Xz),
            ".zst" => Some(TarCompression::Zstd),
            _ => None,
        }
    }

    fn reader<'a, R: Read + 'a>(self, inner: R) -> std::io::Result<Box<dyn Read + 'a>> {
        Ok(match self {
            TarCompression::None => Box::new(inner),
            TarCompression::Gzip => Box::new(flate2::read::GzDecoder::new(inner)),
            TarCompression::Xz => Box::new(xz2::read::XzDecoder::new(inner)),
            TarCompression::Zstd => Box::new(zstd::stream::read::Decoder::new(inner)?),
        })
    }
}

/// Where a member goes inside the extraction directory, if anywhere.
fn member_target(name: &str) -> Option<&'static str> {
    if name.starts_with("control.tar") {
        Some("control")
    } else if name.starts_with("data.tar") {
        Some("data")
    } else {
        None
    }
}

/// Sibling directory named after the package file's stem.
pub fn extract_dir_for(deb: &Path) -> PathBuf {
    let stem = deb.file_stem().unwrap_or_default();
    deb.with_file_name(stem)
}

/// What happened to one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Extracted(PathBuf),
    AlreadyExtracted(PathBuf),
    Removed(PathBuf),
    NothingToRemove(PathBuf),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DebExtractor {
    /// Remove extraction directories instead of creating them.
    pub delete_mode: bool,
}

impl DebExtractor {
    pub fn new(delete_mode: bool) -> Self {
        Self { delete_mode }
    }

    pub fn process(&self, deb: &Path) -> Result<Outcome> {
        let extract_dir = extract_dir_for(deb);
        if self.delete_mode {
            remove_extracted(&extract_dir)
        } else {
            extract(deb, &extract_dir)
        }
    }

    /// Process every package, logging failures. Returns the number of failures.
    pub fn run(&self, files: &[PathBuf]) -> usize {
        if files.is_empty() {
            tracing::warn!("no .deb files provided");
            return 0;
        }

        tracing::info!("found {} .deb file(s) to process", files.len());
        let mut failures = 0;
        for deb in files {
            if !deb.exists() {
                tracing::warn!("file '{}' not found", deb.display());
                continue;
            }
            match self.process(deb) {
                Ok(Outcome::Extracted(dir)) => {
                    tracing::info!("extracted '{}' to '{}'", file_name(deb), dir.display())
                }
                Ok(Outcome::AlreadyExtracted(_)) => {
                    tracing::info!("skipping '{}' (already extracted)", file_name(deb))
                }
                Ok(Outcome::Removed(dir)) => tracing::info!("removed '{}'", dir.display()),
                Ok(Outcome::NothingToRemove(_)) => {}
                Err(e) => {
                    failures += 1;
                    tracing::error!("failed to process '{}': {}", file_name(deb), e);
                }
            }
        }
        failures
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn extract(deb: &Path, extract_dir: &Path) -> Result<Outcome> {
    if extract_dir.exists() {
        return Ok(Outcome::AlreadyExtracted(extract_dir.to_path_buf()));
    }

    match unpack_members(deb, extract_dir) {
        Ok(()) => Ok(Outcome::Extracted(extract_dir.to_path_buf())),
        Err(e) => {
            let _ = fs::remove_dir_all(extract_dir);
            Err(e)
        }
    }
}

fn unpack_members(deb: &Path, extract_dir: &Path) -> Result<()> {
    let file = File::open(deb).map_err(at(deb))?;
    let mut archive = ar::Archive::new(file);

    while let Some(entry) = archive.next_entry() {
        let entry = entry.map_err(at(deb))?;
        // GNU ar terminates names with '/'
        let name = String::from_utf8_lossy(entry.header().identifier())
            .trim_end_matches('/')
            .to_string();

        let Some(target) = member_target(&name) else {
            tracing::debug!("skipping member '{}'", name);
            continue;
        };
        let compression =
            TarCompression::from_member_name(&name).ok_or_else(|| Error::UnsupportedMember {
                path: deb.to_path_buf(),
                member: name.clone(),
            })?;

        let dest = extract_dir.join(target);
        fs::create_dir_all(&dest).map_err(at(&dest))?;
        let reader = compression.reader(entry).map_err(at(deb))?;
        tar::Archive::new(reader).unpack(&dest).map_err(at(deb))?;
        tracing::debug!("extracted '{}' to '{}'", name, dest.display());
    }
    Ok(())
}

fn remove_extracted(extract_dir: &Path) -> Result<Outcome> {
    if !extract_dir.is_dir() {
        return Ok(Outcome::NothingToRemove(extract_dir.to_path_buf()));
    }
    fs::remove_dir_all(extract_dir).map_err(at(extract_dir))?;
    Ok(Outcome::Removed(extract_dir.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn tarball(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, content.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap()
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn write_deb(path: &Path, members: &[(&str, Vec<u8>)]) {
        let mut builder = ar::Builder::new(File::create(path).unwrap());
        for (name, data) in members {
            let header = ar::Header::new(name.as_bytes().to_vec(), data.len() as u64);
            builder.append(&header, data.as_slice()).unwrap();
        }
    }

    fn sample_deb(path: &Path) {
        let control = gzip(&tarball(&[("./control", "Package: hello\n")]));
        let data = zstd::encode_all(tarball(&[("./usr/bin/hello", "#!/bin/sh\n")]).as_slice(), 3)
            .unwrap();
        write_deb(
            path,
            &[
                ("debian-binary", b"2.0\n".to_vec()),
                ("control.tar.gz", control),
                ("data.tar.zst", data),
            ],
        );
    }

    #[test]
    fn test_compression_from_member_name() {
        assert_eq!(TarCompression::from_member_name("data.tar"), Some(TarCompression::None));
        assert_eq!(TarCompression::from_member_name("data.tar.gz"), Some(TarCompression::Gzip));
        assert_eq!(TarCompression::from_member_name("data.tar.xz"), Some(TarCompression::Xz));
        assert_eq!(TarCompression::from_member_name("control.tar.zst"), Some(TarCompression::Zstd));
        assert_eq!(TarCompression::from_member_name("data.tar.bz2"), None);
    }

    #[test]
    fn test_extract_dir_is_sibling_stem() {
        assert_eq!(
            extract_dir_for(Path::new("/pool/hello_1.0_amd64.deb")),
            PathBuf::from("/pool/hello_1.0_amd64")
        );
    }

    #[test]
    fn test_extract_control_and_data() {
        let dir = tempdir().unwrap();
        let deb = dir.path().join("hello_1.0_amd64.deb");
        sample_deb(&deb);

        let outcome = DebExtractor::new(false).process(&deb).unwrap();

        let out = dir.path().join("hello_1.0_amd64");
        assert_eq!(outcome, Outcome::Extracted(out.clone()));
        assert_eq!(
            fs::read_to_string(out.join("control/control")).unwrap(),
            "Package: hello\n"
        );
        assert!(out.join("data/usr/bin/hello").is_file());
        assert!(!out.join("debian-binary").exists());

        let again = DebExtractor::new(false).process(&deb).unwrap();
        assert_eq!(again, Outcome::AlreadyExtracted(out));
    }

    #[test]
    fn test_xz_data_member() {
        let dir = tempdir().unwrap();
        let deb = dir.path().join("x.deb");
        let mut encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
        encoder.write_all(&tarball(&[("./etc/x.conf", "k=v\n")])).unwrap();
        write_deb(&deb, &[("data.tar.xz", encoder.finish().unwrap())]);

        DebExtractor::new(false).process(&deb).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("x/data/etc/x.conf")).unwrap(),
            "k=v\n"
        );
    }

    #[test]
    fn test_failure_removes_partial_directory() {
        let dir = tempdir().unwrap();
        let deb = dir.path().join("bad.deb");
        let control = gzip(&tarball(&[("./control", "Package: bad\n")]));
        write_deb(&deb, &[("control.tar.gz", control), ("data.tar.bz2", vec![0; 16])]);

        let err = DebExtractor::new(false).process(&deb).unwrap_err();

        assert!(matches!(err, Error::UnsupportedMember { .. }));
        assert!(!dir.path().join("bad").exists());
    }

    #[test]
    fn test_delete_mode() {
        let dir = tempdir().unwrap();
        let deb = dir.path().join("hello.deb");
        sample_deb(&deb);
        DebExtractor::new(false).process(&deb).unwrap();

        let outcome = DebExtractor::new(true).process(&deb).unwrap();
        assert_eq!(outcome, Outcome::Removed(dir.path().join("hello")));
        assert!(!dir.path().join("hello").exists());

        let outcome = DebExtractor::new(true).process(&deb).unwrap();
        assert!(matches!(outcome, Outcome::NothingToRemove(_)));
    }

    #[test]
    fn test_run_counts_failures_and_skips_missing() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("bad.deb");
        fs::write(&bad, "not an ar archive").unwrap();
        let failures =
            DebExtractor::new(false).run(&[bad, dir.path().join("missing.deb")]);
        assert_eq!(failures, 1);
    }
}
