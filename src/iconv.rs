//! Re-encode legacy-encoded text files as UTF-8.

use std::fs;
use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use encoding_rs::Encoding;

use crate::error::{Result, at};
use crate::files::write_atomic;

/// Guess the encoding of a byte sample.
///
/// Returns `None` when the sample is valid UTF-8 (pure ASCII included). A
/// multi-byte sequence cut off by the end of the sample still counts as UTF-8.
pub fn detect_encoding(sample: &[u8]) -> Option<&'static Encoding> {
    match std::str::from_utf8(sample) {
        Ok(_) => return None,
        Err(e) if e.error_len().is_none() => return None,
        Err(_) => {}
    }
    let mut detector = EncodingDetector::new();
    detector.feed(sample, true);
    Some(detector.guess(None, false))
}

/// `dir/name.ext` -> `dir/name{suffix}.ext`.
pub fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(name)
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    AlreadyUtf8,
    DryRun { encoding: String, output: PathBuf },
    OutputExists { output: PathBuf },
    Converted { encoding: String, output: PathBuf },
}

/// Converts files found under `root`.
#[derive(Debug, Clone)]
pub struct Converter {
    pub root: PathBuf,
    pub output_dir: Option<PathBuf>,
    pub suffix: String,
    pub detect_bytes: usize,
    pub dry_run: bool,
    pub force: bool,
}

impl Converter {
    /// Where the UTF-8 copy of `input` goes.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let renamed = suffixed_path(input, &self.suffix);
        match &self.output_dir {
            Some(dir) => match renamed.strip_prefix(&self.root) {
                Ok(rel) => dir.join(rel),
                Err(_) => dir.join(renamed.file_name().unwrap_or_default()),
            },
            None => renamed,
        }
    }

    pub fn convert(&self, input: &Path) -> Result<Outcome> {
        let bytes = fs::read(input).map_err(at(input))?;
        let sample = &bytes[..bytes.len().min(self.detect_bytes)];
        let Some(encoding) = detect_encoding(sample) else {
            tracing::info!("[SKIP   ] {} is already UTF-8 encoded", input.display());
            return Ok(Outcome::AlreadyUtf8);
        };
        let encoding_name = encoding.name().to_string();
        tracing::debug!("detected encoding for {}: {}", input.display(), encoding_name);

        let output = self.output_path(input);
        if self.dry_run {
            tracing::info!(
                "[DRY RUN] {} ({})\n        → {}",
                input.display(),
                encoding_name,
                output.display()
            );
            return Ok(Outcome::DryRun {
                encoding: encoding_name,
                output,
            });
        }

        if output.exists() && !self.force {
            tracing::warn!(
                "[SKIP   ] output file {} already exists, use --force to overwrite",
                output.display()
            );
            return Ok(Outcome::OutputExists { output });
        }

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent).map_err(at(parent))?;
        }

        let (text, _, had_errors) = encoding.decode(&bytes);
        if had_errors {
            tracing::warn!(
                "{}: malformed {} sequences were replaced",
                input.display(),
                encoding_name
            );
        }
        write_atomic(&output, text.as_bytes())?;
        tracing::info!(
            "[OK     ] {} ({})\n        → {}",
            input.display(),
            encoding_name,
            output.display()
        );
        Ok(Outcome::Converted {
            encoding: encoding_name,
            output,
        })
    }
}

/// Files skipped because they were already UTF-8, and files that failed.
#[derive(Debug, Default)]
pub struct Summary {
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
    pub converted: usize,
}

impl Converter {
    /// Convert every file, carrying on past failures.
    pub fn run(&self, inputs: &[PathBuf]) -> Summary {
        let mut summary = Summary::default();
        for input in inputs {
            match self.convert(input) {
                Ok(Outcome::AlreadyUtf8) => summary.skipped.push(input.clone()),
                Ok(Outcome::Converted { .. }) => summary.converted += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("[FAIL   ] {}", e);
                    summary.failed.push(input.clone());
                }
            }
        }
        summary
    }
}
