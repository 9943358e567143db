//! Split a file into a series of QR code images and merge them back.
//!
//! Each chunk of the input is base64 encoded and rendered as its own PNG,
//! named `{stem}_{index}.png` with a 1-based index zero-padded to the width
//! of the total count.

use std::fs::{self, File};
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, EcLevel, QrCode};
use rayon::prelude::*;

use crate::base64;
use crate::error::{Error, Result, at};
use crate::files::write_atomic;

const MODULE_PX: u32 = 10;
const QUIET_ZONE: u32 = 4;

pub fn total_chunks(file_size: u64, chunk_size: usize) -> u64 {
    file_size.div_ceil(chunk_size.max(1) as u64)
}

pub fn chunk_file_name(prefix: &str, index: u64, total: u64) -> String {
    let width = total.to_string().len();
    format!("{prefix}_{index:0width$}.png")
}

/// Default output directory: `{root}/{file stem}`.
pub fn default_output_dir(root: &Path, file: &Path) -> PathBuf {
    root.join(file_stem(file))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sorted indices of `{prefix}_{index}.png` files already in `dir`.
pub fn existing_indices(dir: &Path, prefix: &str) -> Result<Vec<u64>> {
    let mut indices = Vec::new();
    if !dir.is_dir() {
        return Ok(indices);
    }
    for entry in fs::read_dir(dir).map_err(at(dir))? {
        let entry = entry.map_err(at(dir))?;
        let name = entry.file_name();
        let index = name
            .to_str()
            .and_then(|n| n.strip_prefix(prefix))
            .and_then(|n| n.strip_prefix('_'))
            .and_then(|n| n.strip_suffix(".png"))
            .and_then(|n| n.parse::<u64>().ok());
        if let Some(index) = index {
            indices.push(index);
        }
    }
    indices.sort_unstable();
    Ok(indices)
}

/// Index encoded after the last `_` of a file stem.
pub fn parse_index(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let (_, index) = stem.rsplit_once('_')?;
    index.parse().ok()
}

/// Render `data` as a black-on-white QR code with a quiet zone.
pub fn render(data: &str) -> Result<GrayImage> {
    let code = QrCode::with_error_correction_level(data, EcLevel::L)
        .map_err(|e| Error::Qr(e.to_string()))?;
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_ZONE) * MODULE_PX;

    let mut img = GrayImage::from_pixel(side, side, Luma([255]));
    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = i as u32 % modules + QUIET_ZONE;
        let my = i as u32 / modules + QUIET_ZONE;
        for y in my * MODULE_PX..(my + 1) * MODULE_PX {
            for x in mx * MODULE_PX..(mx + 1) * MODULE_PX {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }
    Ok(img)
}

/// Decode the first readable QR code in an image.
pub fn decode(img: &GrayImage) -> Result<String> {
    let (w, h) = img.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
        img.get_pixel(x as u32, y as u32)[0]
    });
    let mut last_error = "no QR code found".to_string();
    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((_, content)) => return Ok(content),
            Err(e) => last_error = format!("{e:?}"),
        }
    }
    Err(Error::Qr(last_error))
}

fn save_png(img: &GrayImage, path: &Path) -> Result<()> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    write_atomic(path, buf.get_ref())
}

fn decode_file(path: &Path) -> Result<String> {
    let img = image::open(path)?.to_luma8();
    decode(&img)
}

fn pool(jobs: usize) -> Result<rayon::ThreadPool> {
    Ok(rayon::ThreadPoolBuilder::new()
        .num_threads(jobs.max(1))
        .build()?)
}

#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub chunk_size: usize,
    pub output_dir: PathBuf,
    /// Skip indices up to the highest one already present.
    pub resume: bool,
    /// Cap on images generated by this run.
    pub limit: Option<usize>,
    pub jobs: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub total: u64,
    pub generated: usize,
    pub failed: usize,
}

pub fn split(file: &Path, options: &SplitOptions) -> Result<SplitReport> {
    let chunk_size = options.chunk_size.max(1);
    let size = fs::metadata(file).map_err(at(file))?.len();
    let total = total_chunks(size, chunk_size);
    let prefix = file_stem(file);

    fs::create_dir_all(&options.output_dir).map_err(at(&options.output_dir))?;
    tracing::info!("splitting {} into {} QR codes", file.display(), total);

    let last_index = if options.resume {
        existing_indices(&options.output_dir, &prefix)?
            .last()
            .copied()
            .unwrap_or(0)
    } else {
        0
    };

    let limit = options.limit.unwrap_or(usize::MAX);
    let mut reader = File::open(file).map_err(at(file))?;
    let mut tasks = Vec::new();
    let mut index = 0u64;
    while tasks.len() < limit {
        let mut chunk = Vec::with_capacity(chunk_size);
        (&mut reader)
            .take(chunk_size as u64)
            .read_to_end(&mut chunk)
            .map_err(at(file))?;
        if chunk.is_empty() {
            break;
        }
        index += 1;
        if index <= last_index {
            continue;
        }
        tasks.push((index, base64::encode(&chunk)));
    }

    let results: Vec<Result<()>> = pool(options.jobs)?.install(|| {
        tasks
            .par_iter()
            .map(|(index, data)| {
                let path = options
                    .output_dir
                    .join(chunk_file_name(&prefix, *index, total));
                save_png(&render(data)?, &path)?;
                tracing::info!("saved QR code {} to {}", index, path.display());
                Ok(())
            })
            .collect()
    });

    let mut report = SplitReport {
        total,
        ..SplitReport::default()
    };
    for result in results {
        match result {
            Ok(()) => report.generated += 1,
            Err(e) => {
                report.failed += 1;
                tracing::error!("QR code generation failed: {}", e);
            }
        }
    }
    Ok(report)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub chunks: usize,
    pub skipped: usize,
    /// Indices absent between 1 and the highest decoded index.
    pub missing: Vec<u64>,
    pub bytes: usize,
}

pub fn merge(dir: &Path, output: &Path, jobs: usize) -> Result<MergeReport> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir).map_err(at(dir))? {
        let path = entry.map_err(at(dir))?.path();
        if path.extension().is_none_or(|ext| ext != "png") {
            continue;
        }
        match parse_index(&path) {
            Some(index) => images.push((index, path)),
            None => tracing::warn!("ignoring {}: no chunk index in name", path.display()),
        }
    }

    let decoded: Vec<(u64, &Path, Result<String>)> = pool(jobs)?.install(|| {
        images
            .par_iter()
            .map(|(index, path)| (*index, path.as_path(), decode_file(path)))
            .collect()
    });

    let mut report = MergeReport::default();
    let mut chunks = Vec::new();
    for (index, path, result) in decoded {
        let payload = result.and_then(|text| base64::decode(&text).map_err(Error::from));
        match payload {
            Ok(bytes) => chunks.push((index, bytes)),
            Err(e) => {
                report.skipped += 1;
                tracing::warn!("error decoding {}: {}", path.display(), e);
            }
        }
    }
    chunks.sort_by_key(|(index, _)| *index);

    let mut expected = 1;
    for (index, _) in &chunks {
        report.missing.extend(expected..*index);
        expected = index + 1;
    }
    if !report.missing.is_empty() {
        tracing::warn!("missing chunk indices: {:?}", report.missing);
    }

    let data: Vec<u8> = chunks.iter().flat_map(|(_, bytes)| bytes.iter().copied()).collect();
    write_atomic(output, &data)?;

    report.chunks = chunks.len();
    report.bytes = data.len();
    tracing::info!("merged file saved to {}", output.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn options(output_dir: &Path) -> SplitOptions {
        SplitOptions {
            chunk_size: 40,
            output_dir: output_dir.to_path_buf(),
            resume: false,
            limit: None,
            jobs: 2,
        }
    }

    #[test]
    fn test_total_chunks() {
        assert_eq!(total_chunks(0, 1900), 0);
        assert_eq!(total_chunks(1900, 1900), 1);
        assert_eq!(total_chunks(1901, 1900), 2);
    }

    #[test]
    fn test_chunk_file_name_padding() {
        assert_eq!(chunk_file_name("doc", 3, 9), "doc_3.png");
        assert_eq!(chunk_file_name("doc", 3, 120), "doc_003.png");
        assert_eq!(parse_index(Path::new("out/my_doc_003.png")), Some(3));
        assert_eq!(parse_index(Path::new("out/cover.png")), None);
    }

    #[test]
    fn test_render_decode() {
        let img = render("aGVsbG8gd29ybGQ=").unwrap();
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % MODULE_PX, 0);
        assert_eq!(decode(&img).unwrap(), "aGVsbG8gd29ybGQ=");
    }

    #[test]
    fn test_decode_blank_image_fails() {
        let blank = GrayImage::from_pixel(200, 200, Luma([255]));
        assert!(decode(&blank).is_err());
    }

    #[test]
    fn test_split_merge_roundtrip() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("notes.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(130).collect();
        fs::write(&input, &data).unwrap();
        let out = dir.path().join("qr");

        let report = split(&input, &options(&out)).unwrap();
        assert_eq!(report.total, 4);
        assert_eq!(report.generated, 4);
        assert!(out.join("notes_1.png").is_file());
        assert!(out.join("notes_4.png").is_file());

        let merged = dir.path().join("merged.bin");
        let report = merge(&out, &merged, 2).unwrap();
        assert_eq!(report.chunks, 4);
        assert!(report.missing.is_empty());
        assert_eq!(fs::read(&merged).unwrap(), data);
    }

    #[test]
    fn test_split_limit_and_resume() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        fs::write(&input, "x".repeat(100)).unwrap();
        let out = dir.path().join("qr");

        let first = SplitOptions {
            limit: Some(1),
            ..options(&out)
        };
        assert_eq!(split(&input, &first).unwrap().generated, 1);
        assert_eq!(existing_indices(&out, "doc").unwrap(), vec![1]);

        let resumed = SplitOptions {
            resume: true,
            ..options(&out)
        };
        assert_eq!(split(&input, &resumed).unwrap().generated, 2);
        assert_eq!(existing_indices(&out, "doc").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_merge_reports_gaps() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        fs::write(&input, "abcdefghij".repeat(12)).unwrap();
        let out = dir.path().join("qr");
        split(&input, &options(&out)).unwrap();
        fs::remove_file(out.join("doc_2.png")).unwrap();
        fs::write(out.join("doc_9.png"), b"not a png").unwrap();

        let report = merge(&out, &dir.path().join("merged.txt"), 1).unwrap();

        assert_eq!(report.chunks, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.missing, vec![2]);
        assert_eq!(report.bytes, 80);
    }

    #[test]
    fn test_merge_skips_chunk_that_is_not_base64() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        fs::write(&input, "abcdefghij".repeat(12)).unwrap();
        let out = dir.path().join("qr");
        split(&input, &options(&out)).unwrap();
        save_png(&render("not base64!").unwrap(), &out.join("doc_2.png")).unwrap();

        let merged = dir.path().join("merged.txt");
        let report = merge(&out, &merged, 2).unwrap();

        assert_eq!(report.chunks, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.missing, vec![2]);
        assert_eq!(fs::read(&merged).unwrap().len(), 80);
    }
}
