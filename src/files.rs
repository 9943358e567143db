//! Small file helpers shared by the tools.

use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result, at};

/// UTF-8 byte order mark.
pub const BOM: char = '\u{feff}';

/// How many leading bytes encoding detection looks at.
pub const DETECT_BYTES: usize = 4096;

/// Contents of a UTF-8 text file with any leading BOM split off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8Text {
    pub bom: bool,
    pub text: String,
}

impl Utf8Text {
    /// Put the BOM back in front of `text` if the source had one.
    pub fn restore_bom(&self, mut text: String) -> String {
        if self.bom {
            text.insert(0, BOM);
        }
        text
    }
}

/// Read a file that must be UTF-8 text.
pub fn read_utf8(path: &Path) -> Result<Utf8Text> {
    let bytes = fs::read(path).map_err(at(path))?;
    let text = String::from_utf8(bytes).map_err(|_| Error::NotUtf8 {
        path: path.to_path_buf(),
    })?;
    Ok(match text.strip_prefix(BOM) {
        Some(rest) => Utf8Text {
            bom: true,
            text: rest.to_string(),
        },
        None => Utf8Text { bom: false, text },
    })
}

/// Read a UTF-8 text file, dropping a leading BOM.
pub fn read_text(path: &Path) -> Result<String> {
    Ok(read_utf8(path)?.text)
}

/// Decode `bytes` in whatever encoding the first [`DETECT_BYTES`] suggest.
///
/// Malformed input is an error rather than being replaced.
pub fn decode_detected<'a>(path: &Path, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
    let sample = &bytes[..bytes.len().min(DETECT_BYTES)];
    match crate::iconv::detect_encoding(sample) {
        None => std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| Error::NotUtf8 {
                path: path.to_path_buf(),
            }),
        Some(encoding) => {
            tracing::debug!("detected encoding for {}: {}", path.display(), encoding.name());
            let (text, _, had_errors) = encoding.decode(bytes);
            if had_errors {
                return Err(Error::Undecodable {
                    path: path.to_path_buf(),
                    encoding: encoding.name(),
                });
            }
            Ok(text)
        }
    }
}

/// Replace `path` with `contents` without ever exposing a half-written file.
///
/// The data goes to a temporary sibling first and is renamed over the target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(at(path))?;
    tmp.write_all(contents).map_err(at(path))?;
    tmp.as_file().sync_all().map_err(at(path))?;
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions()).map_err(at(path))?;
    }
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}

/// Parse a JSON file in any detectable encoding.
pub fn read_json(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).map_err(at(path))?;
    let text = decode_detected(path, &bytes)?;
    Ok(serde_json::from_str(text.trim_start_matches(BOM))?)
}

/// Render JSON with 4-space indentation and a trailing newline.
///
/// Objects come out with sorted keys since `serde_json::Map` is ordered.
/// Non-ASCII text is written as-is.
pub fn to_json_pretty<T: Serialize>(data: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut ser)?;
    buf.push(b'\n');
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let text = to_json_pretty(data)?;
    write_atomic(path, text.as_bytes())
}

/// Rewrite a JSON file with its object keys sorted.
pub fn sort_json_keys(path: &Path) -> Result<()> {
    let data = read_json(path)?;
    save_json(path, &data)
}
