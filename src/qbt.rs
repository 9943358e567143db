//! qBittorrent metadata: dumping `.torrent` / `.fastresume` files and
//! rewriting save paths in a `BT_backup` directory.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;
use serde_bencode::value::Value;
use serde_json::{Map, Value as Json};

use crate::error::{Error, Result, at};
use crate::files::write_atomic;
use crate::walk::{WalkOptions, rglob};

pub fn read_bencode(path: &Path) -> Result<Value> {
    let bytes = fs::read(path).map_err(at(path))?;
    Ok(serde_bencode::from_bytes(&bytes)?)
}

pub fn write_bencode(path: &Path, value: &Value) -> Result<()> {
    let bytes = serde_bencode::to_bytes(value)?;
    write_atomic(path, &bytes)
}

/// Byte strings as text when they are UTF-8, hex otherwise.
pub fn bytes_to_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => hex::encode(bytes),
    }
}

/// Convert a bencode value to JSON, turning byte strings (keys included) into text.
pub fn bencode_to_json(value: &Value) -> Json {
    match value {
        Value::Bytes(b) => Json::String(bytes_to_text(b)),
        Value::Int(i) => Json::from(*i),
        Value::List(items) => Json::Array(items.iter().map(bencode_to_json).collect()),
        Value::Dict(entries) => Json::Object(
            entries
                .iter()
                .map(|(k, v)| (bytes_to_text(k), bencode_to_json(v)))
                .collect::<Map<String, Json>>(),
        ),
    }
}

/// Dictionary lookup by text key; `None` for non-dictionaries.
pub fn get<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Dict(entries) => entries.get(key.as_bytes()),
        _ => None,
    }
}

fn get_int(value: &Value, key: &str) -> Option<i64> {
    match get(value, key) {
        Some(Value::Int(i)) => Some(*i),
        _ => None,
    }
}

fn get_text(value: &Value, key: &str) -> Option<String> {
    match get(value, key) {
        Some(Value::Bytes(b)) => Some(String::from_utf8_lossy(b).into_owned()),
        _ => None,
    }
}

/// Strict UTF-8 text of a byte-string field; empty when absent.
fn get_utf8(value: &Value, key: &'static str, path: &Path) -> Result<String> {
    match get(value, key) {
        Some(Value::Bytes(b)) => String::from_utf8(b.clone()).map_err(|_| Error::NotUtf8Field {
            path: path.to_path_buf(),
            field: key,
        }),
        _ => Ok(String::new()),
    }
}

/// One file listed by a torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TorrentFile {
    pub length: Option<i64>,
    pub path: String,
}

/// Files of a torrent, single-file torrents included.
///
/// A single-file torrent yields one entry named after the torrent; a torrent
/// with no `info` yields one entry with no length and an empty path.
pub fn torrent_files(torrent: &Value) -> Vec<TorrentFile> {
    let info = get(torrent, "info");
    let Some(Value::List(files)) = info.and_then(|i| get(i, "files")) else {
        return vec![TorrentFile {
            length: info.and_then(|i| get_int(i, "length")),
            path: info.and_then(|i| get_text(i, "name")).unwrap_or_default(),
        }];
    };

    files
        .iter()
        .map(|file| {
            let path = match get(file, "path") {
                Some(Value::List(parts)) => parts
                    .iter()
                    .filter_map(|p| match p {
                        Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("/"),
                _ => String::new(),
            };
            TorrentFile {
                length: get_int(file, "length"),
                path,
            }
        })
        .collect()
}

/// JSON view of a `.torrent` file with decoded file list and hex pieces.
pub fn torrent_to_json(torrent: &Value) -> Result<Json> {
    let mut json = bencode_to_json(torrent);
    let files = serde_json::to_value(torrent_files(torrent))?;
    if let Some(info) = json.get_mut("info").and_then(Json::as_object_mut) {
        info.insert("files".to_string(), files);
        if let Some(Value::Bytes(pieces)) = get(torrent, "info").and_then(|i| get(i, "pieces")) {
            info.insert("pieces".to_string(), Json::String(hex::encode(pieces)));
        }
    }
    Ok(json)
}

/// Dump a `.torrent` or `.fastresume` file as JSON. Other suffixes give `None`.
pub fn dump(path: &Path) -> Result<Option<Json>> {
    let kind = path.extension().and_then(|e| e.to_str());
    match kind {
        Some("torrent") => Ok(Some(torrent_to_json(&read_bencode(path)?)?)),
        Some("fastresume") => Ok(Some(bencode_to_json(&read_bencode(path)?))),
        _ => Ok(None),
    }
}

/// Filters and rewrite rule for [`migrate`].
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    pub pattern: Regex,
    /// Replacement with `$1` / `${name}` group references.
    pub repl: String,
    /// Only touch tasks whose `auto_managed` flag equals this.
    pub auto_managed: Option<bool>,
    /// Only touch tasks whose torrent `private` flag equals this.
    pub private: Option<bool>,
    pub apply: bool,
}

/// A save-path rewrite, planned or applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub file: PathBuf,
    pub name: String,
    pub old_save_path: String,
    pub new_save_path: String,
    pub old_category: String,
    pub new_category: String,
}

/// Rewrite one `.fastresume` file. `None` when filtered out or not matching.
pub fn migrate_fastresume(path: &Path, options: &MigrateOptions) -> Result<Option<Migration>> {
    let mut fastresume = read_bencode(path)?;

    if let Some(wanted) = options.auto_managed {
        if get_int(&fastresume, "auto_managed").unwrap_or(0) != i64::from(wanted) {
            return Ok(None);
        }
    }

    if let Some(wanted) = options.private {
        let torrent = read_bencode(&path.with_extension("torrent"))?;
        let private = get(&torrent, "info")
            .and_then(|info| get_int(info, "private"))
            .unwrap_or(0);
        if private != i64::from(wanted) {
            return Ok(None);
        }
    }

    let name = get_text(&fastresume, "name").unwrap_or_default();
    // rewritten fields must round-trip byte for byte
    let save_path = get_utf8(&fastresume, "save_path", path)?;
    let category = get_utf8(&fastresume, "qBt-category", path)?;
    tracing::info!("< name: {}, save_path: {}, qBt-category: {}", name, save_path, category);

    if !options.pattern.is_match(&save_path) {
        return Ok(None);
    }

    let new_save_path = options
        .pattern
        .replace_all(&save_path, options.repl.as_str())
        .into_owned();
    let new_category = options
        .pattern
        .replace_all(&category, options.repl.as_str())
        .into_owned();
    tracing::info!(
        "> name: {}, save_path: {}, qBt-category: {}\n",
        name,
        new_save_path,
        new_category
    );

    if options.apply {
        if let Value::Dict(entries) = &mut fastresume {
            entries.insert(
                b"save_path".to_vec(),
                Value::Bytes(new_save_path.clone().into_bytes()),
            );
            if entries.contains_key(b"qBt-category".as_slice()) {
                entries.insert(
                    b"qBt-category".to_vec(),
                    Value::Bytes(new_category.clone().into_bytes()),
                );
            }
        }
        write_bencode(path, &fastresume)?;
    }

    Ok(Some(Migration {
        file: path.to_path_buf(),
        name,
        old_save_path: save_path,
        new_save_path,
        old_category: category,
        new_category,
    }))
}

/// Run [`migrate_fastresume`] over every `.fastresume` under `bt_backup`.
///
/// Files that fail are logged and skipped.
pub fn migrate(bt_backup: &Path, options: &MigrateOptions) -> Result<Vec<Migration>> {
    let mut migrations = Vec::new();
    for file in rglob(bt_backup, "*.fastresume", WalkOptions::default())? {
        match migrate_fastresume(&file, options) {
            Ok(Some(m)) => migrations.push(m),
            Ok(None) => {}
            Err(e) => tracing::error!("{}", e),
        }
    }
    Ok(migrations)
}
