use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, at};

const BUILTIN: &str = include_str!("../chaos-box.toml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IconvSettings {
    pub glob: String,
    pub detect_bytes: usize,
    pub suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenameSettings {
    pub glob: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AptSettings {
    pub lists_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QbtSettings {
    pub bt_backup: PathBuf,
    pub pattern: String,
    pub repl: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QrSettings {
    pub chunk_size: usize,
    pub jobs: usize,
    pub output_root: PathBuf,
}

/// Effective settings for every tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub iconv: IconvSettings,
    pub rename: RenameSettings,
    pub apt: AptSettings,
    pub qbt: QbtSettings,
    pub qr: QrSettings,
}

/// Merge `overlay` into `base`: tables merge key by key, anything else replaces.
pub fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_table(content: &str) -> Result<toml::Table> {
    Ok(toml::from_str(content)?)
}

fn load_table(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path).map_err(at(path))?;
    parse_table(&content)
}

impl Settings {
    pub fn from_table(table: toml::Table) -> Result<Self> {
        Ok(toml::Value::Table(table).try_into::<Settings>()?)
    }

    pub fn load_default() -> Result<Self> {
        Self::from_table(parse_table(BUILTIN)?)
    }

    /// User config under the platform config directory.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chaos-box").join("config.toml"))
    }

    /// Config in the current working directory.
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("chaos-box.toml")
    }

    /// Load configuration with overrides
    /// 1. Start with the built-in defaults
    /// 2. Merge ~/.config/chaos-box/config.toml if it exists
    /// 3. Merge ./chaos-box.toml if it exists
    /// 4. Merge `explicit` (errors here are fatal, unlike 2 and 3)
    pub fn load_with_overrides(explicit: Option<&Path>) -> Result<Self> {
        let mut table = parse_table(BUILTIN)?;

        let optional = Self::user_config_path()
            .into_iter()
            .chain(std::iter::once(Self::local_config_path()));
        for path in optional {
            if !path.exists() {
                continue;
            }
            match load_table(&path) {
                Ok(overlay) => {
                    tracing::debug!(path = %path.display(), "merging config");
                    deep_merge(&mut table, overlay);
                }
                Err(e) => {
                    tracing::warn!("ignoring config {}: {}", path.display(), e);
                }
            }
        }

        if let Some(path) = explicit {
            deep_merge(&mut table, load_table(path)?);
        }

        Self::from_table(table)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Expand `~` and environment variables in a user-supplied path.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    match shellexpand::full(&raw) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(shellexpand::tilde(&raw).as_ref()),
    }
}
