use std::io;
use std::path::{Path, PathBuf};

/// Errors surfaced by the library side of chaos-box.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: not valid UTF-8 text", .path.display())]
    NotUtf8 { path: PathBuf },

    #[error("{}: field '{field}' is not valid UTF-8", .path.display())]
    NotUtf8Field { path: PathBuf, field: &'static str },

    #[error("{}: malformed {encoding} text", .path.display())]
    Undecodable {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot render TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("invalid bencode: {0}")]
    Bencode(#[from] serde_bencode::Error),

    #[error("invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),

    #[error("directory walk failed: {0}")]
    Walk(#[from] ignore::Error),

    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),

    #[error("{}: unsupported archive member '{member}'", .path.display())]
    UnsupportedMember { path: PathBuf, member: String },

    #[error("cannot build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("{0}")]
    Base64(#[from] crate::base64::DecodeError),

    #[cfg(feature = "qr")]
    #[error("QR code error: {0}")]
    Qr(String),

    #[cfg(feature = "qr")]
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap an `io::Error` with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// `map_err` adapter: `fs::read(p).map_err(at(p))?`.
pub(crate) fn at(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |source| Error::io(path, source)
}
