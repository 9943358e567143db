//! chaos-box: a grab bag of small file-munging tools.
//!
//! The centerpiece is [`halfwidth`], which rewrites fullwidth CJK
//! punctuation as ASCII with context-sensitive spacing. The rest are the
//! tools that ship alongside it in the `chaos-box` binary.

pub mod apt_lists;
pub mod base64;
pub mod config;
pub mod date_rename;
pub mod deb;
pub mod error;
pub mod files;
pub mod halfwidth;
pub mod iconv;
pub mod qbt;
#[cfg(feature = "qr")]
pub mod qr;
pub mod walk;

pub use config::Settings;
pub use error::{Error, Result};
pub use halfwidth::{convert_line, convert_text};
