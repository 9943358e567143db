pub mod apt_lists;
pub mod config;
pub mod deb_extract;
pub mod halfwidth;
pub mod iconv;
pub mod qbt;
#[cfg(feature = "qr")]
pub mod qr;
pub mod rename_date;
pub mod sort_keys;
