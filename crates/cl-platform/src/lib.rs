//! Platform adapters for cliplink: the `adb` remote transport and the
//! desktop clipboard.

pub mod adb;
pub mod clipboard;

pub use adb::AdbTransport;
pub use clipboard::SystemClipboard;
