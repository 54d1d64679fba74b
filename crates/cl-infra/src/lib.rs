//! # cl-infra
//!
//! Infrastructure implementations for cliplink that do not touch the OS:
//! payload fingerprinting.

pub mod fingerprint;

pub use fingerprint::{Blake3Fingerprinter, THUMBNAIL_EDGE};
