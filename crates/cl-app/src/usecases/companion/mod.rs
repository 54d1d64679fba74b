//! Remote clipboard access through the companion app.

mod capture;
mod client;
mod error;
mod push;

pub use client::CompanionClient;
pub use error::CompanionError;
