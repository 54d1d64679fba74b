pub mod companion;

pub use companion::{CompanionClient, CompanionError};
