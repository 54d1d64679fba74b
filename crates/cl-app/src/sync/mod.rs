//! Synchronization engine and its private state.

mod cursor;
mod engine;
mod guard;
mod report;

pub use cursor::{PendingPush, SyncCursor};
pub use engine::{EngineSettings, SyncEngine};
pub use guard::SuppressionGuard;
pub use report::TickReport;
