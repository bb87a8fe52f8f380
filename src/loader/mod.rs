//! Deduplicating bundle loader over the store and the fetcher.

mod coordinator;
mod state;

pub use coordinator::{CoordinatorConfig, LoadCoordinator, LoadStats};
pub use state::{LoadError, LoadState};
