//! Bundle cache: keys, bundles, and the size-bounded LRU store.

mod bundle;
mod store;

pub use bundle::{content_digest, CacheKey, ResourceBundle};
pub use store::{ResourceStore, StoreConfig, StoreStats};
