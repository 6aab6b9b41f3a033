//! Cache-aside support: canonical keys and the bundled in-memory store.
//!
//! The engine checks the cache first, falls back to the store on a miss,
//! and writes non-empty results back. Empty results are deliberately never
//! written, so a transient empty state cannot become a persistent false
//! negative. Cache failures of any kind degrade to direct queries.

mod keys;
mod lock;
mod store;

pub use keys::{content_list_key, table_list_key};
pub use store::MemoryListCache;
