//! List payload cache.
//!
//! Memoizes serialized paginated list payloads keyed by
//! (resource kind, page, limit) and groups every entry under its resource
//! kind's tag so writes can discard a whole collection at once.
//!
//! ```toml
//! [cache]
//! enabled = true
//! list_limit = 64
//! ```

mod config;
mod keys;
mod lock;
mod store;

pub use config::CacheConfig;
pub use keys::{CacheTag, ListKey, ResourceKind};
pub use store::ListCache;
