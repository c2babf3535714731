//! Cache module - async memoization using Moka.
//!
//! - `MemoCache` - single-flight memo cache with manual invalidation
//! - `CacheRegistry` - named caches, one per owning component
//!
//! ## Usage
//!
//! ```rust,ignore
//! let configs = registry.get_or_create::<u64, Arc<CogConfig<S>>>(S::NAME);
//!
//! let config = configs
//!     .get_or_try_insert_with(guild_id, CogConfig::from_db(guild_id, store, resolver))
//!     .await?;
//!
//! // after a write
//! configs.invalidate(&guild_id).await;
//! ```

mod memo;
mod registry;

pub use memo::MemoCache;
pub use registry::CacheRegistry;
