//! Cached data layer for the Spy Cat Agency dashboard.
//!
//! - [`key`]: hierarchical, structurally compared cache keys.
//! - [`store`]: the [`QueryClient`] cache with staleness, de-duplication
//!   and prefix invalidation.
//! - [`hooks`]: per-resource reads and writes behind the [`Agency`] facade.
//! - [`notifier`]: success/error notifications derived from hook results.

pub mod config;
pub mod error;
pub mod hooks;
pub mod key;
pub mod notifier;
pub mod retry;
pub mod store;

pub use config::{AgencyConfig, QueryClientConfig, QueryOptions, StaleTime, StaleTimes};
pub use error::{AgencyError, AgencyResult};
pub use hooks::Agency;
pub use key::{KeyPart, QueryKey};
pub use notifier::{Notification, NotificationKind, Notifier};
pub use store::{should_refetch, CacheEffect, CacheEntry, CacheEvent, QueryClient, QueryState, QueryView};
