//! Scrollable read adapter over the cache store.
//!
//! # Responsibility
//! - Serve fixed-size item windows ordered ascending by id.
//! - Invoke the coordinator to backfill from the remote when a scroll
//!   boundary is reached.
//!
//! # Invariants
//! - Every window read goes back to the store, so a committed write is
//!   visible to the very next read without rebuilding the reader.
//! - Window size equals the coordinator's configured page size.

use crate::model::item::{CatalogItem, ItemId};
use crate::remote::source::CatalogSource;
use crate::repo::item_repo::{CacheStore, StoreResult};
use crate::service::load_coordinator::{LoadCoordinator, LoadError, LoadType};
use log::debug;
use std::sync::Arc;

/// One served window plus the boundary signal for the direction scrolled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheWindow {
    pub items: Vec<CatalogItem>,
    /// True when no further data exists in the scrolled direction.
    pub end_of_data: bool,
}

/// Forward/backward window reader over the shared cache store.
pub struct PagedReader<S, C> {
    coordinator: LoadCoordinator<S, C>,
    store: Arc<C>,
    window_size: u32,
    /// Inclusive id bounds of the most recently served window; `None` until
    /// the first serve (or after a refresh reset).
    first_id: Option<ItemId>,
    last_id: Option<ItemId>,
    seen_version: u64,
}

impl<S: CatalogSource, C: CacheStore> PagedReader<S, C> {
    /// Builds a reader sharing the coordinator's store handle.
    pub fn new(coordinator: LoadCoordinator<S, C>) -> Self {
        let store = coordinator.store();
        let window_size = coordinator.config().per_page.get();
        let seen_version = store.version();
        Self {
            coordinator,
            store,
            window_size,
            first_id: None,
            last_id: None,
            seen_version,
        }
    }

    /// Discards the cache contents, reloads page 1, and serves the first
    /// window.
    pub async fn refresh(&mut self) -> Result<CacheWindow, LoadError> {
        let outcome = self.coordinator.load(LoadType::Refresh).await?;
        self.first_id = None;
        self.last_id = None;

        let items = self.store.items_after(None, self.window_size)?;
        self.remember(&items);
        Ok(CacheWindow {
            items,
            end_of_data: outcome.end_of_data,
        })
    }

    /// Serves the window after the current one, backfilling from the remote
    /// when the cached data runs short.
    pub async fn next_window(&mut self) -> Result<CacheWindow, LoadError> {
        let after = self.last_id;
        let mut items = self.store.items_after(after, self.window_size)?;
        let mut end_of_data = false;

        if (items.len() as u32) < self.window_size {
            debug!(
                "event=window_backfill module=reader cached={} window_size={}",
                items.len(),
                self.window_size
            );
            end_of_data = self.coordinator.load(LoadType::Append).await?.end_of_data;
            items = self.store.items_after(after, self.window_size)?;
        }

        self.remember(&items);
        Ok(CacheWindow { items, end_of_data })
    }

    /// Serves the window before the current one. At the front of the cache
    /// this is the prepend boundary: the remote feed is forward-only, so the
    /// coordinator reports end-of-data without fetching.
    pub async fn prev_window(&mut self) -> Result<CacheWindow, LoadError> {
        let first = match self.first_id {
            Some(first) => first,
            None => return self.front_boundary().await,
        };

        let items = self.store.items_before(first, self.window_size)?;
        if items.is_empty() {
            return self.front_boundary().await;
        }

        self.remember(&items);
        Ok(CacheWindow {
            items,
            end_of_data: false,
        })
    }

    /// Re-issues the current window straight from the store, picking up any
    /// commit that happened since it was last served.
    pub fn current_window(&mut self) -> StoreResult<Vec<CatalogItem>> {
        let items = match self.first_id {
            None => self.store.items_after(None, self.window_size)?,
            // Ids are integers, so `id >= first` is exactly `id > first - 1`.
            Some(first) => self.store.items_after(Some(first - 1), self.window_size)?,
        };
        self.remember(&items);
        Ok(items)
    }

    /// True when the store has committed a write since this reader last
    /// served a window.
    pub fn is_stale(&self) -> bool {
        self.store.version() != self.seen_version
    }

    async fn front_boundary(&mut self) -> Result<CacheWindow, LoadError> {
        let outcome = self.coordinator.load(LoadType::Prepend).await?;
        self.seen_version = self.store.version();
        Ok(CacheWindow {
            items: Vec::new(),
            end_of_data: outcome.end_of_data,
        })
    }

    fn remember(&mut self, items: &[CatalogItem]) {
        if let (Some(first), Some(last)) = (items.first(), items.last()) {
            self.first_id = Some(first.id);
            self.last_id = Some(last.id);
        }
        self.seen_version = self.store.version();
    }
}
