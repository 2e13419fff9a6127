//! Mediator between the remote catalog and the local cache.
//!
//! # Responsibility
//! - Derive the next remote page from the load type and cache state.
//! - Fetch exactly one page and commit it in one atomic store transaction.
//! - Report the end-of-data boundary to the paging consumer.
//!
//! # Invariants
//! - Refresh always requests page 1 and clears before upserting.
//! - Prepend never contacts the remote source or the store.
//! - A failed fetch or commit leaves the cache byte-for-byte unchanged.
//! - No internal retry; failures propagate to the caller unmodified.

use crate::remote::source::{CatalogSource, PageRequest, SourceError};
use crate::repo::item_repo::{CacheStore, StoreError, StoreResult};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::{NonZeroU32, NonZeroU64};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const FIRST_PAGE: NonZeroU64 = NonZeroU64::MIN;
const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(20) {
    Some(size) => size,
    None => unreachable!(),
};
const DEFAULT_FETCH_PACE: Duration = Duration::from_secs(2);

/// Which scroll boundary triggered a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    /// Full reset: clear the cache and restart from page 1.
    Refresh,
    /// Toward older data. The remote feed is forward-only, so this is a
    /// permanent no-op boundary.
    Prepend,
    /// Toward further data, continuing from the highest cached id.
    Append,
}

/// Successful load outcome. `end_of_data` is true when the remote returned
/// an empty page, its documented signal that no further pages exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSuccess {
    pub end_of_data: bool,
}

/// Load failure, handed back unmodified for the caller's retry policy.
#[derive(Debug)]
pub enum LoadError {
    Remote(SourceError),
    Store(StoreError),
    Cancelled,
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::Cancelled => write!(f, "load was cancelled"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::Cancelled => None,
        }
    }
}

impl From<SourceError> for LoadError {
    fn from(value: SourceError) -> Self {
        Self::Remote(value)
    }
}

impl From<StoreError> for LoadError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Coordinator policy, fixed at construction time.
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorConfig {
    /// Items per remote page; also the read window size.
    pub per_page: NonZeroU32,
    /// Pacing delay inserted before every remote fetch.
    pub fetch_pace: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            per_page: DEFAULT_PAGE_SIZE,
            fetch_pace: DEFAULT_FETCH_PACE,
        }
    }
}

/// Mediator bridging one remote paged source and one local cache store.
///
/// The caller serializes same-direction loads; the store's transaction is
/// the only guard against loads from different directions interleaving.
pub struct LoadCoordinator<S, C> {
    source: S,
    store: Arc<C>,
    config: CoordinatorConfig,
    cancel: CancellationToken,
}

impl<S: CatalogSource, C: CacheStore> LoadCoordinator<S, C> {
    /// Creates a coordinator with injected collaborators and a caller-owned
    /// cancellation token covering every load issued through it.
    pub fn new(
        source: S,
        store: Arc<C>,
        config: CoordinatorConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            store,
            config,
            cancel,
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Shared handle to the injected store.
    pub fn store(&self) -> Arc<C> {
        Arc::clone(&self.store)
    }

    /// Performs one boundary-triggered load.
    ///
    /// Suspension points (pacing delay, remote fetch) race the cancellation
    /// token; cancellation or failure leaves the cache in its pre-call state.
    pub async fn load(&self, load_type: LoadType) -> Result<LoadSuccess, LoadError> {
        let started_at = Instant::now();
        let label = load_type_label(load_type);
        info!("event=load module=coordinator status=start load_type={label}");

        let page = match load_type {
            LoadType::Refresh => FIRST_PAGE,
            LoadType::Prepend => {
                // No page exists before page 1; report the boundary without
                // touching the source or the store.
                info!(
                    "event=load module=coordinator status=ok load_type={label} end_of_data=true duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                return Ok(LoadSuccess { end_of_data: true });
            }
            LoadType::Append => self.next_append_page()?,
        };

        self.pace().await?;

        let request = PageRequest {
            page,
            per_page: self.config.per_page,
        };
        let items = tokio::select! {
            _ = self.cancel.cancelled() => return Err(LoadError::Cancelled),
            fetched = self.source.fetch_page(request) => fetched.map_err(|err| {
                error!(
                    "event=load module=coordinator status=error load_type={label} page={page} error_code=remote_fetch_failed error={err}"
                );
                LoadError::Remote(err)
            })?,
        };

        if self.cancel.is_cancelled() {
            return Err(LoadError::Cancelled);
        }

        let end_of_data = items.is_empty();
        self.store
            .run_atomic(|cache| -> StoreResult<()> {
                if load_type == LoadType::Refresh {
                    cache.clear_all()?;
                }
                cache.upsert_all(&items)?;
                Ok(())
            })
            .map_err(|err| {
                error!(
                    "event=load module=coordinator status=error load_type={label} page={page} error_code=commit_failed error={err}"
                );
                LoadError::Store(err)
            })?;

        info!(
            "event=load module=coordinator status=ok load_type={label} page={page} fetched={} end_of_data={end_of_data} duration_ms={}",
            items.len(),
            started_at.elapsed().as_millis()
        );
        Ok(LoadSuccess { end_of_data })
    }

    /// Derives the next append page from the highest cached id.
    ///
    /// Assumes ids are dense, remote-assigned, and aligned with remote page
    /// boundaries; an explicit stored cursor would lift that assumption.
    fn next_append_page(&self) -> Result<NonZeroU64, LoadError> {
        match self.store.last_item().map_err(LoadError::Store)? {
            None => Ok(FIRST_PAGE),
            Some(last) => {
                let per_page = i64::from(self.config.per_page.get());
                let page = last.id / per_page + 1;
                Ok(NonZeroU64::new(page.unsigned_abs()).unwrap_or(FIRST_PAGE))
            }
        }
    }

    async fn pace(&self) -> Result<(), LoadError> {
        if self.config.fetch_pace.is_zero() {
            return Ok(());
        }
        tokio::select! {
            _ = self.cancel.cancelled() => Err(LoadError::Cancelled),
            _ = tokio::time::sleep(self.config.fetch_pace) => Ok(()),
        }
    }
}

fn load_type_label(load_type: LoadType) -> &'static str {
    match load_type {
        LoadType::Refresh => "refresh",
        LoadType::Prepend => "prepend",
        LoadType::Append => "append",
    }
}
