//! Local cache core for a remote paginated catalog.
//! This crate owns the load coordination and read-window invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{CatalogItem, ItemId, ItemValidationError};
pub use remote::http::{HttpCatalogSource, HttpSourceConfig};
pub use remote::source::{CatalogSource, PageRequest, SourceError, SourceResult};
pub use repo::item_repo::{CacheStore, CacheWriter, SqliteCatalogStore, StoreError, StoreResult};
pub use service::load_coordinator::{
    CoordinatorConfig, LoadCoordinator, LoadError, LoadSuccess, LoadType,
};
pub use service::paged_reader::{CacheWindow, PagedReader};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
