pub mod aggregator;
pub mod catalog;
pub mod error;
pub mod import;
pub mod locks;
pub mod page;
pub mod reviews;
pub mod seed;

#[cfg(test)]
pub(crate) mod test_support;

pub use aggregator::{RatingAggregator, ReconcileReport};
pub use catalog::{
    CatalogService, ImportReport, MovieDetails, MovieQuery, MovieRemoval, MovieSort, SeedReport, SkippedRow,
};
pub use error::{CoreError, Entity};
pub use import::{parse_movies_csv, ImportRow};
pub use locks::{MovieGuard, MovieLocks};
pub use page::Page;
pub use reviews::{ReviewQuery, ReviewService, ReviewSort};

use cinerate_config::{CatalogConfig, StorageBackend};
use cinerate_store::{DocumentStore, JsonFileStore, MemoryStore, StoreError};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Open the configured backend. `dir` is only used by the JSON backend.
pub async fn open_store(backend: StorageBackend, dir: &Path) -> Result<Arc<dyn DocumentStore>, StoreError> {
    let store: Arc<dyn DocumentStore> = match backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Json => Arc::new(JsonFileStore::open(dir).await?),
    };
    info!(backend = store.backend_name(), "Opened document store");
    Ok(store)
}

/// The catalog and review services wired to one store and one lock table
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
    pub reviews: ReviewService,
    locks: Arc<MovieLocks>,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>, rules: CatalogConfig) -> Self {
        let locks = Arc::new(MovieLocks::new());
        Self {
            catalog: CatalogService::new(store.clone(), locks.clone(), rules),
            reviews: ReviewService::new(store, locks.clone()),
            locks,
        }
    }

    /// Recompute every aggregate and drop orphaned reviews
    pub async fn reconcile(&self) -> Result<ReconcileReport, CoreError> {
        self.reviews.aggregator().reconcile_all(&self.locks).await
    }
}
