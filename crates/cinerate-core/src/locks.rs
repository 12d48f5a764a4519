use cinerate_models::MovieId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

/// Per-movie critical sections.
///
/// Every read-compute-write of a movie document happens while holding that
/// movie's guard, so aggregate updates for one movie are serialized while
/// different movies proceed in parallel.
#[derive(Default)]
pub struct MovieLocks {
    table: Mutex<HashMap<MovieId, Arc<AsyncMutex<()>>>>,
}

/// Proof that the holder owns the critical section of one movie
pub struct MovieGuard {
    movie_id: MovieId,
    _guard: OwnedMutexGuard<()>,
}

impl MovieGuard {
    pub fn movie_id(&self) -> &MovieId {
        &self.movie_id
    }

    pub fn covers(&self, movie_id: &MovieId) -> bool {
        &self.movie_id == movie_id
    }
}

impl MovieLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, movie_id: MovieId) -> MovieGuard {
        let slot = {
            let mut table = self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // An entry only referenced by the table has no holder and no waiter
            table.retain(|_, slot| Arc::strong_count(slot) > 1);
            table
                .entry(movie_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        let guard = slot.lock_owned().await;
        trace!(movie_id = %movie_id, "Acquired movie lock");
        MovieGuard {
            movie_id,
            _guard: guard,
        }
    }

    /// Number of movies with a live lock entry
    pub fn active(&self) -> usize {
        let table = self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        table.values().filter(|slot| Arc::strong_count(slot) > 1).count()
    }
}
