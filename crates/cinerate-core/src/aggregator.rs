use crate::error::CoreError;
use crate::locks::{MovieGuard, MovieLocks};
use cinerate_models::{Movie, MovieId, RatingSummary, ReviewId, Stars};
use cinerate_store::DocumentStore;
use futures::future::join_all;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Maintains `averageRating` / `totalRatings` on movie documents.
///
/// Every method takes the movie's [`MovieGuard`]; the caller holds the
/// critical section across its own review write and the aggregate write.
/// Each method performs exactly one movie write.
#[derive(Clone)]
pub struct RatingAggregator {
    store: Arc<dyn DocumentStore>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub movies_checked: usize,
    pub movies_corrected: usize,
    pub orphaned_reviews_removed: usize,
}

impl RatingAggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Folds one new rating into the running mean and persists the movie
    pub async fn on_review_created(
        &self,
        guard: &MovieGuard,
        mut movie: Movie,
        rating: Stars,
    ) -> Result<Movie, CoreError> {
        debug_assert!(guard.covers(&movie.id));

        let before = movie.summary();
        movie.set_summary(before.with_added(rating));
        self.store.replace_movie(&movie).await?;

        debug!(
            movie_id = %movie.id,
            rating = rating.value(),
            average_rating = movie.average_rating,
            total_ratings = movie.total_ratings,
            "Aggregate updated after review created"
        );
        Ok(movie)
    }

    /// Re-derives the aggregate from all current ratings. The old/new pair is
    /// only logged: adjusting a running sum by the delta drifts under
    /// concurrent edits, a full scan does not.
    pub async fn on_review_updated(
        &self,
        guard: &MovieGuard,
        movie: Movie,
        old_rating: Stars,
        new_rating: Stars,
    ) -> Result<Movie, CoreError> {
        debug!(
            movie_id = %movie.id,
            old_rating = old_rating.value(),
            new_rating = new_rating.value(),
            "Recomputing aggregate after review update"
        );
        self.recompute_movie(guard, movie).await
    }

    pub async fn on_review_deleted(
        &self,
        guard: &MovieGuard,
        movie: Movie,
        deleted_rating: Stars,
    ) -> Result<Movie, CoreError> {
        debug!(
            movie_id = %movie.id,
            deleted_rating = deleted_rating.value(),
            "Recomputing aggregate after review deletion"
        );
        self.recompute_movie(guard, movie).await
    }

    /// Load the movie and re-derive its aggregate from scratch
    pub async fn recompute(&self, guard: &MovieGuard) -> Result<Movie, CoreError> {
        let movie_id = *guard.movie_id();
        let movie = self
            .store
            .get_movie(&movie_id)
            .await?
            .ok_or_else(|| CoreError::movie_not_found(&movie_id))?;
        self.recompute_movie(guard, movie).await
    }

    async fn recompute_movie(&self, guard: &MovieGuard, mut movie: Movie) -> Result<Movie, CoreError> {
        debug_assert!(guard.covers(&movie.id));

        let reviews = self.store.reviews_for_movie(&movie.id).await?;
        let summary = RatingSummary::from_ratings(reviews.iter().map(|r| r.rating));
        movie.set_summary(summary);
        self.store.replace_movie(&movie).await?;

        debug!(
            movie_id = %movie.id,
            average_rating = movie.average_rating,
            total_ratings = movie.total_ratings,
            "Aggregate recomputed"
        );
        Ok(movie)
    }

    /// Repair every movie's aggregate and back-references from the review
    /// collection, and drop reviews whose movie no longer exists.
    #[instrument(skip(self, locks))]
    pub async fn reconcile_all(&self, locks: &MovieLocks) -> Result<ReconcileReport, CoreError> {
        let movies = self.store.list_movies().await?;
        let movie_ids: HashSet<MovieId> = movies.iter().map(|m| m.id).collect();

        let results = join_all(movies.iter().map(|movie| self.reconcile_movie(locks, movie.id))).await;

        let mut report = ReconcileReport {
            movies_checked: movies.len(),
            ..ReconcileReport::default()
        };
        for result in results {
            if result? {
                report.movies_corrected += 1;
            }
        }

        for review in self.store.list_reviews().await? {
            if movie_ids.contains(&review.movie_id) {
                continue;
            }
            // The movie may have been created after the listing above
            let _guard = locks.lock(review.movie_id).await;
            if self.store.get_movie(&review.movie_id).await?.is_some() {
                continue;
            }
            if self.store.delete_review(&review.id).await?.is_some() {
                warn!(
                    review_id = %review.id,
                    movie_id = %review.movie_id,
                    "Removed review whose movie no longer exists"
                );
                report.orphaned_reviews_removed += 1;
            }
        }

        info!(
            "Reconciled {} movies: {} corrected, {} orphaned reviews removed",
            report.movies_checked, report.movies_corrected, report.orphaned_reviews_removed
        );
        Ok(report)
    }

    /// Returns true when the stored movie had to be corrected
    async fn reconcile_movie(&self, locks: &MovieLocks, movie_id: MovieId) -> Result<bool, CoreError> {
        let _guard = locks.lock(movie_id).await;

        // Deleted since the listing
        let Some(mut movie) = self.store.get_movie(&movie_id).await? else {
            return Ok(false);
        };

        let reviews = self.store.reviews_for_movie(&movie_id).await?;
        let expected_summary = RatingSummary::from_ratings(reviews.iter().map(|r| r.rating));
        let expected_links: BTreeSet<ReviewId> = reviews.iter().map(|r| r.id).collect();

        if movie.summary().approx_eq(&expected_summary) && movie.reviews == expected_links {
            return Ok(false);
        }

        warn!(
            movie_id = %movie_id,
            stored_average = movie.average_rating,
            stored_total = movie.total_ratings,
            expected_average = expected_summary.average_rating,
            expected_total = expected_summary.total_ratings,
            "Movie aggregate out of sync, correcting"
        );
        movie.reviews = expected_links;
        movie.set_summary(expected_summary);
        self.store.replace_movie(&movie).await?;
        Ok(true)
    }
}
