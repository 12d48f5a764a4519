use crate::aggregator::RatingAggregator;
use crate::error::CoreError;
use crate::locks::MovieLocks;
use crate::page::Page;
use cinerate_models::{MovieId, Review, ReviewDraft, ReviewId, UserId};
use cinerate_store::DocumentStore;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewSort {
    /// Newest first
    #[default]
    Recent,
    /// Most liked first, ties broken by newest
    Popular,
}

impl FromStr for ReviewSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "recent" => Ok(ReviewSort::Recent),
            "popular" => Ok(ReviewSort::Popular),
            _ => Err(format!("Invalid review sort: {}. Use 'recent' or 'popular'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewQuery {
    pub sort: ReviewSort,
    pub page: usize,
    pub limit: usize,
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self {
            sort: ReviewSort::Recent,
            page: 1,
            limit: 10,
        }
    }
}

/// Review lifecycle with the two cross-document invariants:
/// one review per (user, movie), and each movie's `reviews` set matching
/// the reviews that exist for it.
///
/// A review write and the following movie write are two store operations.
/// Both run inside the movie's critical section; if the movie write fails,
/// the review write is undone before the error is returned. A failed undo is
/// logged and left for `reconcile`.
#[derive(Clone)]
pub struct ReviewService {
    store: Arc<dyn DocumentStore>,
    locks: Arc<MovieLocks>,
    aggregator: RatingAggregator,
}

impl ReviewService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: Arc<MovieLocks>) -> Self {
        let aggregator = RatingAggregator::new(store.clone());
        Self {
            store,
            locks,
            aggregator,
        }
    }

    pub fn aggregator(&self) -> &RatingAggregator {
        &self.aggregator
    }

    #[instrument(skip_all, fields(movie_id = %movie_id, user_id = %user_id))]
    pub async fn create_review(
        &self,
        movie_id: MovieId,
        user_id: UserId,
        draft: ReviewDraft,
    ) -> Result<Review, CoreError> {
        let (rating, content) = draft.validate()?;

        let guard = self.locks.lock(movie_id).await;
        let mut movie = self
            .store
            .get_movie(&movie_id)
            .await?
            .ok_or_else(|| CoreError::movie_not_found(&movie_id))?;

        // Fast path only; the store's unique index is what actually holds under concurrency
        if self.store.find_review(&user_id, &movie_id).await?.is_some() {
            debug!("Review already exists for this user and movie");
            return Err(CoreError::Conflict { user_id, movie_id });
        }

        let review = Review::new(movie_id, user_id, rating, content);
        self.store.insert_review(&review).await?;

        movie.link_review(review.id);
        match self.aggregator.on_review_created(&guard, movie, rating).await {
            Ok(movie) => {
                info!(
                    review_id = %review.id,
                    rating = rating.value(),
                    average_rating = movie.average_rating,
                    total_ratings = movie.total_ratings,
                    "Review created"
                );
                Ok(review)
            }
            Err(err) => {
                if let Err(undo_err) = self.store.delete_review(&review.id).await {
                    error!(
                        review_id = %review.id,
                        "Failed to roll back review after aggregate write failed: {} (original error: {})",
                        undo_err,
                        err
                    );
                }
                Err(err)
            }
        }
    }

    #[instrument(skip_all, fields(review_id = %review_id, user_id = %user_id))]
    pub async fn update_review(
        &self,
        review_id: ReviewId,
        user_id: UserId,
        draft: ReviewDraft,
    ) -> Result<Review, CoreError> {
        let (rating, content) = draft.validate()?;

        let movie_id = self.authored_review(&review_id, &user_id).await?.movie_id;
        let guard = self.locks.lock(movie_id).await;

        // Re-read inside the critical section; it may have been deleted meanwhile
        let previous = self.authored_review(&review_id, &user_id).await?;
        let movie = self
            .store
            .get_movie(&movie_id)
            .await?
            .ok_or_else(|| CoreError::movie_not_found(&movie_id))?;

        let updated = self
            .store
            .revise_review(&review_id, rating, &content)
            .await?
            .ok_or_else(|| CoreError::review_not_found(&review_id))?;

        match self
            .aggregator
            .on_review_updated(&guard, movie, previous.rating, rating)
            .await
        {
            Ok(movie) => {
                info!(
                    old_rating = previous.rating.value(),
                    new_rating = rating.value(),
                    average_rating = movie.average_rating,
                    total_ratings = movie.total_ratings,
                    "Review updated"
                );
                Ok(updated)
            }
            Err(err) => {
                if let Err(undo_err) = self.store.restore_review(&previous).await {
                    error!(
                        "Failed to restore review after aggregate write failed: {} (original error: {})",
                        undo_err, err
                    );
                }
                Err(err)
            }
        }
    }

    /// Removes the review and its back-reference. Returns the deleted review.
    #[instrument(skip_all, fields(review_id = %review_id, user_id = %user_id))]
    pub async fn delete_review(&self, review_id: ReviewId, user_id: UserId) -> Result<Review, CoreError> {
        let movie_id = self.authored_review(&review_id, &user_id).await?.movie_id;
        let guard = self.locks.lock(movie_id).await;

        self.authored_review(&review_id, &user_id).await?;
        // Never delete a review that cannot also be unlinked from its movie
        let mut movie = self
            .store
            .get_movie(&movie_id)
            .await?
            .ok_or_else(|| CoreError::movie_not_found(&movie_id))?;

        let deleted = self
            .store
            .delete_review(&review_id)
            .await?
            .ok_or_else(|| CoreError::review_not_found(&review_id))?;

        movie.unlink_review(&review_id);
        match self
            .aggregator
            .on_review_deleted(&guard, movie, deleted.rating)
            .await
        {
            Ok(movie) => {
                info!(
                    average_rating = movie.average_rating,
                    total_ratings = movie.total_ratings,
                    "Review deleted"
                );
                Ok(deleted)
            }
            Err(err) => {
                if let Err(undo_err) = self.store.insert_review(&deleted).await {
                    error!(
                        "Failed to restore deleted review after aggregate write failed: {} (original error: {})",
                        undo_err, err
                    );
                }
                Err(err)
            }
        }
    }

    /// Adds `user_id` to the review's likes, or removes it if already present
    #[instrument(skip_all, fields(review_id = %review_id, user_id = %user_id))]
    pub async fn toggle_like(&self, review_id: ReviewId, user_id: UserId) -> Result<Review, CoreError> {
        let review = self
            .store
            .toggle_like(&review_id, &user_id)
            .await?
            .ok_or_else(|| CoreError::review_not_found(&review_id))?;

        debug!(
            liked = review.likes.contains(&user_id),
            like_count = review.like_count(),
            "Like toggled"
        );
        Ok(review)
    }

    pub async fn get_review(&self, review_id: ReviewId) -> Result<Review, CoreError> {
        self.store
            .get_review(&review_id)
            .await?
            .ok_or_else(|| CoreError::review_not_found(&review_id))
    }

    pub async fn list_reviews(&self, movie_id: MovieId, query: ReviewQuery) -> Result<Page<Review>, CoreError> {
        if self.store.get_movie(&movie_id).await?.is_none() {
            return Err(CoreError::movie_not_found(&movie_id));
        }

        let mut reviews = self.store.reviews_for_movie(&movie_id).await?;
        sort_reviews(&mut reviews, query.sort);
        Ok(Page::paginate(reviews, query.page, query.limit))
    }

    /// Reviews that are missing or written by someone else are both reported as `NotFound`
    async fn authored_review(&self, review_id: &ReviewId, user_id: &UserId) -> Result<Review, CoreError> {
        match self.store.get_review(review_id).await? {
            Some(review) if review.is_authored_by(user_id) => Ok(review),
            _ => Err(CoreError::review_not_found(review_id)),
        }
    }
}

pub(crate) fn sort_reviews(reviews: &mut [Review], sort: ReviewSort) {
    match sort {
        ReviewSort::Recent => reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ReviewSort::Popular => reviews.sort_by(|a, b| {
            b.like_count()
                .cmp(&a.like_count())
                .then(b.created_at.cmp(&a.created_at))
        }),
    }
}
