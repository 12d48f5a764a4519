use crate::error::StoreError;
use async_trait::async_trait;
use cinerate_models::{Movie, MovieId, Review, ReviewId, Stars, UserId};

/// Document persistence for the movie and review collections.
///
/// Every method is atomic with respect to other calls on the same store.
/// Nothing here spans two calls; callers that need a multi-step
/// read-modify-write must serialize it themselves.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_name(&self) -> &str;

    // Movies
    async fn get_movie(&self, id: &MovieId) -> Result<Option<Movie>, StoreError>;
    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError>;
    async fn insert_movie(&self, movie: &Movie) -> Result<(), StoreError>;
    /// Fails with `Missing` when the movie no longer exists
    async fn replace_movie(&self, movie: &Movie) -> Result<(), StoreError>;
    async fn delete_movie(&self, id: &MovieId) -> Result<Option<Movie>, StoreError>;

    // Reviews
    async fn get_review(&self, id: &ReviewId) -> Result<Option<Review>, StoreError>;
    async fn find_review(&self, user: &UserId, movie: &MovieId) -> Result<Option<Review>, StoreError>;
    async fn reviews_for_movie(&self, movie: &MovieId) -> Result<Vec<Review>, StoreError>;
    async fn list_reviews(&self) -> Result<Vec<Review>, StoreError>;
    /// Enforces the unique (user, movie) index; a second review fails with `DuplicateReview`
    async fn insert_review(&self, review: &Review) -> Result<(), StoreError>;
    /// Replaces rating and content in place, leaving likes untouched. Returns the updated review.
    async fn revise_review(
        &self,
        id: &ReviewId,
        rating: Stars,
        content: &str,
    ) -> Result<Option<Review>, StoreError>;
    /// Puts back rating, content and `updatedAt` from an earlier copy of the
    /// same review; likes keep their current state. Fails with `Missing` when
    /// the review no longer exists.
    async fn restore_review(&self, previous: &Review) -> Result<Review, StoreError>;
    async fn delete_review(&self, id: &ReviewId) -> Result<Option<Review>, StoreError>;
    /// Flips `user`'s like membership in place. Returns the updated review.
    async fn toggle_like(&self, id: &ReviewId, user: &UserId) -> Result<Option<Review>, StoreError>;

    /// Drop every document in both collections
    async fn clear(&self) -> Result<(), StoreError>;
}
