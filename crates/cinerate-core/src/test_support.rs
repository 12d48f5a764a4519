//! Store doubles shared by the service tests

use async_trait::async_trait;
use cinerate_models::{Movie, MovieDraft, MovieId, Review, ReviewId, Stars, UserId};
use cinerate_store::{DocumentStore, MemoryStore, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};

/// Delegates to a [`MemoryStore`] but can be told to fail movie writes
/// or review writes, or to hide existing reviews from `find_review`.
#[derive(Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_movie_writes: AtomicBool,
    fail_review_writes: AtomicBool,
    fail_rollback: AtomicBool,
    blind_lookups: AtomicBool,
}

impl FailingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_movie_writes(&self, fail: bool) {
        self.fail_movie_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_review_writes(&self, fail: bool) {
        self.fail_review_writes.store(fail, Ordering::SeqCst);
    }

    /// Once a movie write fails, review writes start failing too
    pub fn fail_rollback(&self, fail: bool) {
        self.fail_rollback.store(fail, Ordering::SeqCst);
    }

    /// `find_review` reports nothing, leaving duplicates to the unique index
    pub fn blind_lookups(&self, blind: bool) {
        self.blind_lookups.store(blind, Ordering::SeqCst);
    }

    fn check_movie_write(&self) -> Result<(), StoreError> {
        if self.fail_movie_writes.load(Ordering::SeqCst) {
            if self.fail_rollback.load(Ordering::SeqCst) {
                self.fail_review_writes(true);
            }
            return Err(StoreError::Unavailable("movie writes disabled".to_string()));
        }
        Ok(())
    }

    fn check_review_write(&self) -> Result<(), StoreError> {
        if self.fail_review_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("review writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    fn backend_name(&self) -> &str {
        "failing"
    }

    async fn get_movie(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        self.inner.get_movie(id).await
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        self.inner.list_movies().await
    }

    async fn insert_movie(&self, movie: &Movie) -> Result<(), StoreError> {
        self.check_movie_write()?;
        self.inner.insert_movie(movie).await
    }

    async fn replace_movie(&self, movie: &Movie) -> Result<(), StoreError> {
        self.check_movie_write()?;
        self.inner.replace_movie(movie).await
    }

    async fn delete_movie(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        self.check_movie_write()?;
        self.inner.delete_movie(id).await
    }

    async fn get_review(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        self.inner.get_review(id).await
    }

    async fn find_review(&self, user: &UserId, movie: &MovieId) -> Result<Option<Review>, StoreError> {
        if self.blind_lookups.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.find_review(user, movie).await
    }

    async fn reviews_for_movie(&self, movie: &MovieId) -> Result<Vec<Review>, StoreError> {
        self.inner.reviews_for_movie(movie).await
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, StoreError> {
        self.inner.list_reviews().await
    }

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        self.check_review_write()?;
        self.inner.insert_review(review).await
    }

    async fn revise_review(
        &self,
        id: &ReviewId,
        rating: Stars,
        content: &str,
    ) -> Result<Option<Review>, StoreError> {
        self.check_review_write()?;
        self.inner.revise_review(id, rating, content).await
    }

    async fn restore_review(&self, previous: &Review) -> Result<Review, StoreError> {
        self.check_review_write()?;
        self.inner.restore_review(previous).await
    }

    async fn delete_review(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        self.check_review_write()?;
        self.inner.delete_review(id).await
    }

    async fn toggle_like(&self, id: &ReviewId, user: &UserId) -> Result<Option<Review>, StoreError> {
        self.check_review_write()?;
        self.inner.toggle_like(id, user).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear().await
    }
}

pub fn draft(title: &str) -> MovieDraft {
    MovieDraft {
        title: title.to_string(),
        description: "A film used in tests".to_string(),
        release_year: 2010,
        genre: "Drama".to_string(),
        director: "Jane Doe".to_string(),
        cast: vec!["Someone".to_string()],
        poster_url: "https://example.com/poster.jpg".to_string(),
    }
}
