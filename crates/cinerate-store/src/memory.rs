use crate::collections::Collections;
use crate::error::StoreError;
use crate::traits::DocumentStore;
use async_trait::async_trait;
use cinerate_models::{Movie, MovieId, Review, ReviewId, Stars, UserId};
use tokio::sync::RwLock;
use tracing::debug;

/// Process-local store; contents vanish when the process exits
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn get_movie(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        Ok(self.state.read().await.get_movie(id).cloned())
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.state.read().await.movies().cloned().collect())
    }

    async fn insert_movie(&self, movie: &Movie) -> Result<(), StoreError> {
        self.state.write().await.insert_movie(movie.clone())
    }

    async fn replace_movie(&self, movie: &Movie) -> Result<(), StoreError> {
        self.state.write().await.replace_movie(movie.clone())
    }

    async fn delete_movie(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        Ok(self.state.write().await.delete_movie(id))
    }

    async fn get_review(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        Ok(self.state.read().await.get_review(id).cloned())
    }

    async fn find_review(&self, user: &UserId, movie: &MovieId) -> Result<Option<Review>, StoreError> {
        Ok(self.state.read().await.find_review(user, movie).cloned())
    }

    async fn reviews_for_movie(&self, movie: &MovieId) -> Result<Vec<Review>, StoreError> {
        Ok(self.state.read().await.reviews_for_movie(movie))
    }

    async fn list_reviews(&self) -> Result<Vec<Review>, StoreError> {
        Ok(self.state.read().await.reviews().cloned().collect())
    }

    async fn insert_review(&self, review: &Review) -> Result<(), StoreError> {
        self.state.write().await.insert_review(review.clone())
    }

    async fn revise_review(
        &self,
        id: &ReviewId,
        rating: Stars,
        content: &str,
    ) -> Result<Option<Review>, StoreError> {
        Ok(self.state.write().await.revise_review(id, rating, content))
    }

    async fn restore_review(&self, previous: &Review) -> Result<Review, StoreError> {
        self.state.write().await.restore_review(previous)
    }

    async fn delete_review(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        Ok(self.state.write().await.delete_review(id))
    }

    async fn toggle_like(&self, id: &ReviewId, user: &UserId) -> Result<Option<Review>, StoreError> {
        Ok(self.state.write().await.toggle_like(id, user))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        debug!(
            "Clearing memory store ({} movies, {} reviews)",
            state.movie_count(),
            state.review_count()
        );
        state.clear();
        Ok(())
    }
}
