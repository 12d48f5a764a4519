use crate::error::StoreError;
use cinerate_models::{Movie, MovieId, Review, ReviewId, Stars, UserId};
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};

/// Both collections plus their secondary indices.
///
/// Shared by every backend; backends wrap it in a lock and decide how (and
/// whether) to persist after each mutation.
#[derive(Debug, Clone, Default)]
pub struct Collections {
    movies: HashMap<MovieId, Movie>,
    reviews: HashMap<ReviewId, Review>,

    /// Unique index on (user, movie)
    by_user_movie: HashMap<(UserId, MovieId), ReviewId>,

    /// Non-unique index on movie
    by_movie: HashMap<MovieId, BTreeSet<ReviewId>>,
}

impl Collections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted documents, refusing data that breaks an index
    pub fn from_documents(movies: Vec<Movie>, reviews: Vec<Review>) -> Result<Self, StoreError> {
        let mut collections = Self::new();
        for movie in movies {
            collections.insert_movie(movie)?;
        }
        for review in reviews {
            collections.insert_review(review)?;
        }
        Ok(collections)
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    pub fn get_movie(&self, id: &MovieId) -> Option<&Movie> {
        self.movies.get(id)
    }

    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    pub fn insert_movie(&mut self, movie: Movie) -> Result<(), StoreError> {
        if self.movies.contains_key(&movie.id) {
            return Err(StoreError::DuplicateId {
                collection: "movies",
                id: movie.id.to_string(),
            });
        }
        self.movies.insert(movie.id, movie);
        Ok(())
    }

    pub fn replace_movie(&mut self, movie: Movie) -> Result<(), StoreError> {
        match self.movies.get_mut(&movie.id) {
            Some(existing) => {
                *existing = movie;
                Ok(())
            }
            None => Err(StoreError::Missing {
                collection: "movies",
                id: movie.id.to_string(),
            }),
        }
    }

    pub fn delete_movie(&mut self, id: &MovieId) -> Option<Movie> {
        self.movies.remove(id)
    }

    pub fn get_review(&self, id: &ReviewId) -> Option<&Review> {
        self.reviews.get(id)
    }

    pub fn reviews(&self) -> impl Iterator<Item = &Review> {
        self.reviews.values()
    }

    pub fn find_review(&self, user: &UserId, movie: &MovieId) -> Option<&Review> {
        self.by_user_movie
            .get(&(user.clone(), *movie))
            .and_then(|id| self.reviews.get(id))
    }

    pub fn reviews_for_movie(&self, movie: &MovieId) -> Vec<Review> {
        self.by_movie
            .get(movie)
            .map(|ids| ids.iter().filter_map(|id| self.reviews.get(id)).cloned().collect())
            .unwrap_or_default()
    }

    pub fn insert_review(&mut self, review: Review) -> Result<(), StoreError> {
        if self.reviews.contains_key(&review.id) {
            return Err(StoreError::DuplicateId {
                collection: "reviews",
                id: review.id.to_string(),
            });
        }

        let key = (review.user_id.clone(), review.movie_id);
        if let Some(existing) = self.by_user_movie.get(&key) {
            return Err(StoreError::DuplicateReview {
                user_id: review.user_id.clone(),
                movie_id: review.movie_id,
                existing: *existing,
            });
        }

        self.by_user_movie.insert(key, review.id);
        self.by_movie.entry(review.movie_id).or_default().insert(review.id);
        self.reviews.insert(review.id, review);
        Ok(())
    }

    pub fn revise_review(&mut self, id: &ReviewId, rating: Stars, content: &str) -> Option<Review> {
        let review = self.reviews.get_mut(id)?;
        review.revise(rating, content.to_string());
        Some(review.clone())
    }

    pub fn restore_review(&mut self, previous: &Review) -> Result<Review, StoreError> {
        let review = self.reviews.get_mut(&previous.id).ok_or_else(|| StoreError::Missing {
            collection: "reviews",
            id: previous.id.to_string(),
        })?;
        review.rating = previous.rating;
        review.content = previous.content.clone();
        review.updated_at = previous.updated_at;
        Ok(review.clone())
    }

    pub fn delete_review(&mut self, id: &ReviewId) -> Option<Review> {
        let review = self.reviews.remove(id)?;
        self.by_user_movie.remove(&(review.user_id.clone(), review.movie_id));
        if let Some(ids) = self.by_movie.get_mut(&review.movie_id) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_movie.remove(&review.movie_id);
            }
        }
        Some(review)
    }

    pub fn toggle_like(&mut self, id: &ReviewId, user: &UserId) -> Option<Review> {
        let review = self.reviews.get_mut(id)?;
        review.likes.toggle(user);
        review.updated_at = Utc::now();
        Some(review.clone())
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Documents in a stable order for persistence
    pub fn sorted_movies(&self) -> Vec<&Movie> {
        let mut movies: Vec<&Movie> = self.movies.values().collect();
        movies.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        movies
    }

    pub fn sorted_reviews(&self) -> Vec<&Review> {
        let mut reviews: Vec<&Review> = self.reviews.values().collect();
        reviews.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        reviews
    }
}
