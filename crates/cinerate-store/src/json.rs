use crate::collections::Collections;
use crate::error::StoreError;
use crate::traits::DocumentStore;
use async_trait::async_trait;
use cinerate_models::{Movie, MovieId, Review, ReviewId, Stars, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{debug, info};

const MOVIES_FILE: &str = "movies.json";
const REVIEWS_FILE: &str = "reviews.json";

/// Which collection files a mutation has to rewrite
#[derive(Debug, Clone, Copy)]
enum Touched {
    Movies,
    Reviews,
    Both,
}

/// Document store backed by one JSON file per collection.
///
/// The whole data set is held in memory. A mutation is applied to a copy,
/// the affected files are written (temp file + rename) and only then is the
/// copy swapped in, so a failed write leaves both memory and disk unchanged.
/// One process owns a store directory at a time.
pub struct JsonFileStore {
    dir: PathBuf,
    state: RwLock<Collections>,
}

impl JsonFileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        let start = Instant::now();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::io(&dir, e))?;

        let movies: Vec<Movie> = load_collection(&dir.join(MOVIES_FILE)).await?;
        let reviews: Vec<Review> = load_collection(&dir.join(REVIEWS_FILE)).await?;
        let collections = Collections::from_documents(movies, reviews).map_err(|e| StoreError::Corrupt {
            path: dir.clone(),
            reason: e.to_string(),
        })?;

        info!(
            "Opened JSON store at {:?}: {} movies, {} reviews in {:?}",
            dir,
            collections.movie_count(),
            collections.review_count(),
            start.elapsed()
        );

        Ok(Self {
            dir,
            state: RwLock::new(collections),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn mutate<T, F>(&self, touched: Touched, apply: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Collections) -> Result<T, StoreError>,
    {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let result = apply(&mut next)?;
        self.persist(&next, touched).await?;
        *state = next;
        Ok(result)
    }

    async fn persist(&self, collections: &Collections, touched: Touched) -> Result<(), StoreError> {
        if matches!(touched, Touched::Movies | Touched::Both) {
            write_collection(&self.dir.join(MOVIES_FILE), &collections.sorted_movies()).await?;
        }
        if matches!(touched, Touched::Reviews | Touched::Both) {
            write_collection(&self.dir.join(REVIEWS_FILE), &collections.sorted_reviews()).await?;
        }
        Ok(())
    }
}

async fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    if !path.exists() {
        debug!("Store file {:?} does not exist, starting empty", path);
        return Ok(Vec::new());
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

async fn write_collection<T: Serialize>(path: &Path, documents: &[T]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(documents)?;

    // Atomic write: write to temp file, then rename
    let temp_path = path.with_extension("json.tmp");
    tokio::fs::write(&temp_path, json)
        .await
        .map_err(|e| StoreError::io(&temp_path, e))?;
    tokio::fs::rename(&temp_path, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    debug!("Wrote {} documents to {:?}", documents.len(), path);
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn backend_name(&self) -> &str {
        "json"
    }

    async fn get_movie(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        Ok(self.state.read().await.get_movie(id).cloned())
    }

    async fn list_movies(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.state.read().await.movies().cloned().collect())
    }

    async fn insert_movie(&self, movie: &Movie) -> Result<(), StoreError> {
        let movie = movie.clone();
        self.mutate(Touched::Movies, move |c| c.insert_movie(movie)).await
    }

    async fn replace_movie(&self, movie: &Movie) -> Result<(), StoreError> {
        let movie = movie.clone();
        self.mutate(Touched::Movies, move |c| c.replace_movie(movie)).await
    }

    async fn delete_movie(&self, id: &MovieId) -> Result<Option<Movie>, StoreError> {
        self.mutate(Touched::Movies, |c| Ok(c.delete_movie(id))).await
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
        let review = review.clone();
        self.mutate(Touched::Reviews, move |c| c.insert_review(review)).await
    }

    async fn revise_review(
        &self,
        id: &ReviewId,
        rating: Stars,
        content: &str,
    ) -> Result<Option<Review>, StoreError> {
        self.mutate(Touched::Reviews, |c| Ok(c.revise_review(id, rating, content)))
            .await
    }

    async fn restore_review(&self, previous: &Review) -> Result<Review, StoreError> {
        self.mutate(Touched::Reviews, |c| c.restore_review(previous)).await
    }

    async fn delete_review(&self, id: &ReviewId) -> Result<Option<Review>, StoreError> {
        self.mutate(Touched::Reviews, |c| Ok(c.delete_review(id))).await
    }

    async fn toggle_like(&self, id: &ReviewId, user: &UserId) -> Result<Option<Review>, StoreError> {
        self.mutate(Touched::Reviews, |c| Ok(c.toggle_like(id, user))).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.mutate(Touched::Both, |c| {
            c.clear();
            Ok(())
        })
        .await
    }
}
