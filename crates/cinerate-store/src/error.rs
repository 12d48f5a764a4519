use cinerate_models::{MovieId, ReviewId, UserId};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The unique (user, movie) index rejected a second review
    #[error("user {user_id} already reviewed movie {movie_id} (review {existing})")]
    DuplicateReview {
        user_id: UserId,
        movie_id: MovieId,
        existing: ReviewId,
    },

    #[error("{collection} document {id} already exists")]
    DuplicateId { collection: &'static str, id: String },

    #[error("{collection} document {id} not found")]
    Missing { collection: &'static str, id: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt store file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
