use cinerate_models::{MovieId, ReviewId, UserId, ValidationErrors};
use cinerate_store::StoreError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Movie,
    Review,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Movie => write!(f, "Movie"),
            Entity::Review => write!(f, "Review"),
        }
    }
}

/// The four outcomes a caller has to map to a user-facing response
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: String },

    #[error("user {user_id} has already reviewed movie {movie_id}")]
    Conflict { user_id: UserId, movie_id: MovieId },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("storage error: {0}")]
    Storage(#[source] StoreError),
}

impl CoreError {
    pub fn movie_not_found(id: &MovieId) -> Self {
        Self::NotFound {
            entity: Entity::Movie,
            id: id.to_string(),
        }
    }

    pub fn review_not_found(id: &ReviewId) -> Self {
        Self::NotFound {
            entity: Entity::Review,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound { .. } => "not_found",
            CoreError::Conflict { .. } => "conflict",
            CoreError::Validation(_) => "validation",
            CoreError::Storage(_) => "storage",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, CoreError::Conflict { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, CoreError::Storage(_))
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateReview { user_id, movie_id, .. } => CoreError::Conflict { user_id, movie_id },
            StoreError::Missing { collection: "movies", id } => CoreError::NotFound {
                entity: Entity::Movie,
                id,
            },
            StoreError::Missing { collection: "reviews", id } => CoreError::NotFound {
                entity: Entity::Review,
                id,
            },
            other => CoreError::Storage(other),
        }
    }
}
