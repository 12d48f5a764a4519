use crate::ids::{MovieId, ReviewId, UserId};
use crate::likes::LikeSet;
use crate::rating::Stars;
use crate::validation::ValidationErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_CONTENT_CHARS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    #[serde(rename = "movie")]
    pub movie_id: MovieId,
    #[serde(rename = "user")]
    pub user_id: UserId,
    pub rating: Stars,
    pub content: String,
    #[serde(default)]
    pub likes: LikeSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn new(movie_id: MovieId, user_id: UserId, rating: Stars, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: ReviewId::new(),
            movie_id,
            user_id,
            rating,
            content,
            likes: LikeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace rating and content on behalf of the author
    pub fn revise(&mut self, rating: Stars, content: String) {
        self.rating = rating;
        self.content = content;
        self.updated_at = Utc::now();
    }

    pub fn is_authored_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }

    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

/// Unvalidated rating + content as submitted by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub rating: i64,
    pub content: String,
}

impl ReviewDraft {
    pub fn new(rating: i64, content: impl Into<String>) -> Self {
        Self {
            rating,
            content: content.into(),
        }
    }

    /// Checks rating range and content length; content comes back trimmed
    pub fn validate(&self) -> Result<(Stars, String), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let stars = match Stars::new(self.rating) {
            Ok(stars) => Some(stars),
            Err(e) => {
                for err in e.errors() {
                    errors.push(err.field.clone(), err.message.clone());
                }
                None
            }
        };

        let content = self.content.trim().to_string();
        if content.chars().count() < MIN_CONTENT_CHARS {
            errors.push(
                "content",
                format!("Review content must be at least {} characters long", MIN_CONTENT_CHARS),
            );
        }

        match stars {
            Some(stars) => errors.into_result((stars, content)),
            None => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation_collects_both_errors() {
        let err = ReviewDraft::new(0, "short").validate().unwrap_err();
        assert!(err.has_field("rating"));
        assert!(err.has_field("content"));
    }

    #[test]
    fn test_draft_content_is_trimmed_before_length_check() {
        assert!(ReviewDraft::new(3, "   too short   ").validate().is_err());

        let (stars, content) = ReviewDraft::new(3, "  Really enjoyed it  ").validate().unwrap();
        assert_eq!(stars.value(), 3);
        assert_eq!(content, "Really enjoyed it");
    }

    #[test]
    fn test_review_json_shape() {
        let review = Review::new(
            MovieId::new(),
            UserId::new("alice"),
            Stars::new(4).unwrap(),
            "A solid film overall".to_string(),
        );
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["user"], "alice");
        assert_eq!(json["rating"], 4);
        assert!(json.get("createdAt").is_some());
        assert!(json["likes"].as_array().unwrap().is_empty());
    }
}
