use crate::ids::{MovieId, ReviewId};
use crate::rating::RatingSummary;
use crate::validation::ValidationErrors;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use url::{Host, Url};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub genre: String,
    pub director: String,
    #[serde(default)]
    pub cast: Vec<String>,
    pub poster_url: String,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub total_ratings: u32,
    /// Back-references to this movie's reviews; reviews own the relation
    #[serde(default)]
    pub reviews: BTreeSet<ReviewId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Movie {
    /// New catalog entry with an empty aggregate. The draft must already be validated.
    pub fn from_draft(draft: MovieDraft) -> Self {
        let now = Utc::now();
        let draft = draft.normalized();
        Self {
            id: MovieId::new(),
            title: draft.title,
            description: draft.description,
            release_year: draft.release_year,
            genre: draft.genre,
            director: draft.director,
            cast: draft.cast,
            poster_url: draft.poster_url,
            average_rating: 0.0,
            total_ratings: 0,
            reviews: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace catalog fields; derived fields and back-references are kept
    pub fn apply_draft(&mut self, draft: MovieDraft) {
        let draft = draft.normalized();
        self.title = draft.title;
        self.description = draft.description;
        self.release_year = draft.release_year;
        self.genre = draft.genre;
        self.director = draft.director;
        self.cast = draft.cast;
        self.poster_url = draft.poster_url;
        self.updated_at = Utc::now();
    }

    pub fn to_draft(&self) -> MovieDraft {
        MovieDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            release_year: self.release_year,
            genre: self.genre.clone(),
            director: self.director.clone(),
            cast: self.cast.clone(),
            poster_url: self.poster_url.clone(),
        }
    }

    pub fn summary(&self) -> RatingSummary {
        RatingSummary {
            average_rating: self.average_rating,
            total_ratings: self.total_ratings,
        }
    }

    pub fn set_summary(&mut self, summary: RatingSummary) {
        self.average_rating = summary.average_rating;
        self.total_ratings = summary.total_ratings;
        self.updated_at = Utc::now();
    }

    /// Returns false if the review was already linked
    pub fn link_review(&mut self, review_id: ReviewId) -> bool {
        self.reviews.insert(review_id)
    }

    /// Returns false if the review was not linked
    pub fn unlink_review(&mut self, review_id: &ReviewId) -> bool {
        self.reviews.remove(review_id)
    }
}

/// Catalog fields supplied by an administrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieDraft {
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub genre: String,
    pub director: String,
    #[serde(default)]
    pub cast: Vec<String>,
    pub poster_url: String,
}

impl MovieDraft {
    /// Validate against an inclusive range of accepted release years
    pub fn validate(&self, min_year: i32, max_year: i32) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().is_empty() {
            errors.push("title", "Title is required");
        }
        if self.description.trim().is_empty() {
            errors.push("description", "Description is required");
        }
        if self.genre.trim().is_empty() {
            errors.push("genre", "Genre is required");
        }
        if self.director.trim().is_empty() {
            errors.push("director", "Director is required");
        }
        if self.release_year < min_year || self.release_year > max_year {
            errors.push(
                "releaseYear",
                format!("Release year must be between {} and {}", min_year, max_year),
            );
        }
        if !is_web_url(self.poster_url.trim()) {
            errors.push("posterUrl", "Please enter a valid poster URL");
        }

        errors.into_result(())
    }

    fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            release_year: self.release_year,
            genre: self.genre.trim().to_string(),
            director: self.director.trim().to_string(),
            cast: self
                .cast
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
            poster_url: self.poster_url.trim().to_string(),
        }
    }
}

/// Absolute http(s) URL whose host is an IP address or a dotted domain name
fn is_web_url(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(_) => return false,
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => is_domain_name(domain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

fn is_domain_name(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}
