use crate::validation::ValidationErrors;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

/// A star rating, always within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub fn new(value: i64) -> Result<Self, ValidationErrors> {
        if value < MIN_STARS as i64 || value > MAX_STARS as i64 {
            let mut errors = ValidationErrors::new();
            errors.push(
                "rating",
                format!("Rating must be between {} and {}", MIN_STARS, MAX_STARS),
            );
            return Err(errors);
        }
        Ok(Self(value as u8))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Stars {
    type Error = ValidationErrors;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> Self {
        stars.0
    }
}

impl fmt::Display for Stars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The derived rating fields stored on a movie
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub average_rating: f64,
    pub total_ratings: u32,
}

impl RatingSummary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fold one more rating into the running mean.
    ///
    /// Only correct when the caller holds the movie's critical section;
    /// otherwise two writers can start from the same stale summary.
    pub fn with_added(self, stars: Stars) -> Self {
        let total = self.average_rating * self.total_ratings as f64 + stars.value() as f64;
        let total_ratings = self.total_ratings + 1;
        Self {
            average_rating: total / total_ratings as f64,
            total_ratings,
        }
    }

    /// Exact summary of a full set of ratings
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Stars>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0u64, 0u32), |(sum, count), stars| (sum + stars.value() as u64, count + 1));

        if count == 0 {
            return Self::empty();
        }

        Self {
            average_rating: sum as f64 / count as f64,
            total_ratings: count,
        }
    }

    /// Equal within floating-point tolerance
    pub fn approx_eq(&self, other: &RatingSummary) -> bool {
        self.total_ratings == other.total_ratings
            && (self.average_rating - other.average_rating).abs() < 1e-9
    }
}
