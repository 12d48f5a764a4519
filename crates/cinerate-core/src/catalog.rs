use crate::error::CoreError;
use crate::import::ImportRow;
use crate::locks::MovieLocks;
use crate::page::Page;
use crate::reviews::{sort_reviews, ReviewSort};
use cinerate_config::CatalogConfig;
use cinerate_models::{Movie, MovieDraft, MovieId, Review};
use cinerate_store::DocumentStore;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MovieSort {
    /// Highest average first
    Rating,
    /// Latest release first
    Year,
    /// Alphabetical, ignoring case
    Title,
    /// Most recently added first
    #[default]
    Newest,
}

impl FromStr for MovieSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rating" => Ok(MovieSort::Rating),
            "year" => Ok(MovieSort::Year),
            "title" => Ok(MovieSort::Title),
            "newest" => Ok(MovieSort::Newest),
            _ => Err(format!(
                "Invalid movie sort: {}. Use 'rating', 'year', 'title' or 'newest'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MovieQuery {
    /// Exact genre match
    pub genre: Option<String>,
    pub sort: MovieSort,
    pub page: usize,
    /// Falls back to the configured page size
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub movie: Movie,
    /// Newest first
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieRemoval {
    pub movie: Movie,
    pub reviews_removed: usize,
    /// Reviews that could not be deleted; `reconcile` removes them later
    pub reviews_left: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub created: Vec<MovieId>,
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub cleared: bool,
    pub created: usize,
    pub already_present: usize,
}

/// Administrator operations over the movie collection.
///
/// Catalog edits share the per-movie critical section with the review
/// service so an edit never overwrites a concurrent aggregate update.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
    locks: Arc<MovieLocks>,
    rules: CatalogConfig,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>, locks: Arc<MovieLocks>, rules: CatalogConfig) -> Self {
        Self { store, locks, rules }
    }

    fn validate(&self, draft: &MovieDraft) -> Result<(), CoreError> {
        let (min_year, max_year) = self.rules.release_year_bounds();
        draft.validate(min_year, max_year)?;
        Ok(())
    }

    #[instrument(skip_all, fields(title = %draft.title))]
    pub async fn create_movie(&self, draft: MovieDraft) -> Result<Movie, CoreError> {
        self.validate(&draft)?;

        let movie = Movie::from_draft(draft);
        self.store.insert_movie(&movie).await?;

        info!(movie_id = %movie.id, "Movie created");
        Ok(movie)
    }

    #[instrument(skip_all, fields(movie_id = %movie_id))]
    pub async fn update_movie(&self, movie_id: MovieId, draft: MovieDraft) -> Result<Movie, CoreError> {
        self.validate(&draft)?;

        let _guard = self.locks.lock(movie_id).await;
        let mut movie = self.get_movie(movie_id).await?;
        movie.apply_draft(draft);
        self.store.replace_movie(&movie).await?;

        info!("Movie updated");
        Ok(movie)
    }

    /// Deletes the movie and then every review written for it.
    ///
    /// Once the movie is gone the call succeeds. Reviews whose deletion
    /// fails are counted in `reviews_left` and removed by the next reconcile.
    #[instrument(skip_all, fields(movie_id = %movie_id))]
    pub async fn delete_movie(&self, movie_id: MovieId) -> Result<MovieRemoval, CoreError> {
        let _guard = self.locks.lock(movie_id).await;

        let movie = self
            .store
            .delete_movie(&movie_id)
            .await?
            .ok_or_else(|| CoreError::movie_not_found(&movie_id))?;

        let reviews = match self.store.reviews_for_movie(&movie_id).await {
            Ok(reviews) => reviews,
            Err(err) => {
                warn!("Movie deleted but its reviews could not be listed: {}", err);
                return Ok(MovieRemoval {
                    reviews_removed: 0,
                    reviews_left: movie.reviews.len(),
                    movie,
                });
            }
        };

        let mut reviews_removed = 0;
        let mut reviews_left = 0;
        for review in &reviews {
            match self.store.delete_review(&review.id).await {
                Ok(Some(_)) => reviews_removed += 1,
                Ok(None) => {}
                Err(err) => {
                    warn!(
                        review_id = %review.id,
                        "Movie deleted but its review could not be removed: {}",
                        err
                    );
                    reviews_left += 1;
                }
            }
        }

        if reviews_left > 0 {
            warn!(reviews_left, "Run reconcile to remove the remaining reviews");
        }
        info!(reviews_removed, "Movie deleted");
        Ok(MovieRemoval {
            movie,
            reviews_removed,
            reviews_left,
        })
    }

    pub async fn get_movie(&self, movie_id: MovieId) -> Result<Movie, CoreError> {
        self.store
            .get_movie(&movie_id)
            .await?
            .ok_or_else(|| CoreError::movie_not_found(&movie_id))
    }

    pub async fn movie_details(&self, movie_id: MovieId) -> Result<MovieDetails, CoreError> {
        let movie = self.get_movie(movie_id).await?;
        let mut reviews = self.store.reviews_for_movie(&movie_id).await?;
        sort_reviews(&mut reviews, ReviewSort::Recent);
        Ok(MovieDetails { movie, reviews })
    }

    pub async fn list_movies(&self, query: MovieQuery) -> Result<Page<Movie>, CoreError> {
        let mut movies = self.store.list_movies().await?;
        if let Some(genre) = &query.genre {
            movies.retain(|m| &m.genre == genre);
        }
        sort_movies(&mut movies, query.sort);

        let limit = query.limit.unwrap_or(self.rules.page_size);
        debug!(
            total = movies.len(),
            page = query.page,
            limit,
            "Listing movies"
        );
        Ok(Page::paginate(movies, query.page, limit))
    }

    pub async fn movies_by_genre(&self, genre: &str) -> Result<Vec<Movie>, CoreError> {
        let mut movies = self.store.list_movies().await?;
        movies.retain(|m| m.genre == genre);
        sort_movies(&mut movies, MovieSort::Title);
        Ok(movies)
    }

    pub async fn genres(&self) -> Result<Vec<String>, CoreError> {
        let genres: BTreeSet<String> = self
            .store
            .list_movies()
            .await?
            .into_iter()
            .map(|m| m.genre)
            .collect();
        Ok(genres.into_iter().collect())
    }

    /// Create a movie per parsed row. Rows that fail to parse or validate are
    /// skipped and reported; storage errors abort the import.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub async fn import<F>(&self, rows: Vec<ImportRow>, mut on_row: F) -> Result<ImportReport, CoreError>
    where
        F: FnMut(usize),
    {
        let mut report = ImportReport::default();

        for (index, row) in rows.into_iter().enumerate() {
            let outcome = match row.draft {
                Ok(draft) => match self.create_movie(draft).await {
                    Ok(movie) => Ok(movie.id),
                    Err(CoreError::Validation(errors)) => Err(errors.to_string()),
                    Err(other) => return Err(other),
                },
                Err(reason) => Err(reason),
            };

            match outcome {
                Ok(id) => report.created.push(id),
                Err(reason) => {
                    warn!(line = row.line, "Skipping import row: {}", reason);
                    report.skipped.push(SkippedRow { line: row.line, reason });
                }
            }
            on_row(index + 1);
        }

        info!(
            "Imported {} movies, skipped {} rows",
            report.created.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Load the bundled catalog. Titles already present (ignoring case) are left alone.
    #[instrument(skip_all, fields(reset = reset))]
    pub async fn seed(&self, drafts: Vec<MovieDraft>, reset: bool) -> Result<SeedReport, CoreError> {
        let mut report = SeedReport::default();

        if reset {
            self.store.clear().await?;
            report.cleared = true;
            info!("Cleared all movies and reviews before seeding");
        }

        let mut existing: HashSet<String> = self
            .store
            .list_movies()
            .await?
            .into_iter()
            .map(|m| m.title.to_lowercase())
            .collect();

        for draft in drafts {
            if !existing.insert(draft.title.trim().to_lowercase()) {
                debug!(title = %draft.title, "Seed movie already present");
                report.already_present += 1;
                continue;
            }
            self.create_movie(draft).await?;
            report.created += 1;
        }

        info!(
            "Seeded {} movies ({} already present)",
            report.created, report.already_present
        );
        Ok(report)
    }
}

fn sort_movies(movies: &mut [Movie], sort: MovieSort) {
    match sort {
        MovieSort::Rating => movies.sort_by(|a, b| {
            b.average_rating
                .total_cmp(&a.average_rating)
                .then(b.total_ratings.cmp(&a.total_ratings))
        }),
        MovieSort::Year => movies.sort_by(|a, b| b.release_year.cmp(&a.release_year)),
        MovieSort::Title => movies.sort_by_key(|m| m.title.to_lowercase()),
        MovieSort::Newest => movies.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
    }
}

#[cfg(test)]
mod tests;
