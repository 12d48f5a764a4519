use anyhow::{Context, Result};
use cinerate_models::MovieDraft;
use serde::Deserialize;

const BUNDLED_SEED: &str = include_str!("../data/seed.toml");

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    movies: Vec<MovieDraft>,
}

/// Catalog entries shipped with the binary
pub fn bundled_movies() -> Result<Vec<MovieDraft>> {
    parse_seed(BUNDLED_SEED).context("Bundled seed catalog is invalid")
}

pub fn parse_seed(content: &str) -> Result<Vec<MovieDraft>> {
    let file: SeedFile = toml::from_str(content).context("Failed to parse seed TOML")?;
    Ok(file.movies)
}
