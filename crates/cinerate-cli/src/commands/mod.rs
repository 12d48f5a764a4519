pub mod config;
pub mod movie;
pub mod prompts;
pub mod reconcile;
pub mod review;
pub mod seed;
pub mod ui;

use crate::output::Output;
use cinerate_config::{Config, StorageBackend};
use cinerate_core::{open_store, CoreError, Services};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::Path;

/// Services opened for one command invocation
pub struct Context {
    pub services: Services,
}

impl Context {
    pub async fn open(backend: StorageBackend, store_dir: &Path, config: &Config) -> Result<Self> {
        let store = open_store(backend, store_dir)
            .await
            .map_err(|e| eyre!("Failed to open {:?} store at {}: {}", backend, store_dir.display(), e))?;
        Ok(Self {
            services: Services::new(store, config.catalog.clone()),
        })
    }
}

/// Print the failure through the output handler and pick the exit status
pub fn report_error(report: &color_eyre::Report, output: &Output) -> i32 {
    let Some(err) = report.downcast_ref::<CoreError>() else {
        output.error("error", format!("{:#}", report), &[]);
        return 1;
    };

    match err {
        CoreError::NotFound { entity, id } => {
            output.error(err.kind(), format!("{} not found: {}", entity, id), &[]);
            3
        }
        CoreError::Conflict { .. } => {
            output.error(err.kind(), "You have already reviewed this movie", &[]);
            4
        }
        CoreError::Validation(errors) => {
            let details: Vec<String> = errors.errors().iter().map(|e| e.to_string()).collect();
            output.error(err.kind(), "Validation failed", &details);
            2
        }
        CoreError::Storage(source) => {
            output.error(err.kind(), format!("Storage error: {}", source), &[]);
            5
        }
    }
}

/// Filled stars for a 1-5 rating, or an average rounded to the nearest star
pub fn stars(value: f64) -> String {
    let filled = value.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinerate_models::{MovieId, ValidationErrors};

    #[test]
    fn test_stars() {
        assert_eq!(stars(0.0), "☆☆☆☆☆");
        assert_eq!(stars(3.4), "★★★☆☆");
        assert_eq!(stars(4.5), "★★★★★");
    }

    #[test]
    fn test_exit_codes_by_kind() {
        let output = Output::new(crate::output::OutputFormat::Json, true);

        let not_found = color_eyre::Report::new(CoreError::movie_not_found(&MovieId::new()));
        assert_eq!(report_error(&not_found, &output), 3);

        let mut errors = ValidationErrors::new();
        errors.push("rating", "Rating must be between 1 and 5");
        let invalid = color_eyre::Report::new(CoreError::Validation(errors));
        assert_eq!(report_error(&invalid, &output), 2);

        assert_eq!(report_error(&eyre!("boom"), &output), 1);
    }
}
