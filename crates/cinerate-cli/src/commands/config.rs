use super::ui;
use crate::output::Output;
use crate::ConfigCommands;
use cinerate_config::{Config, PathManager};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::Cell;
use owo_colors::OwoColorize;
use serde_json::json;

pub fn run_config(cmd: ConfigCommands, paths: &PathManager, config: &Config, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(paths, config, output),
        ConfigCommands::Init { force } => init_config(paths, force, output),
    }
}

fn show_config(paths: &PathManager, config: &Config, output: &Output) -> Result<()> {
    let config_file = paths.config_file();
    let exists = config_file.exists();
    let data_dir = config
        .storage
        .data_dir
        .clone()
        .unwrap_or_else(|| paths.store_dir());
    let (min_year, max_year) = config.catalog.release_year_bounds();

    if output.is_human() {
        if !exists {
            output.warn(format!(
                "Configuration file not found at {}; showing defaults. Run 'cinerate config init' to create it.",
                config_file.display()
            ));
        }

        let mut table = ui::table(&["Setting", "Value"]);
        table.add_row(vec![Cell::new("Config file"), Cell::new(config_file.display())]);
        table.add_row(vec![
            Cell::new("storage.backend"),
            Cell::new(format!("{:?}", config.storage.backend).to_lowercase()),
        ]);
        table.add_row(vec![Cell::new("storage.data_dir"), Cell::new(data_dir.display())]);
        table.add_row(vec![Cell::new("catalog.page_size"), Cell::new(config.catalog.page_size)]);
        table.add_row(vec![
            Cell::new("catalog.release years"),
            Cell::new(format!("{}..={}", min_year, max_year)),
        ]);
        table.add_row(vec![Cell::new("logging.level"), Cell::new(&config.logging.level)]);
        table.add_row(vec![
            Cell::new("logging.file"),
            Cell::new(
                config
                    .logging
                    .file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "stderr".bright_black().to_string()),
            ),
        ]);
        output.human(table);

        if let Err(e) = config.validate() {
            output.warn(format!("Configuration is invalid: {}", e));
        }
    }

    output.data(&json!({
        "configFile": config_file,
        "exists": exists,
        "dataDir": data_dir,
        "config": config,
        "valid": config.validate().is_ok(),
    }));
    Ok(())
}

fn init_config(paths: &PathManager, force: bool, output: &Output) -> Result<()> {
    let config_file = paths.config_file();
    if config_file.exists() && !force {
        return Err(eyre!(
            "Configuration already exists at {}; use --force to overwrite",
            config_file.display()
        ));
    }

    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create directories: {}", e))?;
    Config::default()
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to write {}: {}", config_file.display(), e))?;

    output.success(format!("Wrote default configuration to {}", config_file.display()));
    Ok(())
}
