use color_eyre::Result;
use dialoguer::Confirm;

/// Prompt for yes/no; `default` is used when the user just presses enter
pub fn prompt_yes_no(prompt: &str, default: bool) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read confirmation: {}", e))
}
