use comfy_table::{Attribute, Cell, Color, Table};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;

/// Progress for a row-by-row import. Draws a bar on a terminal and falls
/// back to structured log lines otherwise.
pub struct ImportProgress {
    bar: Option<ProgressBar>,
    total: usize,
}

impl ImportProgress {
    pub fn new(total: usize, quiet: bool) -> Self {
        let interactive = !quiet && std::io::stderr().is_terminal();
        if !interactive {
            tracing::info!(operation = "import", rows = total, "Importing catalog rows");
            return Self { bar: None, total };
        }

        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }
        bar.set_message("Importing movies...");
        Self { bar: Some(bar), total }
    }

    pub fn set_done(&self, done: usize) {
        match &self.bar {
            Some(bar) => bar.set_position(done as u64),
            None if done == self.total || done % 100 == 0 => {
                tracing::info!(operation = "import", done, total = self.total, "Import progress");
            }
            None => {}
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_with_message("Done");
        }
    }
}

/// Table with the preset every listing uses
pub fn table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan).add_attribute(Attribute::Bold)),
    );
    table
}

/// Shorten long free text for table cells
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
    }
}
