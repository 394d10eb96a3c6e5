use colored::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi: MultiProgress,
    spinner: Option<ProgressBar>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            spinner: None,
        }
    }

    #[cfg(test)]
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
            spinner: None,
        }
    }

    /// Replace the current spinner with a new one showing `message`
    pub fn start_spinner(&mut self, message: &str) {
        self.clear_spinner();

        let spinner = self.multi.add(ProgressBar::new_spinner());
        let style = ProgressStyle::with_template("{spinner:.blue} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    pub fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    #[cfg(test)]
    pub fn is_spinning(&self) -> bool {
        self.spinner.is_some()
    }

    fn print_status(&self, status: &str, message: &str, color: colored::Color) {
        let formatted = if status.is_empty() {
            message.to_string()
        } else {
            format!("{} {}", status.color(color).bold(), message.normal())
        };
        // A failed terminal write only loses narration
        let _ = self.multi.println(formatted);
    }

    pub fn print_success(&self, message: &str) {
        self.print_status("OK", message, colored::Color::Green);
    }

    pub fn print_error(&self, message: &str) {
        self.print_status("ERR", message, colored::Color::Red);
    }

    pub fn print_info(&self, message: &str) {
        self.print_status("", message, colored::Color::Blue);
    }

    pub fn print_warning(&self, message: &str) {
        self.print_status("WARN", message, colored::Color::Yellow);
    }

    pub fn print_preview(&self, message: &str) {
        self.print_status("DRY RUN", message, colored::Color::Magenta);
    }

    pub fn print_section(&self, title: &str) {
        let _ = self.multi.println(format!("\n{}", title.bright_cyan().bold()));
    }

    /// Finish and clean up the spinner
    pub fn finish(&mut self) {
        self.clear_spinner();
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProgressManager {
    fn drop(&mut self) {
        self.clear_spinner();
    }
}
