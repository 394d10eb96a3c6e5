use super::progress::ProgressManager;
use crate::core::errors::StageFailure;
use crate::core::events::{Event, Observer};

/// Narrates the run on the terminal: a spinner while a stage runs and one
/// status line per lifecycle event.
pub struct ConsoleObserver {
    progress: ProgressManager,
    verbose: bool,
}

impl ConsoleObserver {
    pub fn new(progress: ProgressManager, verbose: bool) -> Self {
        Self { progress, verbose }
    }

    pub fn finish(&mut self) {
        self.progress.finish();
    }
}

impl Observer for ConsoleObserver {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::RunStarted { target, output, proxy } => {
                self.progress.print_section(&format!("Recon chain: {}", target));
                self.progress.print_info(&format!("Output directory: {}", output.display()));
                if let Some(proxy) = proxy {
                    self.progress.print_info(&format!("Proxy: {}", proxy));
                }
            }
            Event::StageStarted(stage) => {
                self.progress.start_spinner(&format!("Running {}...", stage));
            }
            Event::StagePreview { stage, command } => {
                self.progress.print_preview(&format!("{}: {}", stage, command));
            }
            Event::StageCompleted { stage, results } => {
                self.progress.clear_spinner();
                self.progress.print_success(&format!("{} finished: {} results", stage, results));
            }
            Event::StageFailed { stage, failure } => {
                self.progress.clear_spinner();
                self.progress.print_error(&format!("{} failed: {}", stage, failure));
                if let StageFailure::VersionConflict { .. } = failure {
                    self.progress.print_warning(
                        "Uninstall the Python httpx client or put the ProjectDiscovery binary first in PATH",
                    );
                }
            }
            Event::RootDomainAdded(domain) => {
                if self.verbose {
                    self.progress.print_info(&format!("Added root domain {} to the subdomain list", domain));
                }
            }
            Event::ArtifactWritten { artifact, path, count } => {
                self.progress
                    .print_success(&format!("Wrote {} {} to {}", count, artifact, path.display()));
            }
            Event::SummaryWritten(path) => {
                self.progress.print_success(&format!("Summary saved to {}", path.display()));
            }
            Event::PostProcessFailed { step, error } => {
                self.progress.print_warning(&format!("{} failed: {}", step, error));
            }
            Event::PromptSkipped => {
                if self.verbose {
                    self.progress.print_info("No crawl results, analysis prompt skipped");
                }
            }
        }
    }
}
