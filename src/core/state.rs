use super::errors::StageFailure;
use super::events::{Event, Observer};
use super::models::StageKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRecord {
    pub stage: StageKind,
    pub results: Option<usize>, // None for dry-run previews
}

/// Records what happened during a run and mirrors it to the log.
#[derive(Debug, Default)]
pub struct RunState {
    pub target: String,
    pub completed: Vec<StageRecord>,
    pub failed: Option<(StageKind, String)>,
    pub post_errors: Vec<String>,
}

impl RunState {
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..Self::default()
        }
    }
}

impl Observer for RunState {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::RunStarted { target, output, proxy } => {
                tracing::info!(
                    "Starting recon chain for {} (output: {:?}, proxy: {})",
                    target,
                    output,
                    proxy.as_deref().unwrap_or("none")
                );
            }
            Event::StageStarted(stage) => {
                tracing::info!("Stage started: {}", stage);
            }
            Event::StagePreview { stage, command } => {
                tracing::debug!("Dry run {}: {}", stage, command);
                self.completed.push(StageRecord { stage: *stage, results: None });
            }
            Event::StageCompleted { stage, results } => {
                tracing::info!("Stage completed: {} ({} results)", stage, results);
                self.completed.push(StageRecord { stage: *stage, results: Some(*results) });
            }
            Event::StageFailed { stage, failure } => {
                tracing::error!("Stage failed: {}: {}", stage, failure);
                self.failed = Some((*stage, failure_kind(failure).to_string()));
            }
            Event::RootDomainAdded(domain) => {
                tracing::info!("Root domain {} appended to subdomains", domain);
            }
            Event::ArtifactWritten { artifact, path, count } => {
                tracing::info!("Wrote {} ({} entries) to {:?}", artifact, count, path);
            }
            Event::SummaryWritten(path) => {
                tracing::info!("Summary saved to {:?}", path);
            }
            Event::PostProcessFailed { step, error } => {
                tracing::error!("{} failed: {}", step, error);
                self.post_errors.push(format!("{}: {}", step, error));
            }
            Event::PromptSkipped => {
                tracing::info!("No crawl results, analysis prompt skipped");
            }
        }
    }
}

fn failure_kind(failure: &StageFailure) -> &'static str {
    match failure {
        StageFailure::VersionConflict { .. } => "version conflict",
        StageFailure::NonZeroExit { .. } => "non-zero exit",
        StageFailure::Spawn(_) => "spawn error",
        StageFailure::Output(_) => "output error",
    }
}
