use std::path::PathBuf;
use super::errors::StageFailure;
use super::models::StageKind;

/// Lifecycle points the pipeline reports to its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    RunStarted {
        target: String,
        output: PathBuf,
        proxy: Option<String>,
    },
    StageStarted(StageKind),
    StagePreview {
        stage: StageKind,
        command: String,
    },
    StageCompleted {
        stage: StageKind,
        results: usize,
    },
    StageFailed {
        stage: StageKind,
        failure: StageFailure,
    },
    RootDomainAdded(String),
    ArtifactWritten {
        artifact: &'static str,
        path: PathBuf,
        count: usize,
    },
    SummaryWritten(PathBuf),
    PostProcessFailed {
        step: &'static str,
        error: String,
    },
    PromptSkipped,
}

pub trait Observer {
    fn on_event(&mut self, event: &Event);
}

impl<A: Observer, B: Observer> Observer for (A, B) {
    fn on_event(&mut self, event: &Event) {
        self.0.on_event(event);
        self.1.on_event(event);
    }
}

impl<O: Observer + ?Sized> Observer for &mut O {
    fn on_event(&mut self, event: &Event) {
        (**self).on_event(event);
    }
}
