use thiserror::Error;
use super::models::StageKind;

/// Why a single stage did not complete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageFailure {
    #[error("wrong {tool} binary on PATH (rejected a flag); install the Go version")]
    VersionConflict { tool: String },

    #[error("exited with code {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("failed to spawn: {0}")]
    Spawn(String),

    #[error("failed to write output: {0}")]
    Output(String),
}

#[derive(Error, Debug)]
pub enum ReconError {
    #[error("missing required tools: {}", .0.join(", "))]
    MissingTools(Vec<String>),

    #[error("{stage} stage failed: {failure}")]
    StageFailed {
        stage: StageKind,
        failure: StageFailure,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}
