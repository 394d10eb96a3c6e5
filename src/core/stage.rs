use super::errors::StageFailure;
use super::events::{Event, Observer};
use super::models::{Stage, StageKind, WriteMode};
use super::parser::count_non_blank;
use crate::executors::command::{CommandExecutor, CommandResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Stderr signature of a service-probe binary that is not the expected tool.
const VERSION_CONFLICT_SIGNATURE: &str = "No such option";
const STDERR_TAIL_LINES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed { results: usize },
    Previewed { command: Vec<String> },
    Failed(StageFailure),
}

impl StageOutcome {
    /// Non-blank lines in the stage artifact; zero for previews and failures.
    pub fn result_count(&self) -> usize {
        match self {
            StageOutcome::Completed { results } => *results,
            _ => 0,
        }
    }
}

/// Runs one stage: executes its command and persists the captured output.
pub struct StageRunner<'a> {
    executor: &'a dyn CommandExecutor,
    dry_run: bool,
}

impl<'a> StageRunner<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, dry_run: bool) -> Self {
        Self { executor, dry_run }
    }

    pub async fn run(&self, stage: &Stage, observer: &mut dyn Observer) -> StageOutcome {
        let command = stage.command();

        if self.dry_run {
            observer.on_event(&Event::StagePreview {
                stage: stage.kind,
                command: shell_words::join(&command),
            });
            return StageOutcome::Previewed { command };
        }

        observer.on_event(&Event::StageStarted(stage.kind));

        let executed = self
            .executor
            .execute(&command)
            .await
            .inspect(|result| tracing::debug!("{} ran for {}ms", stage.kind, result.duration_ms));

        let outcome = match executed {
            Ok(result) if result.success() => match persist_output(stage, &result.stdout) {
                Ok(results) => StageOutcome::Completed { results },
                Err(e) => StageOutcome::Failed(StageFailure::Output(e.to_string())),
            },
            Ok(result) => StageOutcome::Failed(classify_failure(stage.kind, &stage.tool, &result)),
            Err(e) => StageOutcome::Failed(StageFailure::Spawn(format!("{:#}", e))),
        };

        match &outcome {
            StageOutcome::Completed { results } => observer.on_event(&Event::StageCompleted {
                stage: stage.kind,
                results: *results,
            }),
            StageOutcome::Failed(failure) => observer.on_event(&Event::StageFailed {
                stage: stage.kind,
                failure: failure.clone(),
            }),
            StageOutcome::Previewed { .. } => {}
        }

        outcome
    }
}

fn classify_failure(kind: StageKind, tool: &Path, result: &CommandResult) -> StageFailure {
    if kind == StageKind::ServiceProbe && result.stderr.contains(VERSION_CONFLICT_SIGNATURE) {
        return StageFailure::VersionConflict {
            tool: tool.display().to_string(),
        };
    }

    let lines: Vec<&str> = result.stderr.lines().collect();
    let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
    StageFailure::NonZeroExit {
        code: result.exit_code,
        stderr: tail,
    }
}

/// Write trimmed stdout per the stage's write mode and count the artifact's results.
fn persist_output(stage: &Stage, stdout: &str) -> std::io::Result<usize> {
    let mut options = OpenOptions::new();
    options.create(true);
    match stage.write_mode {
        WriteMode::Overwrite => options.write(true).truncate(true),
        WriteMode::Append => options.append(true),
    };

    let mut file = options.open(&stage.output)?;
    let content = stdout.trim();
    if !content.is_empty() {
        file.write_all(content.as_bytes())?;
        file.write_all(b"\n")?;
    }
    file.sync_all()?;
    drop(file);

    Ok(count_non_blank(&fs::read_to_string(&stage.output)?))
}
