use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>, // None when killed by a signal
    pub duration_ms: u128,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs one external command to completion.
///
/// A non-zero exit is not an error here: it is returned in `exit_code`
/// together with the captured stderr. `Err` means the process could not run.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, argv: &[String]) -> Result<CommandResult>;
}

/// Spawns real processes with tokio. No timeout: the caller waits as long as the tool runs.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn execute(&self, argv: &[String]) -> Result<CommandResult> {
        let Some((program, args)) = argv.split_first() else {
            bail!("empty command");
        };
        let start = Instant::now();

        tracing::debug!("Executing: {} {:?}", program, args);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn {}", program))?;

        let stdout_handle = child.stdout.take().context("stdout not captured")?;
        let stderr_handle = child.stderr.take().context("stderr not captured")?;

        // Read both pipes while waiting so a chatty tool cannot stall on a full buffer
        let (stdout, stderr, status) = tokio::join!(
            read_pipe(stdout_handle),
            read_pipe(stderr_handle),
            child.wait()
        );

        let status = status.with_context(|| format!("Failed to wait for {}", program))?;
        let duration_ms = start.elapsed().as_millis();

        tracing::debug!("{} exited with {:?} after {}ms", program, status.code(), duration_ms);

        Ok(CommandResult {
            stdout: stdout?,
            stderr: stderr?,
            exit_code: status.code(),
            duration_ms,
        })
    }
}

// Tools echo page titles and banners verbatim, so output is not guaranteed UTF-8
async fn read_pipe<R>(mut reader: R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
