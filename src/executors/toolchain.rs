use crate::config::ToolsConfig;
use crate::core::errors::ReconError;
use crate::core::models::StageKind;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use which::which;

/// Maps a tool command to an executable path.
pub trait ToolLocator {
    fn locate(&self, command: &str) -> Option<PathBuf>;
}

/// Looks in the Go install locations first, then `PATH`.
#[derive(Debug, Default)]
pub struct SystemLocator {
    offline: bool,
}

impl SystemLocator {
    /// Locator that never spawns a process: no `go env GOBIN` lookup and no
    /// `-version` check on httpx candidates.
    pub fn offline() -> Self {
        Self { offline: true }
    }

    fn candidates(&self, command: &str) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if !self.offline {
            if let Some(gobin) = go_env_gobin() {
                dirs.push(gobin);
            }
        }
        if let Some(base) = directories::BaseDirs::new() {
            dirs.push(base.home_dir().join("go").join("bin"));
        }
        dirs.push(PathBuf::from("/usr/local/bin"));
        dirs.push(PathBuf::from("/usr/bin"));

        let mut candidates: Vec<PathBuf> = dirs.into_iter().map(|d| d.join(command)).collect();
        if let Ok(found) = which(command) {
            candidates.push(found);
        }
        candidates
    }

    /// First existing candidate, except that an httpx answering `-version`
    /// wins over one that does not. A wrong httpx is still returned so the
    /// probe stage can report the conflict.
    fn choose(&self, command: &str, candidates: Vec<PathBuf>) -> Option<PathBuf> {
        let existing: Vec<PathBuf> = candidates.into_iter().filter(|path| path.is_file()).collect();

        if command == "httpx" && !self.offline {
            if let Some(path) = existing.iter().find(|path| answers_version(path)) {
                return Some(path.clone());
            }
            if let Some(path) = existing.first() {
                tracing::warn!("No httpx candidate answers -version, falling back to {:?}", path);
            }
        }

        existing.into_iter().next()
    }
}

impl ToolLocator for SystemLocator {
    fn locate(&self, command: &str) -> Option<PathBuf> {
        // Explicit paths from the config are taken as-is
        if command.contains(std::path::MAIN_SEPARATOR) {
            let path = PathBuf::from(command);
            return path.is_file().then_some(path);
        }

        self.choose(command, self.candidates(command))
    }
}

fn go_env_gobin() -> Option<PathBuf> {
    let output = Command::new("go")
        .args(["env", "GOBIN"])
        .stderr(Stdio::null())
        .output()
        .ok()?;
    let gobin = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!gobin.is_empty()).then(|| PathBuf::from(gobin))
}

// The Python httpx client installs a binary of the same name that rejects -version
fn answers_version(path: &Path) -> bool {
    Command::new(path)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Resolved executable for every stage.
#[derive(Debug, Clone)]
pub struct Toolchain {
    paths: HashMap<StageKind, PathBuf>,
}

impl Toolchain {
    pub fn path(&self, stage: StageKind) -> &Path {
        // Construction guarantees an entry per stage
        &self.paths[&stage]
    }
}

pub fn resolve_toolchain(locator: &dyn ToolLocator, tools: &ToolsConfig) -> Result<Toolchain, ReconError> {
    let mut paths = HashMap::new();
    let mut missing = Vec::new();

    for stage in StageKind::ALL {
        let command = tools.command(stage);
        match locator.locate(command) {
            Some(path) => {
                tracing::debug!("Found {}: {:?}", command, path);
                paths.insert(stage, path);
            }
            None => missing.push(command.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(ReconError::MissingTools(missing));
    }

    tracing::info!("All required tools found");
    Ok(Toolchain { paths })
}
