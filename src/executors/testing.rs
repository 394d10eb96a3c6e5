//! Scripted executor for driving stages without spawning processes.

use super::command::{CommandExecutor, CommandResult};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedExecutor {
    responses: HashMap<String, CommandResult>,
    spawn_errors: Vec<String>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl ScriptedExecutor {
    /// Every tool succeeds with empty output unless scripted otherwise.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(mut self, tool: &str, stdout: &str) -> Self {
        self.responses.insert(
            tool.to_string(),
            CommandResult {
                stdout: stdout.to_string(),
                exit_code: Some(0),
                ..CommandResult::default()
            },
        );
        self
    }

    pub fn fail(mut self, tool: &str, code: i32, stderr: &str) -> Self {
        self.responses.insert(
            tool.to_string(),
            CommandResult {
                stderr: stderr.to_string(),
                exit_code: Some(code),
                ..CommandResult::default()
            },
        );
        self
    }

    pub fn unspawnable(mut self, tool: &str) -> Self {
        self.spawn_errors.push(tool.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Tool names in invocation order.
    pub fn tools_run(&self) -> Vec<String> {
        self.calls().iter().map(|argv| tool_name(&argv[0])).collect()
    }
}

fn tool_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, argv: &[String]) -> Result<CommandResult> {
        self.calls.lock().unwrap().push(argv.to_vec());
        let tool = tool_name(&argv[0]);

        if self.spawn_errors.contains(&tool) {
            bail!("Failed to spawn {}", tool);
        }

        Ok(self.responses.get(&tool).cloned().unwrap_or(CommandResult {
            exit_code: Some(0),
            ..CommandResult::default()
        }))
    }
}
