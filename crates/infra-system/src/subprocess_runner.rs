// Subprocess runner
// Run-to-completion helper tools with captured output and a deadline
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::info;

use cusf_core::port::{ProcessError, ToolOutput, ToolRunner};

#[derive(Debug, Default, Clone)]
pub struct SubprocessRunner;

impl SubprocessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Spawn child process and wait for output
    async fn spawn_and_wait(
        &self,
        program: &Path,
        args: &[String],
        deadline: Duration,
    ) -> Result<std::process::Output, ProcessError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropped on timeout, which kills it
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed(format!("{}: {}", program.display(), e)))?;

        match timeout(deadline, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(ProcessError::Wait(e.to_string())),
            Err(_) => Err(ProcessError::Timeout(deadline)),
        }
    }
}

#[async_trait]
impl ToolRunner for SubprocessRunner {
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<ToolOutput, ProcessError> {
        info!(program = %program.display(), args = ?args, "Running tool");

        let output = self.spawn_and_wait(program, args, timeout).await?;
        let result = ToolOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        info!(program = %program.display(), exit_code = ?result.exit_code, "Tool finished");
        Ok(result)
    }
}
