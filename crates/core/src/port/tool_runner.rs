// Tool Runner Port
// Run-to-completion execution of helper binaries (e.g. grpcurl)

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use super::process::ProcessError;

/// Captured result of a tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Tool Runner trait
///
/// Implementations:
/// - SubprocessRunner: tokio child with piped output and a deadline
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run `program` to completion, killing it after `timeout`
    ///
    /// # Errors
    /// - ProcessError::SpawnFailed if the tool cannot be started
    /// - ProcessError::Timeout if it runs past the deadline
    async fn run(
        &self,
        program: &Path,
        args: &[String],
        timeout: Duration,
    ) -> Result<ToolOutput, ProcessError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Returns a canned output and records invocations
    pub struct MockToolRunner {
        output: ToolOutput,
        calls: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl MockToolRunner {
        pub fn new(output: ToolOutput) -> Self {
            Self {
                output,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn succeeding(stdout: &str) -> Self {
            Self::new(ToolOutput {
                exit_code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            })
        }

        pub fn failing(stderr: &str) -> Self {
            Self::new(ToolOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: stderr.to_string(),
            })
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ToolRunner for MockToolRunner {
        async fn run(
            &self,
            _program: &Path,
            args: &[String],
            _timeout: Duration,
        ) -> Result<ToolOutput, ProcessError> {
            self.calls.lock().unwrap().push(args.to_vec());
            Ok(self.output.clone())
        }
    }
}
