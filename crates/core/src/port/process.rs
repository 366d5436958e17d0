// Process Ports
// Spawning detached children, signalling them and probing the OS process list

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Process errors
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Signal failed: {0}")]
    Signal(String),

    #[error("Wait failed: {0}")]
    Wait(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

/// Owned handle to a spawned child process
///
/// The handle is the only way the supervisor observes the child: `wait`
/// resolves when the process exits and reaps it.
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS process id (None once the child has been reaped)
    fn pid(&self) -> Option<u32>;

    /// Ask the process to exit (SIGTERM / taskkill)
    fn terminate(&mut self) -> Result<(), ProcessError>;

    /// Force the process to exit immediately (SIGKILL / TerminateProcess)
    fn kill(&mut self) -> Result<(), ProcessError>;

    /// Non-blocking exit check; reaps the child if it has exited
    fn has_exited(&mut self) -> Result<bool, ProcessError>;

    /// Wait for the process to exit, returning its exit code if any
    async fn wait(&mut self) -> Result<Option<i32>, ProcessError>;
}

/// Process Spawner trait
///
/// Implementations:
/// - DetachedSpawner: tokio child in its own process group, stdio discarded
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Spawn `program` detached from the launcher
    ///
    /// # Errors
    /// - ProcessError::SpawnFailed if the OS refuses to start the program
    async fn spawn(
        &self,
        program: &Path,
        args: &[String],
    ) -> Result<Box<dyn ProcessHandle>, ProcessError>;
}

/// OS process list lookup, used to detect instances the launcher does not track
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    /// PIDs of running processes whose executable is `executable`
    async fn find_by_executable(&self, executable: &Path) -> Vec<u32>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::watch;

    /// Shared, ordered record of everything the mocks were asked to do
    pub type EventLog = Arc<Mutex<Vec<String>>>;

    pub fn event_log() -> EventLog {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn program_name(program: &Path) -> String {
        program
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Mock spawner; children are named after the program's file stem
    pub struct MockSpawner {
        events: EventLog,
        next_pid: AtomicU32,
        fail_spawn: AtomicBool,
        stubborn: Mutex<HashSet<String>>,
        exits: Mutex<HashMap<String, Arc<watch::Sender<bool>>>>,
    }

    impl MockSpawner {
        pub fn new(events: EventLog) -> Self {
            Self {
                events,
                next_pid: AtomicU32::new(1000),
                fail_spawn: AtomicBool::new(false),
                stubborn: Mutex::new(HashSet::new()),
                exits: Mutex::new(HashMap::new()),
            }
        }

        /// Children named `name` ignore the graceful signal
        pub fn ignore_terminate(&self, name: &str) {
            self.stubborn.lock().unwrap().insert(name.to_string());
        }

        pub fn fail_spawns(&self) {
            self.fail_spawn.store(true, Ordering::SeqCst);
        }

        /// Make the latest child named `name` exit on its own
        pub fn simulate_exit(&self, name: &str) {
            if let Some(exit) = self.exits.lock().unwrap().get(name) {
                exit.send_replace(true);
            }
        }

        pub fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProcessSpawner for MockSpawner {
        async fn spawn(
            &self,
            program: &Path,
            _args: &[String],
        ) -> Result<Box<dyn ProcessHandle>, ProcessError> {
            let name = program_name(program);
            if self.fail_spawn.load(Ordering::SeqCst) {
                return Err(ProcessError::SpawnFailed(format!("mock refused {}", name)));
            }

            self.events.lock().unwrap().push(format!("spawn:{}", name));

            let exit = Arc::new(watch::channel(false).0);
            self.exits
                .lock()
                .unwrap()
                .insert(name.clone(), Arc::clone(&exit));

            Ok(Box::new(MockHandle {
                stubborn: self.stubborn.lock().unwrap().contains(&name),
                name,
                pid: self.next_pid.fetch_add(1, Ordering::SeqCst),
                events: Arc::clone(&self.events),
                exit,
            }))
        }
    }

    /// Mock child process
    pub struct MockHandle {
        name: String,
        pid: u32,
        stubborn: bool,
        events: EventLog,
        exit: Arc<watch::Sender<bool>>,
    }

    impl MockHandle {
        fn record(&self, event: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("{}:{}", event, self.name));
        }
    }

    #[async_trait]
    impl ProcessHandle for MockHandle {
        fn pid(&self) -> Option<u32> {
            Some(self.pid)
        }

        fn terminate(&mut self) -> Result<(), ProcessError> {
            self.record("terminate");
            if !self.stubborn {
                self.exit.send_replace(true);
            }
            Ok(())
        }

        fn kill(&mut self) -> Result<(), ProcessError> {
            self.record("kill");
            self.exit.send_replace(true);
            Ok(())
        }

        fn has_exited(&mut self) -> Result<bool, ProcessError> {
            Ok(*self.exit.borrow())
        }

        async fn wait(&mut self) -> Result<Option<i32>, ProcessError> {
            let mut rx = self.exit.subscribe();
            rx.wait_for(|exited| *exited)
                .await
                .map_err(|e| ProcessError::Wait(e.to_string()))?;
            Ok(Some(0))
        }
    }

    /// Mock probe reporting a fixed set of untracked processes
    #[derive(Default)]
    pub struct MockProbe {
        running: Mutex<HashMap<PathBuf, u32>>,
    }

    impl MockProbe {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_running(self, executable: impl Into<PathBuf>, pid: u32) -> Self {
            self.running.lock().unwrap().insert(executable.into(), pid);
            self
        }
    }

    #[async_trait]
    impl ProcessProbe for MockProbe {
        async fn find_by_executable(&self, executable: &Path) -> Vec<u32> {
            self.running
                .lock()
                .unwrap()
                .get(executable)
                .copied()
                .into_iter()
                .collect()
        }
    }
}
