// Detached process spawner
// reason: tokio::process for async wait, nix for POSIX signals
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info};

#[cfg(unix)]
use cusf_core::application::layout::ensure_executable;
use cusf_core::port::{ProcessError, ProcessHandle, ProcessSpawner};

/// Spawns components in their own process group with stdio discarded, so
/// they neither share the launcher's terminal nor receive its Ctrl-C.
#[derive(Debug, Default, Clone)]
pub struct DetachedSpawner;

impl DetachedSpawner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessSpawner for DetachedSpawner {
    async fn spawn(
        &self,
        program: &Path,
        args: &[String],
    ) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        #[cfg(unix)]
        if let Err(e) = ensure_executable(program) {
            debug!(program = %program.display(), error = %e, "Could not set executable bit");
        }

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(false);

        if let Some(dir) = program.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        #[cfg(unix)]
        cmd.process_group(0);

        #[cfg(windows)]
        {
            const DETACHED_PROCESS: u32 = 0x0000_0008;
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
            cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
        }

        let child = cmd
            .spawn()
            .map_err(|e| ProcessError::SpawnFailed(format!("{}: {}", program.display(), e)))?;

        info!(program = %program.display(), pid = ?child.id(), "Spawned detached process");
        Ok(Box::new(ChildProcess::new(child)))
    }
}

/// Handle to a child spawned by [`DetachedSpawner`]
pub struct ChildProcess {
    child: Child,
    pid: Option<u32>,
}

impl ChildProcess {
    pub fn new(child: Child) -> Self {
        let pid = child.id();
        Self { child, pid }
    }
}

#[async_trait]
impl ProcessHandle for ChildProcess {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn terminate(&mut self) -> Result<(), ProcessError> {
        let Some(pid) = self.pid else {
            return Ok(());
        };

        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            debug!(pid, "Sending SIGTERM");
            match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                Ok(()) | Err(Errno::ESRCH) => Ok(()),
                Err(e) => Err(ProcessError::Signal(format!("SIGTERM failed: {}", e))),
            }
        }

        #[cfg(windows)]
        {
            // Without /F taskkill asks the process to close
            debug!(pid, "Requesting close via taskkill");
            std::process::Command::new("taskkill")
                .args(["/PID", &pid.to_string()])
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|_| ())
                .map_err(|e| ProcessError::Signal(e.to_string()))
        }
    }

    fn kill(&mut self) -> Result<(), ProcessError> {
        debug!(pid = ?self.pid, "Force killing");
        match self.child.start_kill() {
            Ok(()) => Ok(()),
            // Already reaped
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(ProcessError::Signal(format!("kill failed: {}", e))),
        }
    }

    fn has_exited(&mut self) -> Result<bool, ProcessError> {
        self.child
            .try_wait()
            .map(|status| status.is_some())
            .map_err(|e| ProcessError::Wait(e.to_string()))
    }

    async fn wait(&mut self) -> Result<Option<i32>, ProcessError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| ProcessError::Wait(e.to_string()))?;
        Ok(status.code())
    }
}
