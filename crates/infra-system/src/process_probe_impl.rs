// Process probe implementation
// reason: sysinfo for cross-platform process table access; the scan runs on
// the blocking pool since it touches every process in /proc
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use sysinfo::System;
use tracing::{debug, warn};

use cusf_core::port::ProcessProbe;

/// Finds running processes by executable path using sysinfo
pub struct SysinfoProbe {
    system: Arc<Mutex<System>>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            system: Arc::new(Mutex::new(System::new())),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn scan(system: &Mutex<System>, executable: &Path) -> Vec<u32> {
    let Ok(mut sys) = system.lock() else {
        warn!("Process probe lock poisoned");
        return Vec::new();
    };
    sys.refresh_processes();

    let wanted = normalize(executable);
    sys.processes()
        .iter()
        .filter(|(_, process)| process.exe().is_some_and(|exe| normalize(exe) == wanted))
        .map(|(pid, _)| pid.as_u32())
        .collect()
}

#[async_trait]
impl ProcessProbe for SysinfoProbe {
    async fn find_by_executable(&self, executable: &Path) -> Vec<u32> {
        let system = Arc::clone(&self.system);
        let target = executable.to_path_buf();

        match tokio::task::spawn_blocking(move || scan(&system, &target)).await {
            Ok(pids) => {
                debug!(executable = %executable.display(), found = pids.len(), "Process probe");
                pids
            }
            Err(e) => {
                warn!(error = %e, "Process probe task failed");
                Vec::new()
            }
        }
    }
}
