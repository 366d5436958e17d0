// Process Supervisor - owns the running process table

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{error, info, warn};

use super::constants::FORCED_KILL_WAIT;
use super::context::LauncherContext;
use crate::domain::{ComponentDescriptor, ComponentId, StopProcedure};
use crate::error::{LauncherError, Result};
use crate::port::{ControlPlane, ProcessHandle, ProcessProbe, ProcessSpawner};

/// How a stop request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    /// Nothing was tracked (or it had already exited)
    NotRunning,
    /// An instance the launcher did not start is running; it is left alone
    Untracked,
    /// Exited within its grace period
    Graceful,
    /// Grace period elapsed and the process was killed
    Forced,
}

/// Snapshot of a tracked child
#[derive(Debug, Clone, Serialize)]
pub struct RunningProcess {
    pub component: ComponentId,
    pub pid: Option<u32>,
    pub started_at: DateTime<Utc>,
}

struct TrackedProcess {
    handle: Box<dyn ProcessHandle>,
    started_at: DateTime<Utc>,
}

type Slot = Arc<Mutex<Option<TrackedProcess>>>;

/// One lock per component: start/stop of the same component serialize,
/// different components proceed independently.
pub struct RunningProcessTable {
    slots: HashMap<ComponentId, Slot>,
}

impl RunningProcessTable {
    pub fn new<'a>(components: impl IntoIterator<Item = &'a ComponentDescriptor>) -> Self {
        Self {
            slots: components
                .into_iter()
                .filter(|c| c.launchable)
                .map(|c| (c.id.clone(), Arc::new(Mutex::new(None))))
                .collect(),
        }
    }

    fn slot(&self, id: &ComponentId) -> Result<Slot> {
        self.slots
            .get(id)
            .cloned()
            .ok_or_else(|| LauncherError::NotLaunchable(id.clone()))
    }
}

/// Supervisor
pub struct Supervisor {
    context: Arc<LauncherContext>,
    table: RunningProcessTable,
    spawner: Arc<dyn ProcessSpawner>,
    probe: Arc<dyn ProcessProbe>,
    control_plane: Arc<dyn ControlPlane>,
}

impl Supervisor {
    pub fn new(
        context: Arc<LauncherContext>,
        spawner: Arc<dyn ProcessSpawner>,
        probe: Arc<dyn ProcessProbe>,
        control_plane: Arc<dyn ControlPlane>,
    ) -> Self {
        let table = RunningProcessTable::new(context.registry.components());
        Self {
            context,
            table,
            spawner,
            probe,
            control_plane,
        }
    }

    fn launchable(&self, name: &str) -> Result<&ComponentDescriptor> {
        let component = self.context.registry.component(name)?;
        if !component.launchable {
            return Err(LauncherError::NotLaunchable(component.id.clone()));
        }
        Ok(component)
    }

    /// Installed-executable check; says nothing about whether it is running
    pub async fn is_installed(&self, name: &str) -> Result<(bool, PathBuf)> {
        let component = self.context.registry.component(name)?;
        let path = self.context.executable_path(component)?;
        let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);
        Ok((exists, path))
    }

    /// Spawn a component detached and start tracking it
    ///
    /// # Errors
    /// - LauncherError::ExecutableNotFound if the component is not installed
    /// - LauncherError::AlreadyRunning if a live instance exists (tracked or not)
    /// - LauncherError::ProcessSpawnFailed if the OS refuses to start it
    pub async fn start(&self, name: &str) -> Result<u32> {
        let component = self.launchable(name)?;
        let path = self.context.executable_path(component)?;

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(LauncherError::ExecutableNotFound {
                component: component.id.clone(),
                path,
            });
        }

        let slot = self.table.slot(&component.id)?;
        let mut tracked = slot.lock().await;

        if let Some(existing) = tracked.as_mut() {
            match existing.handle.has_exited() {
                Ok(false) => {
                    return Err(LauncherError::AlreadyRunning {
                        component: component.id.clone(),
                        pid: existing.handle.pid().unwrap_or_default(),
                    });
                }
                Ok(true) => info!(component = %component.id, "Reaping exited process"),
                Err(e) => warn!(component = %component.id, error = %e, "Dropping unusable handle"),
            }
            *tracked = None;
        }

        if let Some(pid) = self.untracked_pid(&path).await {
            return Err(LauncherError::AlreadyRunning {
                component: component.id.clone(),
                pid,
            });
        }

        let handle = self
            .spawner
            .spawn(&path, &component.args)
            .await
            .map_err(|source| LauncherError::ProcessSpawnFailed {
                component: component.id.clone(),
                source,
            })?;

        let pid = handle.pid().unwrap_or_default();
        info!(component = %component.id, pid, path = %path.display(), "Process started");

        *tracked = Some(TrackedProcess {
            handle,
            started_at: Utc::now(),
        });
        Ok(pid)
    }

    /// Stop a component: control-plane stop, graceful signal, then forced
    /// kill once its grace period runs out. The table entry is always cleared.
    pub async fn stop(&self, name: &str) -> Result<StopOutcome> {
        let component = self.launchable(name)?;
        let slot = self.table.slot(&component.id)?;
        let mut tracked = slot.lock().await;

        let Some(mut process) = tracked.take() else {
            let path = self.context.executable_path(component)?;
            if let Some(pid) = self.untracked_pid(&path).await {
                warn!(
                    component = %component.id,
                    pid,
                    "Not stopping an instance this launcher did not start"
                );
                return Ok(StopOutcome::Untracked);
            }
            return Ok(StopOutcome::NotRunning);
        };

        self.terminate(component, process.handle.as_mut()).await
    }

    async fn terminate(
        &self,
        component: &ComponentDescriptor,
        handle: &mut dyn ProcessHandle,
    ) -> Result<StopOutcome> {
        if handle.has_exited().unwrap_or(false) {
            info!(component = %component.id, "Process had already exited");
            return Ok(StopOutcome::NotRunning);
        }

        let pid = handle.pid();
        info!(component = %component.id, pid = ?pid, "Stopping");

        if let StopProcedure::JsonRpcStop(endpoint) = &component.stop {
            if let Err(e) = self.control_plane.request_stop(endpoint).await {
                warn!(
                    component = %component.id,
                    error = %e,
                    "Control-plane stop failed, falling back to signals"
                );
            }
        }

        if let Err(e) = handle.terminate() {
            warn!(component = %component.id, error = %e, "Graceful signal failed");
        }

        match timeout(component.grace_period, handle.wait()).await {
            Ok(Ok(code)) => {
                info!(component = %component.id, exit_code = ?code, "Stopped gracefully");
                Ok(StopOutcome::Graceful)
            }
            Ok(Err(e)) => Err(e.into()),
            Err(_) => {
                let overdue = LauncherError::ShutdownTimeout {
                    component: component.id.clone(),
                    grace: component.grace_period,
                };
                warn!(error = %overdue, "Force killing");

                handle.kill()?;
                if timeout(FORCED_KILL_WAIT, handle.wait()).await.is_err() {
                    error!(component = %component.id, pid = ?pid, "Process survived forced kill");
                }
                Ok(StopOutcome::Forced)
            }
        }
    }

    /// Stop everything in the fixed dependency order (dependents first)
    ///
    /// Idempotent: components that are not running are skipped.
    pub async fn shutdown_all(&self) -> Vec<(ComponentId, StopOutcome)> {
        info!("Shutting down all components");

        let mut stopped = Vec::new();
        for component in self.context.registry.shutdown_order() {
            match self.stop(component.id.as_str()).await {
                Ok(StopOutcome::NotRunning | StopOutcome::Untracked) => {}
                Ok(outcome) => stopped.push((component.id.clone(), outcome)),
                Err(e) => error!(component = %component.id, error = %e, "Error during shutdown"),
            }
        }
        stopped
    }

    /// Drop table entries whose process has exited. Busy slots are skipped.
    pub fn reap_exited(&self) -> Vec<ComponentId> {
        let mut reaped = Vec::new();
        for (id, slot) in &self.table.slots {
            let Ok(mut tracked) = slot.try_lock() else {
                continue;
            };
            let exited = match tracked.as_mut() {
                Some(process) => process.handle.has_exited().unwrap_or(true),
                None => false,
            };
            if exited {
                info!(component = %id, "Process exited, removing from table");
                *tracked = None;
                reaped.push(id.clone());
            }
        }
        reaped
    }

    /// Tracked live processes
    pub fn running(&self) -> Vec<RunningProcess> {
        self.reap_exited();

        let mut running: Vec<RunningProcess> = self
            .table
            .slots
            .iter()
            .filter_map(|(id, slot)| {
                let tracked = slot.try_lock().ok()?;
                tracked.as_ref().map(|process| RunningProcess {
                    component: id.clone(),
                    pid: process.handle.pid(),
                    started_at: process.started_at,
                })
            })
            .collect();
        running.sort_by(|a, b| a.component.cmp(&b.component));
        running
    }

    /// Whether any member of `family` is running, tracked or not
    pub async fn family_running(&self, family: &str) -> Result<bool> {
        self.reap_exited();

        for component in self.context.registry.family_members(family)? {
            if let Ok(slot) = self.table.slot(&component.id) {
                let idle = matches!(slot.try_lock(), Ok(tracked) if tracked.is_none());
                // Busy slots are mid start/stop; treat as running
                if !idle {
                    return Ok(true);
                }
            }
            let path = self.context.executable_path(component)?;
            if self.untracked_pid(&path).await.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// First OS process running `path` that the table does not own
    async fn untracked_pid(&self, path: &Path) -> Option<u32> {
        self.probe.find_by_executable(path).await.into_iter().next()
    }
}
