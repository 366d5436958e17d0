// Central Error Type for the Launcher

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::domain::ComponentId;
use crate::port::{ControlPlaneError, ExtractError, ProcessError};

/// Launcher-level error type
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{component} executable not found at {}", .path.display())]
    ExecutableNotFound { component: ComponentId, path: PathBuf },

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Unknown component family: {0}")]
    UnknownFamily(String),

    #[error("{0} is a tool and cannot be launched")]
    NotLaunchable(ComponentId),

    #[error("Unsupported archive type: {0}")]
    UnsupportedArchive(String),

    #[error("Failed to download {url} after {attempts} attempt(s): {reason}")]
    DownloadFailed {
        url: String,
        attempts: u32,
        reason: String,
    },

    #[error("Downloaded file {} is empty", .0.display())]
    EmptyArtifact(PathBuf),

    #[error("Extraction of {} failed: {source}", .archive.display())]
    ExtractionFailed {
        archive: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("Failed to start {component}: {source}")]
    ProcessSpawnFailed {
        component: ComponentId,
        #[source]
        source: ProcessError,
    },

    #[error("{component} is already running (pid {pid})")]
    AlreadyRunning { component: ComponentId, pid: u32 },

    #[error("{component} did not exit within {grace:?}")]
    ShutdownTimeout {
        component: ComponentId,
        grace: Duration,
    },

    #[error("{tool} failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    #[error("Control plane error: {0}")]
    ControlPlane(#[from] ControlPlaneError),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using LauncherError
pub type Result<T> = std::result::Result<T, LauncherError>;
