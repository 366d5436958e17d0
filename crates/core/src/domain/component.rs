// Component Domain Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::archive::ArchiveFormat;
use super::host::{HostOs, PerOs};
use crate::error::{LauncherError, Result};

/// Component identifier (short name used in routes, e.g. "bitcoind")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Install unit: all members of a family are downloaded into, and extracted
/// within, the same directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentFamily {
    /// Route key (`/download-<key>`)
    pub key: String,
    /// Directory name under `downloads/`
    pub subdir: String,
}

impl ComponentFamily {
    pub fn new(key: impl Into<String>, subdir: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            subdir: subdir.into(),
        }
    }
}

/// JSON-RPC control-plane endpoint of a component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcEndpoint {
    pub url: String,
    pub user: String,
    pub password: String,
}

/// How a component is asked to stop before signals are sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopProcedure {
    /// Termination signal only
    Signal,
    /// JSON-RPC `stop` call first, then the termination signal
    JsonRpcStop(RpcEndpoint),
}

/// Steps run after a component's archive has been extracted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostInstall {
    /// chmod 0755 on the installed executable (no-op on Windows)
    MarkExecutable,
    /// Write the node configuration file into its well-known directory
    WriteNodeConfig,
}

/// Immutable description of an external program the launcher manages
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    pub id: ComponentId,
    pub display_name: String,
    /// Key of the family this component is installed with
    pub family: String,
    pub download_url: PerOs<String>,
    pub archive_filename: PerOs<String>,
    /// Executable path relative to the family directory
    pub executable: PerOs<String>,
    pub args: Vec<String>,
    /// Tools (e.g. grpcurl) are installed but never supervised
    pub launchable: bool,
    pub stop: StopProcedure,
    pub grace_period: Duration,
    /// Lower ranks are stopped first during a full shutdown
    pub shutdown_rank: u8,
    pub post_install: Vec<PostInstall>,
}

/// A descriptor with every per-OS value picked for one host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedComponent {
    pub id: ComponentId,
    pub download_url: String,
    pub archive_filename: String,
    pub archive_format: ArchiveFormat,
    pub executable: PathBuf,
}

impl ComponentDescriptor {
    /// Resolve the platform-specific fields for `os`
    ///
    /// # Errors
    /// - `LauncherError::UnsupportedArchive` if the archive filename has no known format
    pub fn resolve(&self, os: HostOs) -> Result<ResolvedComponent> {
        let archive_filename = self.archive_filename.get(os).clone();
        let archive_format = ArchiveFormat::from_filename(&archive_filename)
            .ok_or_else(|| LauncherError::UnsupportedArchive(archive_filename.clone()))?;

        Ok(ResolvedComponent {
            id: self.id.clone(),
            download_url: self.download_url.get(os).clone(),
            archive_filename,
            archive_format,
            executable: PathBuf::from(self.executable.get(os)),
        })
    }

    pub fn has_post_install(&self, step: PostInstall) -> bool {
        self.post_install.contains(&step)
    }
}
