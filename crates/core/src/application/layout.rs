// Filesystem Layout Manager
// All launcher paths derive from (host OS, home directory)

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::constants::{APP_NAME, LEGACY_APP_NAMES};
use super::registry::Registry;
use crate::domain::{ComponentFamily, HostOs};
use crate::error::Result;

/// Read-only directory layout, computed once at startup
#[derive(Debug, Clone)]
pub struct DataLayout {
    data_root: PathBuf,
    base_dir: PathBuf,
    node_config_dir: PathBuf,
}

impl DataLayout {
    /// OS data root (`AppData/Roaming`, `Library/Application Support`, `.local/share`)
    pub fn data_root(os: HostOs, home: &Path) -> PathBuf {
        match os {
            HostOs::Windows => home.join("AppData").join("Roaming"),
            HostOs::MacOs => home.join("Library").join("Application Support"),
            HostOs::Linux => home.join(".local").join("share"),
        }
    }

    /// Well-known directory the L1 node reads `bitcoin.conf` from
    pub fn default_node_config_dir(os: HostOs, home: &Path) -> PathBuf {
        match os {
            HostOs::Windows | HostOs::MacOs => Self::data_root(os, home).join("Bitcoin"),
            HostOs::Linux => home.join(".bitcoin"),
        }
    }

    /// Standard layout for `os` under `home`
    pub fn for_host(os: HostOs, home: &Path) -> Self {
        let data_root = Self::data_root(os, home);
        Self {
            base_dir: data_root.join(APP_NAME),
            node_config_dir: Self::default_node_config_dir(os, home),
            data_root,
        }
    }

    /// Replace the base directory (configuration override)
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Replace the node configuration directory (configuration override)
    pub fn with_node_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.node_config_dir = dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn node_config_dir(&self) -> &Path {
        &self.node_config_dir
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.base_dir.join("downloads")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }

    pub fn family_dir(&self, family: &ComponentFamily) -> PathBuf {
        self.downloads_dir().join(&family.subdir)
    }

    /// Create every family directory; existing directories are fine
    pub async fn ensure_all(&self, registry: &Registry) -> Result<()> {
        for family in registry.families() {
            tokio::fs::create_dir_all(self.family_dir(family)).await?;
        }
        info!(base_dir = %self.base_dir.display(), "Directories created/verified");
        Ok(())
    }

    /// Legacy application directories under the same data root
    pub fn legacy_dirs(&self) -> Vec<PathBuf> {
        LEGACY_APP_NAMES
            .iter()
            .map(|legacy| self.data_root.join(legacy))
            .filter(|path| *path != self.base_dir)
            .collect()
    }

    /// Full reset: everything under the base directory except the logs
    /// directory (the file appender keeps writing there), then every legacy
    /// directory. Returns the paths that existed.
    pub async fn reset(&self) -> Result<Vec<PathBuf>> {
        let logs = self.logs_dir();
        let mut removed = Vec::new();

        match tokio::fs::read_dir(&self.base_dir).await {
            Ok(mut entries) => {
                let mut paths = Vec::new();
                while let Some(entry) = entries.next_entry().await? {
                    paths.push(entry.path());
                }
                paths.sort();

                for path in paths.into_iter().filter(|p| *p != logs) {
                    if tokio::fs::metadata(&path).await?.is_dir() {
                        remove_dir(&path).await?;
                    } else {
                        tokio::fs::remove_file(&path).await?;
                    }
                    removed.push(path);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        for legacy in self.legacy_dirs() {
            if remove_dir(&legacy).await? {
                removed.push(legacy);
            }
        }
        Ok(removed)
    }
}

/// Recursively remove `path`
///
/// Returns `false` when there was nothing to remove; a missing directory is
/// not an error.
pub async fn remove_dir(path: &Path) -> Result<bool> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => {
            info!(path = %path.display(), "Removed directory");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Nothing to remove");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

/// Set the executable bits on `path` (no-op on Windows)
pub fn ensure_executable(path: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let mut perms = std::fs::metadata(path)?.permissions();
        if perms.mode() & 0o111 != 0o111 {
            perms.set_mode(perms.mode() | 0o755);
            std::fs::set_permissions(path, perms)?;
        }
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}
