// Host identity and per-OS values

use serde::Serialize;

/// Operating system family the launcher is running on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    Windows,
    MacOs,
    Linux,
}

impl HostOs {
    /// Detect the host OS at compile time. Anything that is not Windows or
    /// macOS is treated as Linux.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            HostOs::Windows
        } else if cfg!(target_os = "macos") {
            HostOs::MacOs
        } else {
            HostOs::Linux
        }
    }

    pub fn is_windows(self) -> bool {
        matches!(self, HostOs::Windows)
    }
}

/// A value that differs per host OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerOs<T> {
    pub windows: T,
    pub macos: T,
    pub linux: T,
}

impl<T> PerOs<T> {
    pub fn new(windows: T, macos: T, linux: T) -> Self {
        Self {
            windows,
            macos,
            linux,
        }
    }

    pub fn get(&self, os: HostOs) -> &T {
        match os {
            HostOs::Windows => &self.windows,
            HostOs::MacOs => &self.macos,
            HostOs::Linux => &self.linux,
        }
    }
}

impl<T: Clone> PerOs<T> {
    /// Same value on every OS
    pub fn uniform(value: T) -> Self {
        Self {
            windows: value.clone(),
            macos: value.clone(),
            linux: value,
        }
    }
}

impl PerOs<String> {
    /// Build from string slices (registry tables are written as literals)
    pub fn from_strs(windows: &str, macos: &str, linux: &str) -> Self {
        Self::new(windows.to_string(), macos.to_string(), linux.to_string())
    }
}
