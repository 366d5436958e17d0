//! Daemon settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional TOML
//! file, then `CUSF_*` environment variables (`__` separates nested keys,
//! e.g. `CUSF_HTTP__PORT=3001`).

use config::{Config, ConfigError, Environment, File, FileFormat};
use cusf_api_http::HttpServerConfig;
use cusf_core::application::constants::{
    APP_NAME, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_REDIRECTS, DEFAULT_RETRY_BACKOFF, REAP_INTERVAL,
};
use cusf_core::application::{DataLayout, DownloadPolicy};
use cusf_core::domain::HostOs;
use cusf_infra_net::TransportConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "launcher.toml";
const UI_DIRNAME: &str = "ui";

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSection {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DownloadSection {
    pub max_attempts: u32,
    pub backoff_ms: u64,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_redirects: usize,
    pub parallelism: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LauncherConfig {
    pub http: HttpSection,
    pub download: DownloadSection,
    /// Overrides the OS-specific base directory
    pub data_dir: Option<String>,
    /// Overrides the node configuration directory
    pub node_config_dir: Option<String>,
    /// Directory holding the UI entry document (default: `ui/` next to the binary)
    pub ui_dir: Option<String>,
    pub reap_interval_secs: u64,
}

/// `<config dir>/cusf_launcher/launcher.toml`
pub fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.config_dir().join(APP_NAME).join(CONFIG_FILENAME))
}

/// `ui/` beside the running executable
pub fn default_ui_dir() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    exe.parent().map(|dir| dir.join(UI_DIRNAME))
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl LauncherConfig {
    /// Load defaults, then `file` (if it exists), then the environment
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("http.host", "127.0.0.1")?
            .set_default("http.port", 3000)?
            .set_default("download.max_attempts", DEFAULT_MAX_ATTEMPTS as i64)?
            .set_default("download.backoff_ms", DEFAULT_RETRY_BACKOFF.as_millis() as i64)?
            .set_default("download.connect_timeout_secs", 15)?
            .set_default("download.idle_timeout_secs", 60)?
            .set_default("download.max_redirects", DEFAULT_MAX_REDIRECTS as i64)?
            .set_default("download.parallelism", 1)?
            .set_default("reap_interval_secs", REAP_INTERVAL.as_secs() as i64)?;

        if let Some(path) = file {
            builder = builder.add_source(
                File::new(&path.to_string_lossy(), FileFormat::Toml).required(false),
            );
        }

        builder
            .add_source(
                Environment::with_prefix("CUSF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Directory layout with configured overrides applied
    pub fn layout(&self, os: HostOs, home: &Path) -> DataLayout {
        let mut layout = DataLayout::for_host(os, home);
        if let Some(dir) = &self.data_dir {
            layout = layout.with_base_dir(expand(dir));
        }
        if let Some(dir) = &self.node_config_dir {
            layout = layout.with_node_config_dir(expand(dir));
        }
        layout
    }

    pub fn ui_dir(&self) -> Option<PathBuf> {
        match self.ui_dir.as_deref() {
            Some(dir) => Some(expand(dir)),
            None => default_ui_dir(),
        }
    }

    pub fn http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.http.host.clone(),
            port: self.http.port,
        }
    }

    pub fn download_policy(&self) -> DownloadPolicy {
        DownloadPolicy {
            max_attempts: self.download.max_attempts,
            backoff: Duration::from_millis(self.download.backoff_ms),
            parallelism: self.download.parallelism,
        }
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: Duration::from_secs(self.download.connect_timeout_secs),
            idle_timeout: Duration::from_secs(self.download.idle_timeout_secs),
            max_redirects: self.download.max_redirects,
        }
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs.max(1))
    }
}
