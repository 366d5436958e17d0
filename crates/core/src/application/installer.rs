// Archive Installer - download, verify and extract component families

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use super::context::LauncherContext;
use super::downloader::{DownloadJob, Downloader};
use super::layout::{ensure_executable, remove_dir};
use super::node_config::write_node_config;
use crate::domain::{ArchiveFormat, PostInstall};
use crate::error::{LauncherError, Result};
use crate::port::ArchiveExtractor;

/// Outcome of a family-wide operation
#[derive(Debug, Clone, Serialize)]
pub struct FamilyReport {
    pub family: String,
    pub path: PathBuf,
    pub artifacts: Vec<PathBuf>,
}

/// Installer
pub struct Installer {
    context: Arc<LauncherContext>,
    downloader: Downloader,
    extractor: Arc<dyn ArchiveExtractor>,
}

impl Installer {
    pub fn new(
        context: Arc<LauncherContext>,
        downloader: Downloader,
        extractor: Arc<dyn ArchiveExtractor>,
    ) -> Self {
        Self {
            context,
            downloader,
            extractor,
        }
    }

    /// One download job per family member, in registration order
    pub fn download_jobs(&self, family: &str) -> Result<Vec<DownloadJob>> {
        self.context
            .registry
            .family_members(family)?
            .into_iter()
            .map(|component| -> Result<DownloadJob> {
                let resolved = self.context.resolve(component)?;
                let destination = self.context.archive_path(component)?;
                Ok(self
                    .downloader
                    .job(resolved.download_url, destination, resolved.archive_format))
            })
            .collect()
    }

    /// Download and verify every artifact of a family
    pub async fn download_family(&self, family: &str) -> Result<FamilyReport> {
        let dir = self.context.family_dir(family)?;
        tokio::fs::create_dir_all(&dir).await?;

        let jobs = self.download_jobs(family)?;
        let artifacts: Vec<PathBuf> = jobs.iter().map(|j| j.destination.clone()).collect();

        info!(family = %family, count = jobs.len(), "Downloading family artifacts");
        self.downloader.fetch_all(jobs).await?;

        Ok(FamilyReport {
            family: family.to_string(),
            path: dir,
            artifacts,
        })
    }

    /// Extract one archive into `target_dir`
    ///
    /// # Errors
    /// - LauncherError::NotFound if the archive is missing
    /// - LauncherError::ExtractionFailed if the extraction strategy fails
    pub async fn install(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        target_dir: &Path,
    ) -> Result<()> {
        if !tokio::fs::try_exists(archive).await.unwrap_or(false) {
            return Err(LauncherError::NotFound(archive.to_path_buf()));
        }

        info!(
            archive = %archive.display(),
            format = ?format,
            target = %target_dir.display(),
            "Extracting"
        );

        self.extractor
            .extract(archive, format, target_dir)
            .await
            .map_err(|source| LauncherError::ExtractionFailed {
                archive: archive.to_path_buf(),
                source,
            })
    }

    /// Extract every member of a family and run its post-install steps
    pub async fn extract_family(&self, family: &str) -> Result<FamilyReport> {
        let dir = self.context.family_dir(family)?;
        let mut artifacts = Vec::new();

        for component in self.context.registry.family_members(family)? {
            let resolved = self.context.resolve(component)?;
            let archive = self.context.archive_path(component)?;
            self.install(&archive, resolved.archive_format, &dir).await?;

            if component.has_post_install(PostInstall::MarkExecutable) && !self.context.os.is_windows()
            {
                let executable = self.context.executable_path(component)?;
                if tokio::fs::try_exists(&executable).await.unwrap_or(false) {
                    ensure_executable(&executable)?;
                }
            }
            if component.has_post_install(PostInstall::WriteNodeConfig) {
                write_node_config(self.context.layout.node_config_dir()).await?;
            }

            artifacts.push(archive);
        }

        info!(family = %family, path = %dir.display(), "Extraction complete");
        Ok(FamilyReport {
            family: family.to_string(),
            path: dir,
            artifacts,
        })
    }

    /// Remove the family's directory tree; a missing directory is not an error
    pub async fn delete_family(&self, family: &str) -> Result<PathBuf> {
        let dir = self.context.family_dir(family)?;
        remove_dir(&dir).await?;
        Ok(dir)
    }
}
