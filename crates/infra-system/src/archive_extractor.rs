// Archive extractor
// reason: zip crate for .zip; the system `tar` for .tar.gz so that symlinks
// and permission bits come out exactly as the release packaging intended
use async_trait::async_trait;
use std::fs::File;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use cusf_core::domain::ArchiveFormat;
use cusf_core::port::{ArchiveExtractor, ExtractError};

#[derive(Debug, Default, Clone)]
pub struct SystemExtractor;

impl SystemExtractor {
    pub fn new() -> Self {
        Self
    }

    async fn extract_zip(archive: &Path, target_dir: &Path) -> Result<(), ExtractError> {
        let archive = archive.to_path_buf();
        let target_dir = target_dir.to_path_buf();

        tokio::task::spawn_blocking(move || unzip(&archive, &target_dir))
            .await
            .map_err(|e| ExtractError::Archive(format!("extraction task failed: {}", e)))?
    }

    async fn extract_tar_gz(archive: &Path, target_dir: &Path) -> Result<(), ExtractError> {
        let output = Command::new("tar")
            .arg("-xzf")
            .arg(archive)
            .arg("-C")
            .arg(target_dir)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ExtractError::Tool {
                tool: "tar".to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

fn unzip(archive: &Path, target_dir: &Path) -> Result<(), ExtractError> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| ExtractError::Archive(e.to_string()))?;
    debug!(archive = %archive.display(), entries = zip.len(), "Unzipping");
    zip.extract(target_dir)
        .map_err(|e| ExtractError::Archive(e.to_string()))
}

#[async_trait]
impl ArchiveExtractor for SystemExtractor {
    async fn extract(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        target_dir: &Path,
    ) -> Result<(), ExtractError> {
        tokio::fs::create_dir_all(target_dir).await?;

        match format {
            ArchiveFormat::Zip => Self::extract_zip(archive, target_dir).await,
            ArchiveFormat::TarGz => Self::extract_tar_gz(archive, target_dir).await,
        }
    }
}
