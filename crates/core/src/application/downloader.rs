// Downloader - bounded retry with fixed backoff over a DownloadTransport

use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BACKOFF};
use crate::domain::ArchiveFormat;
use crate::error::{LauncherError, Result};
use crate::port::DownloadTransport;

/// Retry and batching policy
#[derive(Debug, Clone)]
pub struct DownloadPolicy {
    /// Attempts per URL (values below 1 are treated as 1)
    pub max_attempts: u32,
    /// Fixed delay between attempts
    pub backoff: Duration,
    /// Downloads of one batch running at the same time (1 = sequential)
    pub parallelism: usize,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_RETRY_BACKOFF,
            parallelism: 1,
        }
    }
}

/// One download, alive only for the duration of a fetch
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: String,
    pub destination: PathBuf,
    pub format: ArchiveFormat,
    pub attempts_remaining: u32,
}

/// Removes the file it guards on drop unless kept.
///
/// Covers both failed attempts and futures dropped mid-transfer when a batch
/// is aborted.
struct PartialFile<'a> {
    path: &'a Path,
    keep: bool,
}

impl<'a> PartialFile<'a> {
    fn new(path: &'a Path) -> Self {
        Self { path, keep: false }
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_file(self.path);
        }
    }
}

/// Downloader
pub struct Downloader {
    transport: Arc<dyn DownloadTransport>,
    policy: DownloadPolicy,
}

impl Downloader {
    pub fn new(transport: Arc<dyn DownloadTransport>, policy: DownloadPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &DownloadPolicy {
        &self.policy
    }

    /// Build a job with the policy's attempt budget
    pub fn job(
        &self,
        url: impl Into<String>,
        destination: impl Into<PathBuf>,
        format: ArchiveFormat,
    ) -> DownloadJob {
        DownloadJob {
            url: url.into(),
            destination: destination.into(),
            format,
            attempts_remaining: self.policy.max_attempts.max(1),
        }
    }

    /// Fetch one job, retrying transport failures until its attempts run out
    ///
    /// On success the destination exists and is non-empty.
    ///
    /// # Errors
    /// - LauncherError::DownloadFailed once every attempt has failed
    /// - LauncherError::EmptyArtifact if the server answered 200 with no body
    pub async fn fetch(&self, mut job: DownloadJob) -> Result<u64> {
        let budget = job.attempts_remaining.max(1);
        job.attempts_remaining = budget;

        loop {
            let attempt = budget - job.attempts_remaining + 1;
            let guard = PartialFile::new(&job.destination);

            info!(
                url = %job.url,
                destination = %job.destination.display(),
                attempt,
                "Downloading"
            );

            match self.transport.fetch_once(&job.url, &job.destination).await {
                Ok(_) => {
                    let size = verify_artifact(&job.destination).await?;
                    guard.keep();
                    info!(url = %job.url, bytes = size, "Download complete");
                    return Ok(size);
                }
                Err(e) => {
                    drop(guard);
                    job.attempts_remaining -= 1;

                    if job.attempts_remaining == 0 {
                        return Err(LauncherError::DownloadFailed {
                            url: job.url,
                            attempts: budget,
                            reason: e.to_string(),
                        });
                    }

                    warn!(
                        url = %job.url,
                        error = %e,
                        attempts_remaining = job.attempts_remaining,
                        backoff_ms = self.policy.backoff.as_millis() as u64,
                        "Download attempt failed, retrying"
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                }
            }
        }
    }

    /// Fetch a batch with bounded concurrency
    ///
    /// The first failure aborts the batch: downloads still in flight are
    /// dropped and their partial files removed.
    pub async fn fetch_all(&self, jobs: Vec<DownloadJob>) -> Result<Vec<u64>> {
        let parallelism = self.policy.parallelism.max(1);
        let mut results = stream::iter(jobs)
            .map(|job| self.fetch(job))
            .buffered(parallelism);

        let mut sizes = Vec::new();
        while let Some(result) = results.next().await {
            sizes.push(result?);
        }
        Ok(sizes)
    }
}

/// Post-condition check: the file exists and is not empty
async fn verify_artifact(path: &Path) -> Result<u64> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LauncherError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };

    if meta.len() == 0 {
        return Err(LauncherError::EmptyArtifact(path.to_path_buf()));
    }
    Ok(meta.len())
}
