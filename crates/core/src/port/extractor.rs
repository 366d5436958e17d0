// Archive Extractor Port

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::ArchiveFormat;

/// Extraction errors
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid archive: {0}")]
    Archive(String),

    #[error("{tool} exited with {status}: {stderr}")]
    Tool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Archive Extractor trait
///
/// Implementations:
/// - SystemExtractor: zip crate for `Zip`, the `tar` utility for `TarGz`
#[async_trait]
pub trait ArchiveExtractor: Send + Sync {
    /// Unpack `archive` into `target_dir` using the strategy for `format`
    async fn extract(
        &self,
        archive: &Path,
        format: ArchiveFormat,
        target_dir: &Path,
    ) -> Result<(), ExtractError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Mock extractor that "unpacks" a fixed file list per archive filename
    #[derive(Default)]
    pub struct MockExtractor {
        contents: HashMap<String, Vec<String>>,
        failing: Vec<String>,
        calls: Arc<Mutex<Vec<(String, ArchiveFormat)>>>,
    }

    impl MockExtractor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Extracting `archive` creates `files` (relative to the target dir)
        pub fn with_contents(mut self, archive: &str, files: &[&str]) -> Self {
            self.contents.insert(
                archive.to_string(),
                files.iter().map(|f| f.to_string()).collect(),
            );
            self
        }

        pub fn failing_on(mut self, archive: &str) -> Self {
            self.failing.push(archive.to_string());
            self
        }

        pub fn calls(&self) -> Vec<(String, ArchiveFormat)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ArchiveExtractor for MockExtractor {
        async fn extract(
            &self,
            archive: &Path,
            format: ArchiveFormat,
            target_dir: &Path,
        ) -> Result<(), ExtractError> {
            let name = archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.calls.lock().unwrap().push((name.clone(), format));

            if self.failing.contains(&name) {
                return Err(ExtractError::Archive(format!("mock corrupt {}", name)));
            }

            for file in self.contents.get(&name).into_iter().flatten() {
                let path = target_dir.join(file);
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&path, b"#!/bin/sh\n").await?;
            }
            Ok(())
        }
    }
}
