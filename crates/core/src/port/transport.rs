// Download Transport Port
// One HTTP attempt: redirects followed, body streamed into a file

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Failure of a single fetch attempt
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("Redirect without a usable Location header")]
    BadRedirect,

    #[error("Timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Write error: {0}")]
    Write(#[from] std::io::Error),
}

/// Download Transport trait
///
/// Implementations:
/// - ReqwestTransport: HTTP(S) via reqwest with manual redirect handling
#[async_trait]
pub trait DownloadTransport: Send + Sync {
    /// Fetch `url` once and stream the body into `destination`
    ///
    /// Returns the number of bytes written. Retries are the caller's job.
    ///
    /// # Errors
    /// - FetchError::Status for a final non-200 response
    /// - FetchError::Timeout / Transport for network failures
    /// - FetchError::Write if the destination cannot be written
    async fn fetch_once(&self, url: &str, destination: &Path) -> Result<u64, FetchError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted outcome of one mock fetch
    #[derive(Debug, Clone)]
    pub enum MockFetch {
        /// Write this body and succeed
        Body(Vec<u8>),
        /// Fail with the given HTTP status
        Status(u16),
        /// Fail with a transport error (file partially written first)
        Broken(String),
    }

    /// Mock transport replaying a script; the last entry repeats forever
    pub struct MockTransport {
        script: Arc<Mutex<VecDeque<MockFetch>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl MockTransport {
        pub fn new(script: Vec<MockFetch>) -> Self {
            Self {
                script: Arc::new(Mutex::new(script.into())),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn always(outcome: MockFetch) -> Self {
            Self::new(vec![outcome])
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn requested_urls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn next(&self) -> MockFetch {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script
                    .front()
                    .cloned()
                    .unwrap_or(MockFetch::Status(404))
            }
        }
    }

    #[async_trait]
    impl DownloadTransport for MockTransport {
        async fn fetch_once(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());

            match self.next() {
                MockFetch::Body(body) => {
                    tokio::fs::write(destination, &body).await?;
                    Ok(body.len() as u64)
                }
                MockFetch::Status(code) => Err(FetchError::Status(code)),
                MockFetch::Broken(msg) => {
                    tokio::fs::write(destination, b"partial").await?;
                    Err(FetchError::Transport(msg))
                }
            }
        }
    }
}
