// HTTP download transport
// reason: reqwest with redirects resolved by hand so that
// every hop is logged and capped
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode, Url};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::time::timeout;
use tracing::debug;

use cusf_core::application::constants::{DEFAULT_MAX_REDIRECTS, USER_AGENT};
use cusf_core::port::{DownloadTransport, FetchError};

/// Connection limits for artifact downloads
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    /// Longest silence tolerated while waiting for headers or the next chunk
    pub idle_timeout: Duration,
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(60),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// reqwest-backed [`DownloadTransport`]
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.config)
            .finish()
    }
}

fn map_reqwest(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Transport(e.to_string())
    }
}

/// 301/302/303/307/308; 300 and 304 are treated as plain non-200 answers
fn follows_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .connect_timeout(config.connect_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(map_reqwest)?;

        Ok(Self { client, config })
    }

    async fn send(&self, url: Url) -> Result<Response, FetchError> {
        match timeout(self.config.idle_timeout, self.client.get(url).send()).await {
            Ok(result) => result.map_err(map_reqwest),
            Err(_) => Err(FetchError::Timeout),
        }
    }

    /// Follow redirects up to the configured limit and return the final 200
    async fn resolve(&self, url: &str) -> Result<Response, FetchError> {
        let mut current = Url::parse(url).map_err(|e| FetchError::Transport(e.to_string()))?;

        for hop in 0..=self.config.max_redirects {
            let response = self.send(current.clone()).await?;
            let status = response.status();

            if follows_redirect(status) {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or(FetchError::BadRedirect)?;
                // Relative locations resolve against the current URL
                let next = current.join(location).map_err(|_| FetchError::BadRedirect)?;
                debug!(hop, from = %current, to = %next, "Following redirect");
                current = next;
                continue;
            }

            if status != StatusCode::OK {
                return Err(FetchError::Status(status.as_u16()));
            }
            return Ok(response);
        }

        Err(FetchError::TooManyRedirects(self.config.max_redirects))
    }

    async fn stream_to_file(
        &self,
        mut response: Response,
        destination: &Path,
    ) -> Result<u64, FetchError> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(destination).await?;
        let mut written = 0u64;

        loop {
            let chunk = match timeout(self.config.idle_timeout, response.chunk()).await {
                Ok(result) => result.map_err(map_reqwest)?,
                Err(_) => return Err(FetchError::Timeout),
            };
            let Some(bytes) = chunk else { break };
            file.write_all(&bytes).await?;
            written += bytes.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl DownloadTransport for ReqwestTransport {
    async fn fetch_once(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let response = self.resolve(url).await?;
        let written = self.stream_to_file(response, destination).await?;
        debug!(url, bytes = written, "Body written");
        Ok(written)
    }
}
