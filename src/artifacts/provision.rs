//! Download-by-id provisioning of artifact files

use crate::error::{Result, SalesError};
use reqwest::header::CONTENT_TYPE;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

/// Google Drive direct-download endpoint
pub const DEFAULT_DOWNLOAD_URL: &str = "https://drive.google.com/uc";

/// Remote blob store addressed by file identifier
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: reqwest::Client,
    base_url: Url,
}

impl RemoteStore {
    /// Store backed by the given download endpoint
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SalesError::Config(format!("invalid download URL '{}': {}", base_url, e)))?;
        match base_url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(SalesError::Config(format!(
                    "unsupported download URL scheme '{}'",
                    scheme
                )))
            }
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SalesError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Store backed by Google Drive
    pub fn google_drive() -> Result<Self> {
        Self::new(DEFAULT_DOWNLOAD_URL)
    }

    /// Download URL for `identifier`; `confirm` skips the large-file interstitial
    pub fn blob_url(&self, identifier: &str, confirm: bool) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("export", "download").append_pair("id", identifier);
            if confirm {
                query.append_pair("confirm", "t");
            }
        }
        url
    }

    /// Download `identifier` to `dest` unless `dest` already exists.
    ///
    /// Returns whether a download happened.
    pub async fn ensure_local(&self, identifier: &str, dest: impl AsRef<Path>) -> Result<bool> {
        let dest = dest.as_ref();
        if tokio::fs::try_exists(dest).await? {
            debug!(path = %dest.display(), "Artifact present locally, skipping download");
            return Ok(false);
        }

        info!(identifier = %identifier, path = %dest.display(), "Downloading artifact");
        let bytes = self.download(identifier, dest).await?;
        info!(identifier = %identifier, path = %dest.display(), bytes, "Artifact downloaded");
        Ok(true)
    }

    /// Download `identifier` to `dest`, replacing it atomically once complete
    pub async fn download(&self, identifier: &str, dest: &Path) -> Result<u64> {
        let mut response = self.fetch(identifier, false).await?;
        if is_html(&response) {
            warn!(identifier = %identifier, "Received confirmation page, retrying with confirm");
            response = self.fetch(identifier, true).await?;
        }
        if is_html(&response) {
            return Err(download_error(
                identifier,
                "remote store returned an HTML page instead of the artifact",
            ));
        }

        let parent = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        tokio::fs::create_dir_all(parent).await?;

        // Partial bodies stay in the temp file and are removed on drop
        let staging = tempfile::NamedTempFile::new_in(parent)?;
        let mut file = tokio::fs::File::from_std(staging.reopen()?);
        let mut total = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| download_error(identifier, e))?
        {
            file.write_all(&chunk).await?;
            total += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        staging.persist(dest).map_err(|e| SalesError::Io(e.error))?;
        Ok(total)
    }

    async fn fetch(&self, identifier: &str, confirm: bool) -> Result<reqwest::Response> {
        let url = self.blob_url(identifier, confirm);
        debug!(url = %url, "Requesting artifact");
        self.client
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| download_error(identifier, e))
    }
}

fn is_html(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |v| v.trim_start().to_ascii_lowercase().starts_with("text/html"))
}

fn download_error(identifier: &str, reason: impl ToString) -> SalesError {
    SalesError::Download {
        identifier: identifier.to_string(),
        reason: reason.to_string(),
    }
}
