//! Download-on-demand with optional SHA-256 verification
//!
//! A file that already exists (and matches the checksum, when one is given)
//! is returned without touching the network.

use crate::{Error, Result};
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch `url` into `dest` unless a valid copy is already there
    pub async fn download_if_needed(
        &self,
        url: &str,
        dest: &Path,
        checksum: Option<&str>,
    ) -> Result<PathBuf> {
        if dest.is_file() {
            match checksum {
                None => {
                    debug!("Using cached {}", dest.display());
                    return Ok(dest.to_path_buf());
                }
                Some(expected) if sha256_file(dest).await?.eq_ignore_ascii_case(expected) => {
                    debug!("Using cached {} (checksum ok)", dest.display());
                    return Ok(dest.to_path_buf());
                }
                Some(_) => warn!("Checksum mismatch for {}, downloading again", dest.display()),
            }
        }

        info!("Downloading {} -> {}", url, dest.display());
        self.fetch(url, dest)
            .await
            .map_err(|e| Error::Download(format!("Failed to download {}: {}", url, e)))?;

        if let Some(expected) = checksum {
            let actual = sha256_file(dest).await?;
            if !actual.eq_ignore_ascii_case(expected) {
                tokio::fs::remove_file(dest).await?;
                return Err(Error::Download(
                    "Checksum mismatch after download".to_string(),
                ));
            }
        }

        Ok(dest.to_path_buf())
    }

    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

/// Hex-encoded SHA-256 of a file
pub async fn sha256_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // sha256("hello")
    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn unreachable_url() -> &'static str {
        "http://127.0.0.1:9/never"
    }

    #[tokio::test]
    async fn test_sha256_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, "hello").unwrap();
        assert_eq!(sha256_file(&path).await.unwrap(), HELLO_SHA256);
    }

    #[tokio::test]
    async fn test_existing_file_without_checksum_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("blob");
        std::fs::write(&dest, "anything").unwrap();

        let downloader = Downloader::new().unwrap();
        let path = downloader
            .download_if_needed(unreachable_url(), &dest, None)
            .await
            .unwrap();
        assert_eq!(path, dest);
    }

    #[tokio::test]
    async fn test_existing_file_with_matching_checksum_is_reused() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("blob");
        std::fs::write(&dest, "hello").unwrap();

        let downloader = Downloader::new().unwrap();
        let path = downloader
            .download_if_needed(unreachable_url(), &dest, Some(&HELLO_SHA256.to_uppercase()))
            .await
            .unwrap();
        assert_eq!(path, dest);
    }

    #[tokio::test]
    async fn test_checksum_mismatch_triggers_download() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("blob");
        std::fs::write(&dest, "stale").unwrap();

        let downloader = Downloader::with_timeout(Duration::from_secs(2)).unwrap();
        let err = downloader
            .download_if_needed(unreachable_url(), &dest, Some(HELLO_SHA256))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Download(_)));
    }
}
