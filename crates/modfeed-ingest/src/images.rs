//! Content-addressed image storage.
//!
//! Image URLs are mapped to stable storage paths by hashing the URL with
//! SHA-1 and fanning the hex digest out over two prefix directories:
//! `sha1("https://…/front.jpg")` → `ab/cd/abcd….jpg`. A path that already
//! exists is never re-fetched, which keeps re-ingesting an unchanged feed
//! cheap and idempotent.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use sha1::{Digest, Sha1};

use crate::error::IngestError;

/// Storage path for an image URL: `ab/cd/<sha1-hex>.jpg`.
#[must_use]
pub fn image_path(url: &str) -> String {
    let digest = Sha1::digest(url.as_bytes());
    let hex: String = digest.iter().fold(String::with_capacity(40), |mut out, b| {
        use std::fmt::Write;
        let _ = write!(out, "{b:02x}");
        out
    });
    format!("{}/{}/{hex}.jpg", &hex[0..2], &hex[2..4])
}

/// Object-storage seam: `store` persists bytes under a relative path,
/// `exists` answers whether that path is already populated.
pub trait ImageStore {
    /// Persists `bytes` under `path`, creating parent prefixes as needed.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::ImageStore`] on I/O failure.
    fn store(&self, path: &str, bytes: &[u8]) -> Result<(), IngestError>;

    /// Returns `true` if `path` is already stored.
    fn exists(&self, path: &str) -> bool;
}

/// Filesystem-backed image store rooted at a configured directory.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl ImageStore for FsImageStore {
    fn store(&self, path: &str, bytes: &[u8]) -> Result<(), IngestError> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(full, bytes)?;
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        Path::exists(&self.full_path(path))
    }
}

/// HTTP fetcher for product images with a polite, randomized inter-request
/// delay. Backpressure here is toward the external image hosts, not toward
/// the rest of the pipeline.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    max_delay_ms: u64,
}

impl ImageFetcher {
    /// Builds the fetcher with a per-request timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] if the client cannot be
    /// constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_delay_ms: u64,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, max_delay_ms })
    }

    /// Fetches one image, sleeping a random `0..=max_delay_ms` beforehand.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::ImageFetch`] on transport failure or
    /// [`IngestError::ImageStatus`] on a non-success response.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, IngestError> {
        if self.max_delay_ms > 0 {
            let delay = rand::rng().random_range(0..=self.max_delay_ms);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::ImageFetch {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::ImageStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| IngestError::ImageFetch {
                url: url.to_string(),
                source: e,
            })?;
        Ok(bytes.to_vec())
    }
}

/// Fetches and stores every image URL, returning the storage paths of the
/// ones that succeeded. Already-stored paths short-circuit the fetch;
/// individual failures are logged and skipped so one dead image host does
/// not sink the whole item.
pub async fn store_images<S: ImageStore>(
    fetcher: &ImageFetcher,
    store: &S,
    urls: &[String],
) -> Vec<String> {
    let mut paths = Vec::with_capacity(urls.len());

    for url in urls {
        let path = image_path(url);
        if store.exists(&path) {
            paths.push(path);
            continue;
        }
        match fetcher.fetch(url).await {
            Ok(bytes) => match store.store(&path, &bytes) {
                Ok(()) => paths.push(path),
                Err(e) => tracing::warn!(url = %url, error = %e, "failed to store image"),
            },
            Err(e) => tracing::warn!(url = %url, error = %e, "failed to fetch image"),
        }
    }

    paths
}
