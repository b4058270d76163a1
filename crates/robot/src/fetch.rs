//! Sales data download over HTTP

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{RobotError, RobotResult};

/// Fetch a remote file to local storage
#[async_trait]
pub trait Downloader: Send {
    /// Download `url` to `destination`. With `overwrite` an existing file is
    /// replaced; without it an existing file is an error.
    async fn download(&mut self, url: &str, destination: &Path, overwrite: bool) -> RobotResult<PathBuf>;
}

/// reqwest-backed downloader
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> RobotResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&mut self, url: &str, destination: &Path, overwrite: bool) -> RobotResult<PathBuf> {
        if !overwrite && destination.exists() {
            return Err(RobotError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("{} already exists", destination.display()),
            )));
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RobotError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(destination, &body).await?;

        debug!("Downloaded {} bytes from {} to {}", body.len(), url, destination.display());
        Ok(destination.to_path_buf())
    }
}
