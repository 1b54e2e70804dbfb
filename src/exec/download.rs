//! Fetching remote installer scripts

use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::DevError;

/// Fetches a URL and returns the response body
pub trait Downloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Downloader`] over a blocking HTTP client
pub struct HttpDownloader;

impl Downloader for HttpDownloader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("rust-apt-dev/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        let response = client.get(url).send().map_err(|e| DevError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DevError::Download {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            }
            .into());
        }

        let body = response.bytes().map_err(|e| DevError::Download {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(body.to_vec())
    }
}
