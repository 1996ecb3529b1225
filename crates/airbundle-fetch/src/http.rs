use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use airbundle_core::Fetcher;

use crate::progress::ProgressGuard;

const DOWNLOAD_CHUNK_BYTES: usize = 64 * 1024;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        on_progress: &mut dyn FnMut(f64),
    ) -> Result<()> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("request failed: {url}"))?
            .error_for_status()
            .with_context(|| format!("server rejected download: {url}"))?;

        let total_bytes = response
            .content_length()
            .filter(|len| *len > 0)
            .with_context(|| format!("download has no usable content length: {url}"))?;

        let mut file = fs::File::create(destination)
            .with_context(|| format!("failed to create {}", destination.display()))?;
        let mut progress = ProgressGuard::new(on_progress);
        let mut buffer = vec![0u8; DOWNLOAD_CHUNK_BYTES];
        let mut received: u64 = 0;

        loop {
            let read = response
                .read(&mut buffer)
                .with_context(|| format!("download stream failed: {url}"))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .with_context(|| format!("failed writing {}", destination.display()))?;
            received += read as u64;
            progress.report(received as f64 / total_bytes as f64);
        }

        file.flush()
            .with_context(|| format!("failed flushing {}", destination.display()))?;

        if received < total_bytes {
            anyhow::bail!("download truncated: got {received} of {total_bytes} bytes: {url}");
        }

        progress.finish();
        Ok(())
    }
}
