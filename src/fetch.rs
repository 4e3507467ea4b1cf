// Capped HTTP downloads for the listing page and the spreadsheets it links to
use crate::constants;
use crate::error::{Error, Result};
use std::time::Duration;

/// HTTP client that refuses bodies larger than a fixed ceiling.
///
/// Each call makes exactly one attempt; retry policy belongs to the caller.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_bytes: u64,
}

impl Fetcher {
    pub fn new(max_bytes: u64, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(constants::user_agent())
            .build()
            .map_err(|e| Error::network("<client>", e))?;
        Ok(Self { client, max_bytes })
    }

    /// Download `url` into memory.
    ///
    /// The body is read chunk by chunk and the download is abandoned with
    /// [`Error::SizeExceeded`] the moment it would pass `max_bytes`; a partial
    /// body is never returned.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        log::debug!("[Fetch] GET {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(url, format!("unexpected status code: {}", status)));
        }

        if let Some(declared) = response.content_length()
            && declared > self.max_bytes
        {
            return Err(self.size_exceeded(url));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| Error::network(url, e))? {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.size_exceeded(url));
            }
            body.extend_from_slice(&chunk);
        }

        log::debug!("[Fetch] {} -> {} bytes", url, body.len());
        Ok(body)
    }

    fn size_exceeded(&self, url: &str) -> Error {
        log::warn!("[Fetch] {} exceeds the {} byte limit, aborting", url, self.max_bytes);
        Error::SizeExceeded {
            url: url.to_string(),
            limit: self.max_bytes,
        }
    }
}
