use std::future::Future;
use std::time::Duration;

use folio_core::ResourceRequest;
use reqwest::Url;

use crate::error::{Result, TransportError};

/// Downloads the resource behind an activated lazy loader.
pub trait ResourceFetcher {
    /// Resolves to the number of bytes received.
    fn fetch(
        &self,
        request: &ResourceRequest,
    ) -> impl Future<Output = std::result::Result<u64, TransportError>> + Send;
}

#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Option<Url>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base: None })
    }

    /// Resolve relative `src` values (`/img/a.webp`) against `base`.
    pub fn with_base(mut self, base: Url) -> Self {
        self.base = Some(base);
        self
    }

    fn resolve(&self, src: &str) -> std::result::Result<Url, TransportError> {
        if let Ok(url) = Url::parse(src) {
            return Ok(url);
        }
        self.base
            .as_ref()
            .and_then(|base| base.join(src).ok())
            .ok_or_else(|| TransportError::InvalidUrl(src.to_string()))
    }
}

impl ResourceFetcher for HttpFetcher {
    fn fetch(
        &self,
        request: &ResourceRequest,
    ) -> impl Future<Output = std::result::Result<u64, TransportError>> + Send {
        let prepared = self.resolve(&request.src).map(|url| self.client.get(url));
        async move {
            let response = prepared?.send().await?.error_for_status()?;
            let bytes = response.bytes().await?;
            Ok(bytes.len() as u64)
        }
    }
}
