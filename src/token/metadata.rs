//! Token metadata upload and retrieval over IPFS.
//!
//! Pins through the Pinata pinning API: the image file first, then the
//! metadata JSON pointing at it.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::TokenMetadata;
use crate::config::ConfigError;
use crate::error::{MintError, Result};

/// Interface for publishing and reading token metadata.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Pins the image and a metadata document referencing it; returns the
    /// metadata URI.
    async fn upload(&self, image: Vec<u8>, file_name: &str, metadata: &TokenMetadata)
        -> Result<String>;

    /// Reads a metadata document back.
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata>;
}

/// Pinata client configuration.
#[derive(Clone, Debug)]
pub struct PinataConfig {
    /// Pinata JWT for uploads
    pub jwt: Option<String>,
    /// Pinning API base URL
    pub api_url: String,
    /// Gateway written into published URIs
    pub gateway_url: String,
    /// Gateway used when reading documents back
    pub fetch_gateway_url: String,
    /// Upload request timeout in seconds
    pub timeout_seconds: u64,
    /// Fetch request timeout in seconds
    pub fetch_timeout_seconds: u64,
}

impl PinataConfig {
    pub fn new(gateway_url: impl Into<String>, fetch_gateway_url: impl Into<String>) -> Self {
        Self {
            jwt: None,
            api_url: "https://api.pinata.cloud".into(),
            gateway_url: gateway_url.into(),
            fetch_gateway_url: fetch_gateway_url.into(),
            timeout_seconds: 30,
            fetch_timeout_seconds: 10,
        }
    }

    pub fn with_jwt(mut self, jwt: impl Into<String>) -> Self {
        self.jwt = Some(jwt.into());
        self
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

impl Default for PinataConfig {
    fn default() -> Self {
        Self::new("https://ipfs.io", "https://gateway.pinata.cloud")
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinata-backed metadata service.
pub struct PinataClient {
    config: PinataConfig,
    http_client: reqwest::Client,
}

impl PinataClient {
    pub fn new(config: PinataConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| MintError::UploadFailure(format!("HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// URI of a pinned object on the publishing gateway.
    pub fn gateway_uri(&self, hash: &str) -> String {
        format!("{}/ipfs/{}", self.config.gateway_url.trim_end_matches('/'), hash)
    }

    /// Rewrites a published URI onto the fetch gateway.
    pub fn fetch_url(&self, uri: &str) -> String {
        let published = self.config.gateway_url.trim_end_matches('/');
        match uri.strip_prefix(published) {
            Some(rest) => format!(
                "{}{}",
                self.config.fetch_gateway_url.trim_end_matches('/'),
                rest
            ),
            None => uri.to_string(),
        }
    }

    fn jwt(&self) -> Result<&str> {
        self.config
            .jwt
            .as_deref()
            .ok_or(MintError::Config(ConfigError::Missing("PINATA_JWT")))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/pinning/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    async fn read_pin(response: reqwest::Response) -> Result<String> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(MintError::UploadFailure(format!(
                "Pinning failed with status {}: {}",
                status, text
            )));
        }

        let pin: PinResponse = response
            .json()
            .await
            .map_err(|e| MintError::UploadFailure(e.to_string()))?;
        Ok(pin.ipfs_hash)
    }

    #[instrument(skip(self, image))]
    async fn pin_file(&self, image: Vec<u8>, file_name: &str) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(image).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.endpoint("pinFileToIPFS"))
            .bearer_auth(self.jwt()?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MintError::UploadFailure(e.to_string()))?;

        let hash = Self::read_pin(response).await?;
        debug!(hash = %hash, "Pinned image");
        Ok(hash)
    }

    #[instrument(skip(self, metadata))]
    async fn pin_json(&self, metadata: &TokenMetadata) -> Result<String> {
        let response = self
            .http_client
            .post(self.endpoint("pinJSONToIPFS"))
            .bearer_auth(self.jwt()?)
            .json(metadata)
            .send()
            .await
            .map_err(|e| MintError::UploadFailure(e.to_string()))?;

        let hash = Self::read_pin(response).await?;
        debug!(hash = %hash, "Pinned metadata");
        Ok(hash)
    }
}

#[async_trait]
impl MetadataService for PinataClient {
    async fn upload(
        &self,
        image: Vec<u8>,
        file_name: &str,
        metadata: &TokenMetadata,
    ) -> Result<String> {
        // Fail before sending anything if uploads are not configured.
        self.jwt()?;

        let image_hash = self.pin_file(image, file_name).await?;
        let document = TokenMetadata {
            image: Some(self.gateway_uri(&image_hash)),
            ..metadata.clone()
        };
        let metadata_hash = self.pin_json(&document).await?;

        Ok(self.gateway_uri(&metadata_hash))
    }

    #[instrument(skip(self))]
    async fn fetch(&self, uri: &str) -> Result<TokenMetadata> {
        let url = self.fetch_url(uri);

        let response = self
            .http_client
            .get(&url)
            .header("Accept", "application/json")
            .timeout(Duration::from_secs(self.config.fetch_timeout_seconds))
            .send()
            .await
            .map_err(|e| MintError::MetadataFetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MintError::MetadataFetch(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| MintError::MetadataFetch(e.to_string()))
    }
}
