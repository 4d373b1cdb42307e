//! Asset host client.
//!
//! Image fields reference assets by identifier on an HTTP asset host.
//! During import, assets living on a foreign host are downloaded and
//! re-hosted; assets already on our host are re-pointed without a transfer.

use crate::error::{CmsError, Result};
use std::time::Duration;
use tracing::warn;

pub struct DownloadedAsset {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

pub struct AssetClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl AssetClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    /// Fetch an asset by identifier from an arbitrary host
    pub fn download_from(&self, host: &str, asset_id: &str) -> Result<DownloadedAsset> {
        let url = format!("{}/image/{}", host.trim_end_matches('/'), asset_id);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|e| CmsError::Asset(format!("GET {} failed: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(CmsError::Asset(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response
            .bytes()
            .map_err(|e| CmsError::Asset(format!("reading {} failed: {}", url, e)))?;
        Ok(DownloadedAsset {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    /// Upload an asset, receiving the new identifier from the host. The
    /// suggested filename carries the extension derived from the content
    /// type, which the host uses to name the stored file.
    pub fn upload(&self, asset: &DownloadedAsset) -> Result<String> {
        let url = format!("{}/image", self.base_url);
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, asset.content_type.clone())
            .header(
                reqwest::header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    upload_filename(&asset.content_type)
                ),
            )
            .body(asset.bytes.clone())
            .send()
            .map_err(|e| CmsError::Asset(format!("POST {} failed: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(CmsError::Asset(format!(
                "POST {} returned {}",
                url,
                response.status()
            )));
        }
        let id = response
            .text()
            .map_err(|e| CmsError::Asset(format!("reading {} response failed: {}", url, e)))?;
        Ok(id.trim().to_string())
    }
}

/// Filename a re-hosted asset is stored under
pub fn upload_filename(content_type: &str) -> String {
    format!("image.{}", extension_for_content_type(content_type))
}

/// Map a content type to a file extension, tolerating a content-type field
/// that is itself an extension string
pub fn extension_for_content_type(value: &str) -> String {
    match value {
        "image/jpeg" => "jpg".to_string(),
        "image/png" => "png".to_string(),
        "image/gif" => "gif".to_string(),
        "image/svg+xml" => "svg".to_string(),
        "image/webp" => "webp".to_string(),
        other => other
            .rsplit('/')
            .next()
            .unwrap_or(other)
            .trim_start_matches('.')
            .to_string(),
    }
}

/// Migrate an image reference during import: same host re-points, a foreign
/// host is downloaded and re-hosted. Failure is logged and leaves the field
/// unset rather than failing the entity.
pub fn migrate_image(
    client: &AssetClient,
    asset_id: &str,
    origin_host: &str,
) -> Option<(String, String)> {
    if origin_host.trim_end_matches('/') == client.host() {
        return Some((asset_id.to_string(), client.host().to_string()));
    }
    let transferred = client
        .download_from(origin_host, asset_id)
        .and_then(|asset| client.upload(&asset));
    match transferred {
        Ok(new_id) => Some((new_id, client.host().to_string())),
        Err(err) => {
            warn!("Image {} could not be migrated from {}: {}", asset_id, origin_host, err);
            None
        }
    }
}
