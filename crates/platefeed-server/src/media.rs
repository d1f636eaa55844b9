//! Media CDN collaborator.
//!
//! The CDN is opaque to the rest of the system: it takes a byte stream and
//! hands back a URL plus a coarse media kind.  [`MediaStorage`] is the seam;
//! [`MediaCdnClient`] is the production implementation speaking the CDN's
//! upload API, and tests substitute an in-process fake.

use async_trait::async_trait;
use platefeed_store::MediaKind;
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Content types accepted for food media.
pub const ALLOWED_MEDIA_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/jpg",
    "video/mp4",
    "video/mov",
];

/// Map a content type to its coarse kind, or `None` when disallowed.
pub fn media_kind_for(content_type: &str) -> Option<MediaKind> {
    if !ALLOWED_MEDIA_TYPES.contains(&content_type) {
        return None;
    }
    if content_type.starts_with("image/") {
        Some(MediaKind::Image)
    } else {
        Some(MediaKind::Video)
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub url: String,
    pub kind: MediaKind,
}

/// Opaque blob-store collaborator: bytes in, URL + kind out.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(
        &self,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<MediaUpload, ApiError>;
}

/// HTTP client for the media CDN's upload endpoint.
///
/// Authenticates with the private key as basic-auth username (the CDN's
/// convention); files land in a `food_items` folder under UUID names.
pub struct MediaCdnClient {
    http: reqwest::Client,
    endpoint: String,
    private_key: String,
}

#[derive(Deserialize)]
struct CdnUploadResponse {
    url: String,
}

impl MediaCdnClient {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: config.storage_url_endpoint.trim_end_matches('/').to_string(),
            private_key: config.storage_private_key.clone(),
        }
    }
}

#[async_trait]
impl MediaStorage for MediaCdnClient {
    async fn upload(
        &self,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<MediaUpload, ApiError> {
        // The caller has already validated the content type; re-derive the
        // kind here so this impl never stores something it cannot classify.
        let kind = media_kind_for(content_type)
            .ok_or_else(|| ApiError::Validation("Invalid file type".to_string()))?;

        let file_name = Uuid::new_v4().to_string();
        let size = data.len();

        let part = reqwest::multipart::Part::bytes(data)
            .file_name(file_name.clone())
            .mime_str(content_type)
            .map_err(|e| ApiError::Internal(format!("invalid content type: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("fileName", file_name.clone())
            .text("folder", "/food_items");

        let response = self
            .http
            .post(format!("{}/api/v1/files/upload", self.endpoint))
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("media upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "media CDN returned {}",
                response.status()
            )));
        }

        let body: CdnUploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Upstream(format!("bad media CDN response: {e}")))?;

        info!(file = %file_name, size, kind = kind.as_str(), "media uploaded");
        debug!(url = %body.url, "media CDN url");

        Ok(MediaUpload {
            url: body.url,
            kind,
        })
    }
}
