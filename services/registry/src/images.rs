//! Gift image storage
//!
//! Images live in an S3-compatible bucket under a fixed folder. The public
//! URL handed back on upload is the only reference the database keeps, so
//! deletes recover the object key from that URL.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{Client, primitives::ByteStream};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{config::ImageSettings, models::ImageUpload};

/// Image storage errors
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image file is empty")]
    Empty,

    #[error("Image upload failed: {0}")]
    Provider(String),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the image and return its public URL
    async fn upload(&self, image: &ImageUpload) -> Result<String, ImageError>;

    /// Remove the image behind `url`.
    ///
    /// Returns `true` when there was nothing to delete and `false` when the
    /// provider refused; never fails.
    async fn delete(&self, url: Option<&str>) -> bool;
}

/// [`ImageStore`] backed by S3
#[derive(Clone)]
pub struct S3ImageStore {
    client: Client,
    bucket: String,
    folder: String,
    public_base_url: String,
}

impl S3ImageStore {
    pub fn new(client: Client, settings: &ImageSettings) -> Self {
        Self {
            client,
            bucket: settings.bucket.clone(),
            folder: settings.folder.trim_matches('/').to_string(),
            public_base_url: settings.public_base_url(),
        }
    }

    /// Build the S3 client from the ambient AWS configuration, honouring a
    /// custom endpoint when one is set.
    pub async fn from_settings(settings: &ImageSettings) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(Client::from_conf(builder.build()), settings)
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}

#[async_trait]
impl ImageStore for S3ImageStore {
    async fn upload(&self, image: &ImageUpload) -> Result<String, ImageError> {
        if image.is_empty() {
            return Err(ImageError::Empty);
        }

        let key = format!("{}/{}", self.folder, Uuid::new_v4());
        let content_type = image
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(image.bytes.clone()))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| ImageError::Provider(e.to_string()))?;

        info!("Uploaded image {} ({} bytes)", key, image.bytes.len());
        Ok(self.object_url(&key))
    }

    async fn delete(&self, url: Option<&str>) -> bool {
        let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
            return true;
        };

        let Some(key) = object_key_from_url(url, &self.public_base_url) else {
            warn!("Could not derive an object key from image URL: {}", url);
            return true;
        };

        match self
            .client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(_) => {
                info!("Deleted image {}", key);
                true
            }
            Err(e) => {
                warn!("Failed to delete image {}: {}", key, e);
                false
            }
        }
    }
}

/// Recover the object key from a public image URL.
///
/// The key is the path after `/upload/` when present (CDN-style URLs),
/// otherwise the path after `public_base_url`. A leading version segment
/// (`v1712345/`) and the file extension are dropped.
pub fn object_key_from_url(url: &str, public_base_url: &str) -> Option<String> {
    let url = url.split(['?', '#']).next().unwrap_or(url);

    let path = match url.split_once("/upload/") {
        Some((_, rest)) => rest,
        None => url
            .strip_prefix(public_base_url.trim_end_matches('/'))?
            .trim_start_matches('/'),
    };

    let path = match path.split_once('/') {
        Some((version, rest))
            if version.len() > 1
                && version.starts_with('v')
                && version[1..].chars().all(|c| c.is_ascii_digit()) =>
        {
            rest
        }
        _ => path,
    };

    let key = match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => &path[..dot],
        _ => path,
    };

    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://gift-registry.s3.us-east-1.amazonaws.com";

    #[test]
    fn key_from_own_url() {
        let url = format!("{BASE}/gift-registry/5f0c");
        assert_eq!(
            object_key_from_url(&url, BASE).as_deref(),
            Some("gift-registry/5f0c")
        );
    }

    #[test]
    fn key_from_cdn_url_drops_version_and_extension() {
        let url = "https://res.example.com/demo/image/upload/v1712345678/gift-registry/abc.jpg";
        assert_eq!(
            object_key_from_url(url, BASE).as_deref(),
            Some("gift-registry/abc")
        );
    }

    #[test]
    fn key_keeps_dots_in_folders() {
        let url = format!("{BASE}/gift.registry/abc");
        assert_eq!(
            object_key_from_url(&url, BASE).as_deref(),
            Some("gift.registry/abc")
        );
    }

    #[test]
    fn foreign_url_has_no_key() {
        assert_eq!(object_key_from_url("https://elsewhere.com/a.png", BASE), None);
        assert_eq!(object_key_from_url(&format!("{BASE}/"), BASE), None);
    }

    #[test]
    fn query_string_is_ignored() {
        let url = format!("{BASE}/gift-registry/abc.png?sig=1");
        assert_eq!(
            object_key_from_url(&url, BASE).as_deref(),
            Some("gift-registry/abc")
        );
    }
}
