use anyhow::{Context as AnyhowContext, Result};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use tracing::{debug, info, instrument};

use crate::config::StorageConfig;
use crate::errors::AppError;

/// Resource-type hint for an uploaded object, derived from its content type.
/// Documents are stored under a `raw/` prefix so the CDN serves them as-is
/// rather than applying media transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Raw,
    Auto,
}

impl ResourceKind {
    pub fn from_content_type(content_type: &str) -> Self {
        if content_type == "application/pdf"
            || content_type.contains("msword")
            || content_type.contains("officedocument")
        {
            ResourceKind::Raw
        } else {
            ResourceKind::Auto
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Raw => "raw",
            ResourceKind::Auto => "auto",
        }
    }
}

/// Client for R2 object storage.
///
/// Uses the AWS SDK for S3-compatible operations. Uploaded objects are served
/// from the bucket's public base URL, so the returned URLs stay valid for as
/// long as the object exists.
#[derive(Clone)]
pub struct R2Client {
    client: Client,
    bucket: String,
    public_base_url: String,
    account_id: String,
}

impl R2Client {
    /// Create a new R2 client from storage configuration
    ///
    /// # Errors
    /// Returns error if credentials are missing
    #[instrument(skip(config))]
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let account_id = config
            .account_id
            .as_ref()
            .context("CLOUDFLARE_ACCOUNT_ID is required for R2 operations")?;

        let access_key_id = config
            .access_key_id
            .as_ref()
            .context("CLOUDFLARE_R2_ACCESS_KEY_ID is required for R2 operations")?;

        let secret_access_key = config
            .secret_access_key
            .as_ref()
            .context("CLOUDFLARE_R2_SECRET_ACCESS_KEY is required for R2 operations")?;

        // R2 endpoint format: https://<account_id>.r2.cloudflarestorage.com
        let endpoint_url = format!("https://{}.r2.cloudflarestorage.com", account_id);

        debug!(
            endpoint = %endpoint_url,
            bucket = %config.bucket,
            "Initializing R2 client"
        );

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None, // session token (not needed for R2)
            None, // expiration (static credentials)
            "r2", // provider name
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&endpoint_url)
            .region(Region::new("auto")) // R2 uses "auto" region
            .credentials_provider(credentials)
            .force_path_style(false)
            .build();

        let client = Client::from_conf(s3_config);

        info!(
            account_id = %account_id,
            bucket = %config.bucket,
            "R2 client initialized successfully"
        );

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            account_id: account_id.clone(),
        })
    }

    /// Upload a binary payload and return its durable public URL
    ///
    /// # Arguments
    /// * `kind` - Resource-type hint; becomes the top-level key prefix
    /// * `key` - Object key within the prefix
    /// * `bytes` - Payload
    /// * `content_type` - MIME type sent to the store
    #[instrument(skip(self, bytes), fields(account_id = %self.account_id, bucket = %self.bucket))]
    pub async fn upload_object(
        &self,
        kind: ResourceKind,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, AppError> {
        let full_key = format!("{}/{}", kind.as_str(), key);

        debug!(
            key = %full_key,
            size_bytes = %bytes.len(),
            content_type = %content_type,
            "Uploading object to R2"
        );

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Upload failed: {}", e)))?;

        let url = format!("{}/{}", self.public_base_url, full_key);

        info!(key = %full_key, url = %url, "Uploaded object to R2");

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_are_stored_raw() {
        assert_eq!(
            ResourceKind::from_content_type("application/pdf"),
            ResourceKind::Raw
        );
        assert_eq!(
            ResourceKind::from_content_type("application/msword"),
            ResourceKind::Raw
        );
        assert_eq!(
            ResourceKind::from_content_type(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            ResourceKind::Raw
        );
    }

    #[test]
    fn media_defaults_to_auto() {
        assert_eq!(ResourceKind::from_content_type("video/mp4"), ResourceKind::Auto);
        assert_eq!(ResourceKind::from_content_type("image/png"), ResourceKind::Auto);
        assert_eq!(ResourceKind::Auto.as_str(), "auto");
        assert_eq!(ResourceKind::Raw.as_str(), "raw");
    }
}
