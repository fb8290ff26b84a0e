use async_trait::async_trait;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::{join_url, validate_key, FileStorage, StorageError};

/// Stores files as objects in an S3 bucket.
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    public_base_url: Option<String>,
}

impl S3Storage {
    pub fn new(
        client: Client,
        bucket: impl Into<String>,
        region: impl Into<String>,
        public_base_url: Option<String>,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            region: region.into(),
            public_base_url,
        }
    }

    /// Build a client from the standard AWS credential chain.
    pub async fn from_env(bucket: &str, region: &str, public_base_url: Option<String>) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self::new(Client::new(&sdk_config), bucket, region, public_base_url)
    }
}

#[async_trait]
impl FileStorage for S3Storage {
    fn backend_name(&self) -> &'static str {
        "s3"
    }

    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        validate_key(key)?;
        let size = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::Backend(DisplayErrorContext(&e).to_string()))?;
        tracing::debug!(bucket = %self.bucket, key, size, "Stored object in S3");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        match &self.public_base_url {
            Some(base) => join_url(base, key),
            None => format!(
                "https://{}.s3.{}.amazonaws.com/{key}",
                self.bucket, self.region
            ),
        }
    }
}
