//! S3 (and S3-compatible) remote store implementation.

use std::time::Instant;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::info;

use crate::traits::{RemoteStore, StoreError, StoreResult};

/// Remote store backed by S3 or an S3-compatible provider.
#[derive(Clone)]
pub struct S3RemoteStore {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3RemoteStore {
    /// Create a new store handle.
    ///
    /// `endpoint_url` selects an S3-compatible provider (MinIO, Spaces, ...)
    /// and switches the client to path-style addressing.
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StoreResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config.clone())
            .load()
            .await;

        let client = if let Some(ref endpoint) = endpoint_url {
            let mut builder = aws_sdk_s3::Config::builder()
                .endpoint_url(endpoint)
                .region(config.region().cloned())
                .retry_config(retry_config);
            if let Some(provider) = config.credentials_provider().into_iter().next() {
                builder = builder.credentials_provider(provider);
            }
            builder = builder.force_path_style(true);
            Client::from_conf(builder.build())
        } else {
            Client::new(&config)
        };

        Ok(S3RemoteStore {
            client,
            bucket,
            region,
            endpoint_url,
        })
    }

    fn object_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }
}

#[async_trait]
impl RemoteStore for S3RemoteStore {
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let start = Instant::now();
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(token) = continuation.take() {
                request = request.continuation_token(token);
            }

            let response = request.send().await.map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    prefix = %prefix,
                    "S3 list failed"
                );
                StoreError::ListFailed(e.to_string())
            })?;

            keys.extend(
                response
                    .contents()
                    .iter()
                    .filter_map(|o| o.key().map(str::to_string)),
            );

            match response.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        info!(
            bucket = %self.bucket,
            prefix = %prefix,
            count = keys.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 list successful"
        );
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadObjectError::NotFound(_) => Ok(false),
                    _ => Err(StoreError::BackendError(e.to_string())),
                },
                _ => Err(StoreError::BackendError(e.to_string())),
            },
        }
    }

    async fn upload_if_absent(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<(String, bool)> {
        if self.exists(key).await? {
            info!(bucket = %self.bucket, key = %key, "Object already exists, skipping upload");
            return Ok((self.object_url(key), false));
        }

        let size = data.len() as u64;
        let start = Instant::now();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(Bytes::from(data)))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                StoreError::UploadFailed(e.to_string())
            })?;

        info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );
        Ok((self.object_url(key), true))
    }

    async fn download(&self, key: &str) -> StoreResult<Vec<u8>> {
        let start = Instant::now();

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    GetObjectError::NoSuchKey(_) => StoreError::NotFound(key.to_string()),
                    _ => StoreError::DownloadFailed(e.to_string()),
                },
                _ => StoreError::DownloadFailed(e.to_string()),
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::DownloadFailed(e.to_string()))?;
        let bytes = data.into_bytes().to_vec();

        info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );
        Ok(bytes)
    }
}
