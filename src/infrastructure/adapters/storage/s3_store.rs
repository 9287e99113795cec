//! S3 Object Store - S3 兼容对象存储 (MinIO / AWS)
//!
//! 使用静态 AccessKey 凭证 + path-style 寻址

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::path::Path;

use crate::application::ports::{ObjectStorePort, StorageError};

/// S3 连接配置
#[derive(Debug, Clone)]
pub struct S3StoreConfig {
    /// 服务地址，例如 `http://minio:9000`
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
}

/// S3 对象存储
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(config: &S3StoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "static",
        );

        let s3_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        tracing::info!(
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            "S3 object store configured"
        );

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }

    /// 只有 404 / NotFound 才算 "不存在"
    /// HEAD 的 404 响应没有 body，SDK 不一定能解析出 NotFound，所以再看状态码
    fn is_not_found(err: &SdkError<HeadObjectError>) -> bool {
        if let Some(service_err) = err.as_service_error() {
            if service_err.is_not_found() {
                return true;
            }
        }
        err.raw_response()
            .map(|resp| resp.status().as_u16() == 404)
            .unwrap_or(false)
    }
}

#[async_trait]
impl ObjectStorePort for S3ObjectStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if Self::is_not_found(&e) => Ok(false),
            Err(e) => Err(StorageError::ProbeFailed(
                DisplayErrorContext(&e).to_string(),
            )),
        }
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(DisplayErrorContext(&e).to_string()))?;

        tracing::info!(bucket = %self.bucket, key = %key, "Object uploaded");
        Ok(())
    }
}
