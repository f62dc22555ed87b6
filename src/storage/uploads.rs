use std::path::PathBuf;

use aws_config::Region;
use aws_sdk_s3::{config::Credentials, primitives::ByteStream, Client, Config as S3Config};
use bytes::Bytes;
use uuid::Uuid;

use crate::{config::StorageConfig, error::AppResult};

/// Photo/video store. Backed by an S3-compatible bucket when a bucket
/// endpoint is configured, a local uploads directory otherwise.
#[derive(Clone)]
pub struct UploadStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    S3 {
        client: Client,
        bucket: String,
        public_url: Option<String>,
        endpoint: String,
    },
    Local {
        root: PathBuf,
    },
}

impl UploadStore {
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let backend = match &config.bucket_endpoint {
            Some(endpoint) => {
                let creds = Credentials::new(
                    &config.access_key,
                    &config.secret_key,
                    None,
                    None,
                    "bucket",
                );

                let s3_config = S3Config::builder()
                    .region(Region::new(config.bucket_region.clone()))
                    .endpoint_url(endpoint)
                    .credentials_provider(creds)
                    .force_path_style(true)
                    .build();

                Backend::S3 {
                    client: Client::from_conf(s3_config),
                    bucket: config.bucket_name.clone(),
                    public_url: config.public_url.clone(),
                    endpoint: endpoint.clone(),
                }
            }
            None => {
                let root = PathBuf::from(&config.uploads_dir);
                tokio::fs::create_dir_all(&root)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to create uploads dir: {}", e))?;
                Backend::Local { root }
            }
        };

        Ok(Self { backend })
    }

    pub fn is_s3(&self) -> bool {
        matches!(self.backend, Backend::S3 { .. })
    }

    /// Store a file under `prefix/` with a generated name and return the
    /// value to persist: an object key for S3, a `/uploads/...` path locally.
    pub async fn store(
        &self,
        prefix: &str,
        ext: &str,
        data: Bytes,
        content_type: &str,
    ) -> AppResult<String> {
        let name = format!("{}{}", Uuid::new_v4(), ext);

        match &self.backend {
            Backend::S3 { client, bucket, .. } => {
                let key = format!("{}/{}", prefix, name);
                client
                    .put_object()
                    .bucket(bucket)
                    .key(&key)
                    .body(ByteStream::from(data))
                    .content_type(content_type)
                    .send()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to upload file: {}", e))?;
                Ok(key)
            }
            Backend::Local { root } => {
                let dir = root.join(prefix);
                tokio::fs::create_dir_all(&dir)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to create uploads dir: {}", e))?;
                tokio::fs::write(dir.join(&name), &data)
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to write file: {}", e))?;
                Ok(format!("/uploads/{}/{}", prefix, name))
            }
        }
    }

    pub async fn delete(&self, stored: &str) -> AppResult<()> {
        match &self.backend {
            Backend::S3 { client, bucket, .. } => {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(stored)
                    .send()
                    .await
                    .map_err(|e| anyhow::anyhow!("Failed to delete file: {}", e))?;
            }
            Backend::Local { root } => {
                if let Some(rel) = stored.strip_prefix("/uploads/") {
                    tokio::fs::remove_file(root.join(rel)).await.ok();
                }
            }
        }
        Ok(())
    }

    /// Public URL for a stored value, for clients that need an absolute link.
    pub fn file_url(&self, stored: &str) -> String {
        match &self.backend {
            Backend::S3 {
                bucket,
                public_url,
                endpoint,
                ..
            } => match public_url {
                Some(public) => format!("{}/{}", public, stored),
                None => format!("{}/{}/{}", endpoint, bucket, stored),
            },
            Backend::Local { .. } => stored.to_string(),
        }
    }
}
