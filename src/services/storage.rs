use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{
    Attribute, Attributes, ObjectStore, PutPayload, aws::AmazonS3Builder,
    gcp::GoogleCloudStorageBuilder, local::LocalFileSystem, path::Path as ObjectStorePath,
};
use tracing::{debug, info};
use url::Url;

use crate::utilities::{config::Config, errors::AppError};

/// Object storage collaborator used for listing photos.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `path` and returns the stored path.
    async fn upload(&self, path: &str, bytes: Bytes, content_type: &str)
    -> Result<String, AppError>;

    fn public_url(&self, path: &str) -> String;

    async fn remove(&self, paths: &[String]) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct BucketStorage {
    store: Arc<dyn ObjectStore>,
    public_base: Url,
    content_type_attributes: bool,
}

impl BucketStorage {
    pub fn new(store: Arc<dyn ObjectStore>, mut public_base: Url) -> Self {
        if !public_base.path().ends_with('/') {
            let path = format!("{}/", public_base.path());
            public_base.set_path(&path);
        }

        Self {
            store,
            public_base,
            content_type_attributes: true,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        if let Some(bucket) = &config.s3_bucket_name {
            let mut builder = AmazonS3Builder::new().with_bucket_name(bucket);
            if let Some(region) = &config.s3_region {
                builder = builder.with_region(region);
            }
            if let Some(endpoint) = &config.s3_endpoint {
                builder = builder.with_endpoint(endpoint).with_allow_http(true);
            }
            if let (Some(key_id), Some(secret)) = (&config.s3_access_key_id, &config.s3_secret_key)
            {
                builder = builder
                    .with_access_key_id(key_id)
                    .with_secret_access_key(secret);
            }
            info!("Using S3 bucket {} for photos", bucket);
            return Ok(Self::new(
                Arc::new(builder.build()?),
                config.storage_public_url.clone(),
            ));
        }

        if let (Some(bucket), Some(service_account)) =
            (&config.gcs_bucket_name, &config.gcp_service_account)
        {
            let gcs = GoogleCloudStorageBuilder::new()
                .with_bucket_name(bucket)
                .with_service_account_key(service_account)
                .build()?;
            info!("Using GCS bucket {} for photos", bucket);
            return Ok(Self::new(Arc::new(gcs), config.storage_public_url.clone()));
        }

        let root = config.storage_local_dir.join(&config.storage_bucket);
        tokio::fs::create_dir_all(&root).await?;
        info!("Using local directory {} for photos", root.display());

        let mut storage = Self::new(
            Arc::new(LocalFileSystem::new_with_prefix(&root)?),
            config.storage_public_url.clone(),
        );
        // local filesystem store rejects object attributes
        storage.content_type_attributes = false;
        Ok(storage)
    }
}

#[async_trait]
impl ObjectStorage for BucketStorage {
    async fn upload(
        &self,
        path: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<String, AppError> {
        let location = ObjectStorePath::from(path);
        debug!("uploading {} ({} bytes, {})", location, bytes.len(), content_type);

        if self.content_type_attributes {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            self.store
                .put_opts(&location, PutPayload::from(bytes), attributes.into())
                .await?;
        } else {
            self.store.put(&location, PutPayload::from(bytes)).await?;
        }

        Ok(location.to_string())
    }

    fn public_url(&self, path: &str) -> String {
        self.public_base
            .join(path)
            .map(|url| url.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.public_base, path))
    }

    async fn remove(&self, paths: &[String]) -> Result<(), AppError> {
        for path in paths {
            let location = ObjectStorePath::from(path.as_str());
            debug!("removing {}", location);
            self.store.delete(&location).await?;
        }
        Ok(())
    }
}
