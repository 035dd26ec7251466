use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Builder, Credentials, Region, retry::RetryConfig},
    error::DisplayErrorContext,
    primitives::ByteStream,
    types::{BucketLocationConstraint, CreateBucketConfiguration},
};
use log::debug;

use crate::{
    config::StoreConfig,
    error::{Error, Result},
    store::BlobStore,
};

const DEFAULT_REGION: &str = "us-east-1";

/// [`BlobStore`] backed by a MinIO or S3 endpoint.
pub struct S3BlobStore {
    client: Client,
    region: String,
}

impl S3BlobStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self::with_retry_config(config, RetryConfig::standard())
    }

    pub fn with_retry_config(config: &StoreConfig, retry_config: RetryConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "minio-env",
        );
        let s3_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            // MinIO serves buckets as path segments, not subdomains.
            .force_path_style(true)
            .retry_config(retry_config)
            .build();
        Self {
            client: Client::from_conf(s3_config),
            region: config.region.clone(),
        }
    }
}

fn store_error(context: &str, err: impl std::error::Error) -> Error {
    Error::store(format!("{context}: {}", DisplayErrorContext(err)))
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|service_err| service_err.is_not_found());
                if missing {
                    Ok(false)
                } else {
                    Err(store_error(&format!("head bucket '{bucket}'"), err))
                }
            }
        }
    }

    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        // us-east-1 rejects an explicit location constraint.
        if self.region != DEFAULT_REGION {
            let constraint = BucketLocationConstraint::from(self.region.as_str());
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(constraint)
                    .build(),
            );
        }
        request
            .send()
            .await
            .map_err(|err| store_error(&format!("create bucket '{bucket}'"), err))?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("text/csv")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| store_error(&format!("put '{bucket}/{key}'"), err))?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(output) => output,
            Err(err) => {
                let missing = err
                    .as_service_error()
                    .is_some_and(|service_err| service_err.is_no_such_key());
                if missing {
                    return Err(Error::not_found(bucket, key));
                }
                return Err(store_error(&format!("get '{bucket}/{key}'"), err));
            }
        };
        let body = output
            .body
            .collect()
            .await
            .map_err(|err| store_error(&format!("read body of '{bucket}/{key}'"), err))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| store_error(&format!("list bucket '{bucket}'"), err))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }
        debug!("Listed {} objects in bucket '{bucket}'", keys.len());
        Ok(keys)
    }
}
