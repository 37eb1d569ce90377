//! Live adapter writing objects to S3.

use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials as AwsCredentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::config::{Credentials, StoreSettings};
use crate::error::ThumbnailError;
use crate::ports::object_store::{ObjectStore, PutFuture, PutObjectRequest};

/// S3 object store bound to one region.
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client for `store` with a static access key pair.
    ///
    /// When the store has an endpoint override the client uses path-style
    /// addressing, which LocalStack and `MinIO` require.
    pub async fn connect(credentials: &Credentials, store: &StoreSettings) -> Self {
        let provider = AwsCredentials::from_keys(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(store.region.clone()))
            .credentials_provider(provider);
        if let Some(ref endpoint_url) = store.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.clone());
        }
        let sdk_config = loader.load().await;

        let s3_config: aws_sdk_s3::Config = (&sdk_config).into();
        let mut builder = s3_config.to_builder();
        if store.endpoint_url.is_some() {
            builder.set_force_path_style(Some(true));
        }

        info!(
            region = %store.region,
            bucket = %store.bucket,
            endpoint_url = ?store.endpoint_url,
            "initialized S3 client"
        );

        Self { client: Client::from_conf(builder.build()) }
    }
}

impl ObjectStore for S3ObjectStore {
    fn put(&self, request: &PutObjectRequest) -> PutFuture<'_> {
        let PutObjectRequest { bucket, key, content_type, body } = request.clone();
        Box::pin(async move {
            let size = body.len();
            self.client
                .put_object()
                .bucket(&bucket)
                .key(&key)
                .content_type(content_type)
                .body(ByteStream::from(body))
                .send()
                .await
                .map_err(|e| ThumbnailError::Upload {
                    key: key.clone(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            debug!(bucket = %bucket, key = %key, bytes = size, "uploaded object to S3");
            Ok(())
        })
    }
}
