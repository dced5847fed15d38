use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, error, info};

use crate::classify::{ErrorClass, Operation};
use crate::client::{GatewayClient, ProviderFailure};
use crate::error::{GatewayError, GatewayResult};

/// How a successful mutating call reached its end state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The gateway performed the change.
    Applied,
    /// The gateway reported the end state was already in place.
    AlreadyInState,
}

/// A fully buffered object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectContent {
    pub body: Bytes,
    pub content_type: Option<String>,
}

/// Trait defining bucket and object lifecycle operations against a gateway
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectGateway: Send + Sync {
    /// Create a bucket, logging progress at info level.
    ///
    /// # Arguments
    /// * `name` - The name of the bucket to create.
    ///
    /// # Returns
    /// * `GatewayResult<Outcome>` - `AlreadyInState` when the bucket already exists or is owned
    ///   by the caller, `Applied` otherwise.
    async fn create_bucket(&self, name: &str) -> GatewayResult<Outcome>;

    /// Same as [`ObjectGateway::create_bucket`], logging at debug level.
    async fn create_bucket_quiet(&self, name: &str) -> GatewayResult<Outcome>;

    /// Delete a bucket. Unlike object deletion, a missing bucket is reported as an error.
    ///
    /// # Arguments
    /// * `name` - The name of the bucket to delete. It must be empty.
    async fn delete_bucket(&self, name: &str) -> GatewayResult<()>;

    /// Check whether a bucket exists
    async fn bucket_exists(&self, name: &str) -> GatewayResult<bool>;

    /// Put the data into the bucket with the specified key.
    ///
    /// # Arguments
    /// * `bucket` - The bucket to write into.
    /// * `key` - The key of the object to put.
    /// * `body` - The whole object, sent as a single request.
    /// * `content_type` - Sent as the object's `Content-Type`.
    /// # Returns
    /// * `GatewayResult<()>` - The result of the put operation.
    async fn put_object(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> GatewayResult<()>;

    /// Get an object and decode it as UTF-8 text.
    ///
    /// # Arguments
    /// * `bucket` - The bucket to read from.
    /// * `key` - The key of the object to retrieve.
    ///
    /// # Returns
    /// * `GatewayResult<String>` - The object body. A body that is not valid UTF-8 yields
    ///   [`GatewayError::Body`].
    async fn get_object(&self, bucket: &str, key: &str) -> GatewayResult<String>;

    /// Fetch an object's raw bytes together with its content type
    async fn get_object_content(&self, bucket: &str, key: &str) -> GatewayResult<ObjectContent>;

    /// delete the object from the bucket with the specified key.
    ///
    /// # Arguments
    /// * `bucket` - The bucket holding the object.
    /// * `key` - The key of the object to delete.
    /// # Returns
    /// * `GatewayResult<Outcome>` - `AlreadyInState` when the object or the bucket does not exist.
    async fn delete_object(&self, bucket: &str, key: &str) -> GatewayResult<Outcome>;
}

fn object_resource(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

/// Turns a failure into an [`Outcome`] when its class is idempotent for `operation`.
fn absorb(operation: Operation, resource: &str, failure: ProviderFailure) -> GatewayResult<Outcome> {
    if failure.class(operation) == ErrorClass::Idempotent {
        debug!(
            operation = %operation,
            resource,
            code = failure.code.as_deref().unwrap_or_default(),
            "Gateway reports end state already reached"
        );
        return Ok(Outcome::AlreadyInState);
    }
    Err(failure.into_error(operation, resource.to_string()))
}

impl GatewayClient {
    async fn create_bucket_logged(&self, name: &str, info_logging: bool) -> GatewayResult<Outcome> {
        if info_logging {
            info!(bucket = %name, "Creating bucket");
        } else {
            debug!(bucket = %name, "Creating bucket");
        }

        let outcome = match self.modern.create_bucket(name).await {
            Ok(()) => Outcome::Applied,
            Err(failure) => absorb(Operation::CreateBucket, name, failure).map_err(|e| {
                error!(bucket = %name, error = %e, "Failed to create bucket");
                e
            })?,
        };

        match (outcome, info_logging) {
            (Outcome::Applied, true) => info!(bucket = %name, "Successfully created bucket"),
            (Outcome::Applied, false) => debug!(bucket = %name, "Successfully created bucket"),
            (Outcome::AlreadyInState, _) => debug!(bucket = %name, "Bucket already exists or is owned by you"),
        }
        Ok(outcome)
    }
}

#[async_trait]
impl ObjectGateway for GatewayClient {
    async fn create_bucket(&self, name: &str) -> GatewayResult<Outcome> {
        self.create_bucket_logged(name, true).await
    }

    async fn create_bucket_quiet(&self, name: &str) -> GatewayResult<Outcome> {
        self.create_bucket_logged(name, false).await
    }

    async fn delete_bucket(&self, name: &str) -> GatewayResult<()> {
        self.legacy.delete_bucket(name).await.map_err(|failure| {
            let err = failure.into_error(Operation::DeleteBucket, name.to_string());
            error!(bucket = %name, error = %err, "Failed to delete bucket");
            err
        })?;
        debug!(bucket = %name, "Deleted bucket");
        Ok(())
    }

    async fn bucket_exists(&self, name: &str) -> GatewayResult<bool> {
        self.legacy.head_bucket(name).await.map_err(|failure| failure.into_error(Operation::HeadBucket, name.to_string()))
    }

    async fn put_object(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) -> GatewayResult<()> {
        let size = body.len();
        self.legacy.put_object(bucket, key, body, content_type).await.map_err(|failure| {
            let err = failure.into_error(Operation::PutObject, object_resource(bucket, key));
            error!(bucket = %bucket, key = %key, error = %err, "Failed to put object in bucket");
            err
        })?;
        debug!(bucket = %bucket, key = %key, size, content_type, "Put object in bucket");
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> GatewayResult<String> {
        let content = self.get_object_content(bucket, key).await?;
        String::from_utf8(content.body.to_vec()).map_err(|e| GatewayError::Body {
            operation: Operation::GetObject,
            resource: object_resource(bucket, key),
            message: e.to_string(),
        })
    }

    async fn get_object_content(&self, bucket: &str, key: &str) -> GatewayResult<ObjectContent> {
        let (body, content_type) = self.legacy.get_object(bucket, key).await.map_err(|failure| {
            let err = failure.into_error(Operation::GetObject, object_resource(bucket, key));
            error!(bucket = %bucket, key = %key, error = %err, "Failed to retrieve object from bucket");
            err
        })?;
        debug!(bucket = %bucket, key = %key, size = body.len(), "Retrieved object from bucket");
        Ok(ObjectContent { body, content_type })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> GatewayResult<Outcome> {
        match self.legacy.delete_object(bucket, key).await {
            Ok(()) => {
                debug!(bucket = %bucket, key = %key, "Deleted object from bucket");
                Ok(Outcome::Applied)
            }
            Err(failure) => absorb(Operation::DeleteObject, &object_resource(bucket, key), failure).map_err(|e| {
                error!(bucket = %bucket, key = %key, error = %e, "Failed to delete object from bucket");
                e
            }),
        }
    }
}
