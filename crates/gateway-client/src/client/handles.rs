//! The two request handles a [`GatewayClient`](super::GatewayClient) is built from.
//!
//! Both talk to the same endpoint through the same HTTP client. They differ in how the endpoint
//! is resolved and in how provider failures are read back:
//! * [`LegacyHandle`] lets the SDK derive path-style URLs from a fixed endpoint URL and reads the
//!   raw provider error code.
//! * [`ModernHandle`] pins resolution with a [`StaticEndpointResolver`] and reads the typed
//!   error taxonomy, which is the reliable way to tell "already exists" apart on create.

use aws_config::SdkConfig;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::wire_log::WireLog;
use crate::classify::{self, ErrorClass, Operation};
use crate::endpoint::{ResolvedEndpoint, StaticEndpointResolver};
use crate::error::GatewayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailureKind {
    /// The gateway answered with an error.
    Service,
    /// No usable answer: connect, TLS, timeout or an interrupted body.
    Transport,
    /// The request could not be built.
    Construction,
}

/// A failed round trip, normalized across both handles.
#[derive(Debug)]
pub(crate) struct ProviderFailure {
    pub(crate) kind: FailureKind,
    pub(crate) code: Option<String>,
    pub(crate) status: Option<u16>,
    pub(crate) message: String,
}

impl ProviderFailure {
    fn from_sdk<E>(err: SdkError<E>) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + 'static,
    {
        let kind = match &err {
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => FailureKind::Transport,
            SdkError::ConstructionFailure(_) => FailureKind::Construction,
            _ => FailureKind::Service,
        };
        let status = err.raw_response().map(|response| response.status().as_u16());
        let code = err.code().map(str::to_owned);
        let message = DisplayErrorContext(&err).to_string();
        Self { kind, code, status, message }
    }

    fn body(message: String) -> Self {
        Self { kind: FailureKind::Transport, code: None, status: None, message }
    }

    pub(crate) fn class(&self, operation: Operation) -> ErrorClass {
        match self.kind {
            FailureKind::Service => classify::classify(operation, self.code.as_deref(), self.status),
            FailureKind::Transport => ErrorClass::Transient,
            FailureKind::Construction => ErrorClass::Fatal,
        }
    }

    pub(crate) fn into_error(self, operation: Operation, resource: String) -> GatewayError {
        match self.kind {
            FailureKind::Transport => GatewayError::Transport { operation, resource, message: self.message },
            FailureKind::Service | FailureKind::Construction => {
                let class = self.class(operation);
                GatewayError::Provider { operation, resource, code: self.code, class, message: self.message }
            }
        }
    }
}

fn s3_config(shared: &SdkConfig, wire_log: Option<WireLog>) -> aws_sdk_s3::config::Builder {
    let mut builder = aws_sdk_s3::config::Builder::from(shared).force_path_style(true);
    if let Some(wire_log) = wire_log {
        builder = builder.interceptor(wire_log);
    }
    builder
}

/// Handle for single-object request shapes: delete bucket, head bucket, put, get, delete object.
#[derive(Debug, Clone)]
pub(crate) struct LegacyHandle {
    client: Client,
}

impl LegacyHandle {
    pub(crate) fn new(shared: &SdkConfig, endpoint: &ResolvedEndpoint, debug: bool) -> Self {
        let config = s3_config(shared, debug.then(|| WireLog::new("legacy"))).endpoint_url(endpoint.as_str()).build();
        Self { client: Client::from_conf(config) }
    }

    pub(crate) async fn delete_bucket(&self, bucket: &str) -> Result<(), ProviderFailure> {
        self.client.delete_bucket().bucket(bucket).send().await.map_err(ProviderFailure::from_sdk)?;
        Ok(())
    }

    /// `Ok(false)` when the gateway answers 404.
    pub(crate) async fn head_bucket(&self, bucket: &str) -> Result<bool, ProviderFailure> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(err) if err.raw_response().map(|response| response.status().as_u16()) == Some(404) => Ok(false),
            Err(err) => Err(ProviderFailure::from_sdk(err)),
        }
    }

    pub(crate) async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), ProviderFailure> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(ProviderFailure::from_sdk)?;
        Ok(())
    }

    /// Fetches the object and buffers the whole body.
    pub(crate) async fn get_object(&self, bucket: &str, key: &str) -> Result<(Bytes, Option<String>), ProviderFailure> {
        let output = self.client.get_object().bucket(bucket).key(key).send().await.map_err(ProviderFailure::from_sdk)?;
        let content_type = output.content_type().map(str::to_owned);
        let data = output.body.collect().await.map_err(|e| ProviderFailure::body(e.to_string()))?;
        Ok((data.into_bytes(), content_type))
    }

    pub(crate) async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ProviderFailure> {
        self.client.delete_object().bucket(bucket).key(key).send().await.map_err(ProviderFailure::from_sdk)?;
        Ok(())
    }
}

/// Handle for request shapes whose typed errors matter: bucket creation.
#[derive(Debug, Clone)]
pub(crate) struct ModernHandle {
    client: Client,
}

impl ModernHandle {
    pub(crate) fn new(shared: &SdkConfig, endpoint: &ResolvedEndpoint, debug: bool) -> Self {
        let config = s3_config(shared, debug.then(|| WireLog::new("modern")))
            .endpoint_resolver(StaticEndpointResolver::new(endpoint.clone()))
            .build();
        Self { client: Client::from_conf(config) }
    }

    /// Creates the bucket. The gateway region is `us-east-1`, so no location constraint is sent.
    pub(crate) async fn create_bucket(&self, bucket: &str) -> Result<(), ProviderFailure> {
        let err = match self.client.create_bucket().bucket(bucket).send().await {
            Ok(_) => return Ok(()),
            Err(err) => err,
        };

        let typed_code = err.as_service_error().and_then(|service_err| match service_err {
            CreateBucketError::BucketAlreadyExists(_) => Some(classify::BUCKET_ALREADY_EXISTS),
            CreateBucketError::BucketAlreadyOwnedByYou(_) => Some(classify::BUCKET_ALREADY_OWNED_BY_YOU),
            _ => None,
        });

        let mut failure = ProviderFailure::from_sdk(err);
        if let Some(code) = typed_code {
            failure.code = Some(code.to_string());
        }
        Err(failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_failure(code: Option<&str>, status: u16) -> ProviderFailure {
        ProviderFailure {
            kind: FailureKind::Service,
            code: code.map(str::to_owned),
            status: Some(status),
            message: "gateway said no".to_string(),
        }
    }

    #[test]
    fn transport_failures_become_transport_errors() {
        let failure = ProviderFailure::body("connection reset".to_string());
        let err = failure.into_error(Operation::GetObject, "ledger/a.json".to_string());
        assert!(matches!(err, GatewayError::Transport { operation: Operation::GetObject, .. }));
    }

    #[test]
    fn service_failures_keep_code_and_class() {
        let err = service_failure(Some("AccessDenied"), 403).into_error(Operation::PutObject, "ledger/a".to_string());
        match err {
            GatewayError::Provider { code, class, resource, .. } => {
                assert_eq!(code.as_deref(), Some("AccessDenied"));
                assert_eq!(class, ErrorClass::Caller);
                assert_eq!(resource, "ledger/a");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn construction_failures_are_fatal() {
        let failure = ProviderFailure { kind: FailureKind::Construction, code: None, status: None, message: String::new() };
        assert_eq!(failure.class(Operation::CreateBucket), ErrorClass::Fatal);
    }

    #[test]
    fn idempotent_class_depends_on_operation() {
        let failure = service_failure(Some(classify::NO_SUCH_BUCKET), 404);
        assert_eq!(failure.class(Operation::DeleteObject), ErrorClass::Idempotent);
        assert_eq!(failure.class(Operation::DeleteBucket), ErrorClass::Caller);
    }
}
