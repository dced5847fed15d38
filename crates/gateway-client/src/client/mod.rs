mod handles;
mod wire_log;

use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::SharedHttpClient;
use tracing::debug;

pub(crate) use handles::{LegacyHandle, ModernHandle, ProviderFailure};

use crate::endpoint::ResolvedEndpoint;
use crate::error::GatewayResult;
use crate::params::ConnectionParams;
use crate::transport;

/// Region the request signer uses. Gateways are single-endpoint, so this never changes.
pub const GATEWAY_REGION: &str = "us-east-1";

/// Client for one S3-compatible gateway.
///
/// Holds no mutable state after construction: clones share the same HTTP connection pool and
/// can be used from any number of tasks at once.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    pub(crate) legacy: LegacyHandle,
    pub(crate) modern: ModernHandle,
    endpoint: ResolvedEndpoint,
    tls_enabled: bool,
}

impl GatewayClient {
    /// Creates a new client for the gateway described by `params`.
    ///
    /// # Arguments
    /// * `params` - Credentials, endpoint and transport settings.
    /// * `http_client` - An HTTP client to use as is. When `None` the SDK's default client is
    ///   used with [`ConnectionParams::request_timeout`] as the per-attempt timeout, with the trust
    ///   chain from [`transport::build_transport`] when TLS is enabled.
    ///
    /// # Returns
    /// * `GatewayResult<Self>` - The new client. Both internal handles share its HTTP client.
    ///
    /// # Errors
    /// [`GatewayError::Configuration`](crate::GatewayError::Configuration) when the credentials
    /// are empty or the endpoint cannot be resolved.
    pub fn new(params: ConnectionParams, http_client: Option<SharedHttpClient>) -> GatewayResult<Self> {
        params.validate()?;
        let tls_enabled = params.tls_enabled();
        let endpoint = ResolvedEndpoint::resolve(&params.endpoint, tls_enabled)?;

        let shared = shared_config(&params, http_client);
        let legacy = LegacyHandle::new(&shared, &endpoint, params.debug);
        let modern = ModernHandle::new(&shared, &endpoint, params.debug);

        debug!(
            endpoint = %endpoint,
            tls_enabled,
            insecure = params.insecure_skip_verify,
            max_retries = params.max_retries,
            "Object storage gateway client created"
        );
        Ok(Self { legacy, modern, endpoint, tls_enabled })
    }

    pub fn endpoint(&self) -> &ResolvedEndpoint {
        &self.endpoint
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls_enabled
    }
}

/// Fixed-region configuration shared by both handles: static keys, no session token and no
/// credential refresh.
fn shared_config(params: &ConnectionParams, http_client: Option<SharedHttpClient>) -> SdkConfig {
    let credentials = Credentials::from_keys(params.access_key.clone(), params.secret_key.clone(), None);
    let builder = SdkConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(GATEWAY_REGION))
        .credentials_provider(SharedCredentialsProvider::new(credentials))
        .retry_config(RetryConfig::standard().with_max_attempts(params.max_retries.saturating_add(1)));

    let builder = match http_client {
        Some(http_client) => builder.http_client(http_client),
        None => {
            // Per attempt: retries each get the full timeout.
            let builder = builder
                .timeout_config(TimeoutConfig::builder().operation_attempt_timeout(params.request_timeout).build());
            if params.tls_enabled() {
                builder.http_client(transport::build_transport(params.ca_certificate(), params.insecure_skip_verify))
            } else {
                builder
            }
        }
    };

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayError;
    use rstest::rstest;

    #[rstest]
    #[case("myhost:8080", false, "http://myhost:8080")]
    #[case("myhost:8080", true, "https://myhost:8080")]
    #[case("https://myhost", false, "https://myhost")]
    fn endpoint_scheme_follows_tls(#[case] endpoint: &str, #[case] insecure: bool, #[case] expected: &str) {
        let params = ConnectionParams::new("AKIA", "s3cr3t", endpoint).with_insecure_skip_verify(insecure);
        let client = GatewayClient::new(params, None).expect("client should build");
        assert_eq!(client.endpoint().to_string(), expected);
        assert_eq!(client.tls_enabled(), insecure);
    }

    #[rstest]
    #[case(ConnectionParams::new("AKIA", "s3cr3t", "http://[::1"))]
    #[case(ConnectionParams::new("AKIA", "s3cr3t", ""))]
    #[case(ConnectionParams::new("AKIA", "s3cr3t", "ftp://gateway"))]
    #[case(ConnectionParams::new("", "s3cr3t", "gateway:7480"))]
    #[case(ConnectionParams::new("AKIA", "s3cr3t", "gateway:7480").with_request_timeout(std::time::Duration::ZERO))]
    fn malformed_configuration_yields_no_client(#[case] params: ConnectionParams) {
        let err = GatewayClient::new(params, None).unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)), "unexpected error: {err}");
    }

    #[test]
    fn clients_are_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync + Clone + 'static>() {}
        assert_send_sync::<GatewayClient>();
    }
}
