use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;

use crate::error::{GatewayError, GatewayResult};

/// Fixed timeout for every request when the client builds its own HTTP client
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// Retries handed to the SDK retry strategy, on top of the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// Everything needed to connect to one gateway. Immutable once a client is built from it.
#[derive(Clone)]
pub struct ConnectionParams {
    pub access_key: String,
    pub secret_key: String,
    pub endpoint: String,
    /// Log every request and response at debug level.
    pub debug: bool,
    pub ca_certificate_pem: Option<Vec<u8>>,
    pub insecure_skip_verify: bool,
    pub request_timeout: Duration,
    pub max_retries: u32,
}

impl ConnectionParams {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            endpoint: endpoint.into(),
            debug: false,
            ca_certificate_pem: None,
            insecure_skip_verify: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_ca_certificate(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca_certificate_pem = Some(pem.into());
        self
    }

    pub fn with_insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.insecure_skip_verify = insecure;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// The CA bundle, if a non-empty one was supplied.
    pub fn ca_certificate(&self) -> Option<&[u8]> {
        self.ca_certificate_pem.as_deref().filter(|pem| !pem.is_empty())
    }

    /// TLS is enabled iff a certificate is supplied or verification is skipped.
    pub fn tls_enabled(&self) -> bool {
        self.ca_certificate().is_some() || self.insecure_skip_verify
    }

    pub(crate) fn validate(&self) -> GatewayResult<()> {
        if self.access_key.trim().is_empty() {
            return Err(GatewayError::config("access key is empty"));
        }
        if self.secret_key.trim().is_empty() {
            return Err(GatewayError::config("secret key is empty"));
        }
        if self.request_timeout.is_zero() {
            return Err(GatewayError::config("request timeout must be greater than zero"));
        }
        Ok(())
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("debug", &self.debug)
            .field("ca_certificate_pem", &self.ca_certificate_pem.as_ref().map(|pem| pem.len()))
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Parameters used to connect to the object storage gateway.
#[derive(Clone, Args)]
pub struct GatewayCliArgs {
    /// Access key of the gateway user.
    #[arg(env = "GATEWAY_ACCESS_KEY", long)]
    pub access_key: String,

    /// Secret key of the gateway user.
    #[arg(env = "GATEWAY_SECRET_KEY", long, hide_env_values = true)]
    pub secret_key: String,

    /// Gateway endpoint: host, host:port or a full http(s) URL.
    #[arg(env = "GATEWAY_ENDPOINT", long)]
    pub endpoint: String,

    /// PEM bundle appended to the system trust store.
    #[arg(env = "GATEWAY_CA_CERT_PATH", long)]
    pub ca_cert_path: Option<PathBuf>,

    /// Skip TLS certificate verification.
    #[arg(env = "GATEWAY_INSECURE_SKIP_VERIFY", long, default_value_t = false)]
    pub insecure_skip_verify: bool,

    /// Log every gateway request and response at debug level.
    #[arg(env = "GATEWAY_DEBUG", long, default_value_t = false)]
    pub debug: bool,

    /// Request timeout in seconds.
    #[arg(env = "GATEWAY_REQUEST_TIMEOUT_SECS", long, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout_secs: u64,

    /// Retries delegated to the transport for transient failures.
    #[arg(env = "GATEWAY_MAX_RETRIES", long, default_value_t = DEFAULT_MAX_RETRIES)]
    pub max_retries: u32,
}

impl fmt::Debug for GatewayCliArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCliArgs")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("ca_cert_path", &self.ca_cert_path)
            .field("insecure_skip_verify", &self.insecure_skip_verify)
            .field("debug", &self.debug)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl TryFrom<GatewayCliArgs> for ConnectionParams {
    type Error = GatewayError;

    fn try_from(args: GatewayCliArgs) -> Result<Self, Self::Error> {
        let mut params = ConnectionParams::new(args.access_key, args.secret_key, args.endpoint)
            .with_debug(args.debug)
            .with_insecure_skip_verify(args.insecure_skip_verify)
            .with_request_timeout(Duration::from_secs(args.request_timeout_secs))
            .with_max_retries(args.max_retries);

        if let Some(path) = args.ca_cert_path {
            let pem = std::fs::read(&path).map_err(|e| {
                GatewayError::config(format!("failed to read CA certificate {}: {e}", path.display()))
            })?;
            params = params.with_ca_certificate(pem);
        }

        params.validate()?;
        Ok(params)
    }
}
