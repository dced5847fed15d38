//! HTTP transport with a gateway-specific TLS trust chain.

use std::sync::Arc;
use std::time::SystemTime;

use aws_sdk_s3::config::SharedHttpClient;
use aws_smithy_runtime::client::http::hyper_014::HyperClientBuilder;
use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, ClientConfig, RootCertStore, ServerName};
use tracing::{debug, warn};

/// TLS configuration produced by [`build_tls_config`].
#[derive(Clone)]
pub struct GatewayTls {
    config: Arc<ClientConfig>,
    system_roots: usize,
    custom_roots: usize,
    skip_verify: bool,
}

impl GatewayTls {
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.config.clone()
    }

    /// Number of roots taken from the operating system store. Zero when it could not be read.
    pub fn system_roots(&self) -> usize {
        self.system_roots
    }

    /// Number of roots added from the caller-supplied bundle.
    pub fn custom_roots(&self) -> usize {
        self.custom_roots
    }

    pub fn skip_verify(&self) -> bool {
        self.skip_verify
    }

    /// Wraps the configuration into an HTTP client the SDK can drive. Both `http` and `https`
    /// endpoints are accepted.
    pub fn into_http_client(self) -> SharedHttpClient {
        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config((*self.config).clone())
            .https_or_http()
            .enable_http1()
            .build();

        HyperClientBuilder::new().build(connector)
    }
}

impl std::fmt::Debug for GatewayTls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayTls")
            .field("system_roots", &self.system_roots)
            .field("custom_roots", &self.custom_roots)
            .field("skip_verify", &self.skip_verify)
            .finish()
    }
}

/// Builds the client TLS configuration.
///
/// Roots start from the operating system store; when that store cannot be read a warning is
/// logged and an empty store is used instead. Certificates in `ca_pem` are added on top of it.
/// `insecure` turns off server certificate verification. This never fails.
pub fn build_tls_config(ca_pem: Option<&[u8]>, insecure: bool) -> GatewayTls {
    let mut roots = RootCertStore::empty();

    let system_roots = match rustls_native_certs::load_native_certs() {
        Ok(certs) => {
            let der: Vec<Vec<u8>> = certs.into_iter().map(|cert| cert.0).collect();
            let (added, ignored) = roots.add_parsable_certificates(&der);
            debug!(added, ignored, "Loaded system trust store");
            added
        }
        Err(e) => {
            warn!(error = %e, "Failed to load system cert pool; continuing without system certs");
            0
        }
    };

    let custom_roots = match ca_pem {
        Some(pem) if !pem.is_empty() => add_pem_bundle(&mut roots, pem),
        _ => 0,
    };

    let mut config = ClientConfig::builder().with_safe_defaults().with_root_certificates(roots).with_no_client_auth();
    if insecure {
        warn!("TLS certificate verification is disabled for the object storage gateway");
        config.dangerous().set_certificate_verifier(Arc::new(SkipServerVerification));
    }

    GatewayTls { config: Arc::new(config), system_roots, custom_roots, skip_verify: insecure }
}

/// Builds the HTTP client used when the caller did not supply one and TLS is enabled.
pub fn build_transport(ca_pem: Option<&[u8]>, insecure: bool) -> SharedHttpClient {
    build_tls_config(ca_pem, insecure).into_http_client()
}

fn add_pem_bundle(roots: &mut RootCertStore, pem: &[u8]) -> usize {
    let mut reader = pem;
    match rustls_pemfile::certs(&mut reader) {
        Ok(der) if der.is_empty() => {
            warn!("CA bundle contains no certificates; ignoring it");
            0
        }
        Ok(der) => {
            let (added, ignored) = roots.add_parsable_certificates(&der);
            if ignored > 0 {
                warn!(added, ignored, "Some certificates in the CA bundle could not be parsed");
            }
            added
        }
        Err(e) => {
            warn!(error = %e, "Failed to read CA bundle; ignoring it");
            0
        }
    }
}

struct SkipServerVerification;

impl ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}
