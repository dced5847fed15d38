//! Endpoint normalization and path-style resolution.
//!
//! Gateways are usually reached through a bare hostname or IP address, where bucket
//! subdomains cannot resolve. Every request therefore goes to one fixed base URL and the
//! bucket is always the first path segment: `scheme://host[:port]/bucket/key`.

use std::fmt;

use aws_sdk_s3::config::endpoint::{Endpoint, EndpointFuture, Params, ResolveEndpoint};
use url::Url;

use crate::error::{GatewayError, GatewayResult};

pub const HTTP_SCHEME: &str = "http";
pub const HTTPS_SCHEME: &str = "https";

/// A normalized absolute gateway URL. Built once per client and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    url: Url,
    base: String,
}

impl ResolvedEndpoint {
    /// Normalizes `raw` into an absolute URL.
    ///
    /// `raw` may be a host, `host:port` or a full URL. An explicit `http`/`https` scheme is kept
    /// as is; otherwise the scheme follows `tls_enabled`.
    ///
    /// # Errors
    /// [`GatewayError::Configuration`] for an empty input, an input that does not parse even
    /// with a scheme prefix, or a scheme other than `http`/`https`.
    pub fn resolve(raw: &str, tls_enabled: bool) -> GatewayResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(GatewayError::config("endpoint is empty"));
        }

        let scheme = if tls_enabled { HTTPS_SCHEME } else { HTTP_SCHEME };
        // `myhost:8080` parses as an opaque URI with scheme `myhost`, so an input only counts
        // as schemed when it carries an authority.
        let candidate = if raw.contains("://") { raw.to_string() } else { format!("{scheme}://{raw}") };
        let url =
            Url::parse(&candidate).map_err(|e| GatewayError::config(format!("invalid endpoint {raw:?}: {e}")))?;

        if url.scheme() != HTTP_SCHEME && url.scheme() != HTTPS_SCHEME {
            return Err(GatewayError::config(format!(
                "unsupported scheme {:?} in endpoint {raw:?}, expected http or https",
                url.scheme()
            )));
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(GatewayError::config(format!("endpoint {raw:?} has no host")));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(GatewayError::config(format!("endpoint {raw:?} must not carry a query or fragment")));
        }

        let base = url.as_str().trim_end_matches('/').to_string();
        Ok(Self { url, base })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    pub fn is_tls(&self) -> bool {
        self.url.scheme() == HTTPS_SCHEME
    }

    /// Always true: the bucket never moves into the host.
    pub fn is_path_style(&self) -> bool {
        true
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Base URL without a trailing slash.
    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// URL that requests for `bucket` are sent to.
    ///
    /// # Arguments
    /// * `bucket` - The bucket name, appended as one percent-encoded path segment.
    ///
    /// # Returns
    /// * `String` - The base URL when `bucket` is `None` or empty, `base/bucket` otherwise.
    pub fn bucket_url(&self, bucket: Option<&str>) -> String {
        let Some(bucket) = bucket.filter(|bucket| !bucket.is_empty()) else {
            return self.base.clone();
        };

        let mut url = self.url.clone();
        match url.path_segments_mut() {
            Ok(mut segments) => {
                segments.pop_if_empty().push(bucket);
            }
            // http(s) URLs always have a path
            Err(()) => return format!("{}/{}", self.base, bucket),
        }
        url.to_string()
    }
}

impl fmt::Display for ResolvedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base)
    }
}

/// Endpoint resolver that pins every request to one [`ResolvedEndpoint`].
#[derive(Debug, Clone)]
pub struct StaticEndpointResolver {
    endpoint: ResolvedEndpoint,
}

impl StaticEndpointResolver {
    pub fn new(endpoint: ResolvedEndpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &ResolvedEndpoint {
        &self.endpoint
    }
}

impl ResolveEndpoint for StaticEndpointResolver {
    fn resolve_endpoint<'a>(&'a self, params: &'a Params) -> EndpointFuture<'a> {
        let url = self.endpoint.bucket_url(params.bucket());
        EndpointFuture::ready(Ok(Endpoint::builder().url(url).build()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("myhost:8080", false, "http://myhost:8080")]
    #[case("myhost:8080", true, "https://myhost:8080")]
    #[case("https://myhost", false, "https://myhost")]
    #[case("http://myhost", true, "http://myhost")]
    #[case("10.0.0.12:7480", false, "http://10.0.0.12:7480")]
    #[case("rook-ceph-rgw-store.rook-ceph.svc", true, "https://rook-ceph-rgw-store.rook-ceph.svc")]
    #[case("[::1]:9000", false, "http://[::1]:9000")]
    #[case("  http://gateway.local:80/ ", false, "http://gateway.local")]
    #[case("http://gateway.local/s3/", false, "http://gateway.local/s3")]
    fn resolves_raw_endpoints(#[case] raw: &str, #[case] tls_enabled: bool, #[case] expected: &str) {
        let endpoint = ResolvedEndpoint::resolve(raw, tls_enabled).expect("endpoint should resolve");
        assert_eq!(endpoint.to_string(), expected);
        assert!(endpoint.is_path_style());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("ftp://myhost")]
    #[case("http://[::1")]
    #[case("http://myhost?versioning")]
    fn rejects_malformed_endpoints(#[case] raw: &str) {
        let err = ResolvedEndpoint::resolve(raw, false).unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)), "unexpected error: {err}");
    }

    #[test]
    fn exposes_scheme_host_and_port() {
        let endpoint = ResolvedEndpoint::resolve("myhost:8080", true).unwrap();
        assert_eq!(endpoint.scheme(), "https");
        assert_eq!(endpoint.host(), "myhost");
        assert_eq!(endpoint.port(), Some(8080));
        assert!(endpoint.is_tls());
    }

    #[test]
    fn bucket_is_first_path_segment() {
        let endpoint = ResolvedEndpoint::resolve("10.0.0.12:7480", false).unwrap();
        assert_eq!(endpoint.bucket_url(Some("ledger")), "http://10.0.0.12:7480/ledger");
        assert_eq!(endpoint.bucket_url(Some("")), "http://10.0.0.12:7480");
        assert_eq!(endpoint.bucket_url(None), "http://10.0.0.12:7480");

        let prefixed = ResolvedEndpoint::resolve("http://gateway.local/s3/", false).unwrap();
        assert_eq!(prefixed.bucket_url(Some("ledger")), "http://gateway.local/s3/ledger");
    }

    #[rstest]
    #[case("ledger.archive-01", "http://10.0.0.12:7480/ledger.archive-01")]
    #[case("odd bucket", "http://10.0.0.12:7480/odd%20bucket")]
    #[case("a/b", "http://10.0.0.12:7480/a%2Fb")]
    #[case("a?b#c", "http://10.0.0.12:7480/a%3Fb%23c")]
    fn bucket_segment_is_percent_encoded(#[case] bucket: &str, #[case] expected: &str) {
        let endpoint = ResolvedEndpoint::resolve("10.0.0.12:7480", false).unwrap();
        assert_eq!(endpoint.bucket_url(Some(bucket)), expected);
    }
}
