//! End-to-end check of a gateway: ensure a bucket, write an object, read it back, clean up.

use bytes::Bytes;
use tracing::info;

use crate::error::{GatewayError, GatewayResult};
use crate::operations::{ObjectGateway, Outcome};

pub const PROBE_KEY: &str = "gateway-probe/healthcheck.txt";
pub const PROBE_CONTENT_TYPE: &str = "text/plain";
pub const PROBE_BODY: &str = "object storage gateway probe";

/// What a probe run observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    pub bucket: String,
    pub bucket_created: bool,
    pub round_trip_ok: bool,
    pub bucket_deleted: bool,
}

/// Runs the probe against `bucket`. The bucket is removed afterwards only when `delete_bucket`
/// is set.
pub async fn run_probe(gateway: &dyn ObjectGateway, bucket: &str, delete_bucket: bool) -> GatewayResult<ProbeReport> {
    let created = gateway.create_bucket_quiet(bucket).await?;
    info!(bucket, outcome = ?created, "Probe bucket ready");

    gateway.put_object(bucket, PROBE_KEY, Bytes::from_static(PROBE_BODY.as_bytes()), PROBE_CONTENT_TYPE).await?;
    let read_back = gateway.get_object(bucket, PROBE_KEY).await;
    // The object is removed even when the read failed.
    gateway.delete_object(bucket, PROBE_KEY).await?;

    let round_trip_ok = match read_back {
        Ok(body) => body == PROBE_BODY,
        Err(GatewayError::Body { .. }) => false,
        Err(e) => return Err(e),
    };
    info!(bucket, round_trip_ok, "Probe object round trip finished");

    if delete_bucket {
        gateway.delete_bucket(bucket).await?;
    }

    Ok(ProbeReport {
        bucket: bucket.to_string(),
        bucket_created: created == Outcome::Applied,
        round_trip_ok,
        bucket_deleted: delete_bucket,
    })
}
