//! Mapping from provider error codes to outcome categories.
//!
//! The tables below are the only place that tracks the gateway's error vocabulary. When the
//! provider renames or adds codes this is where behaviour drifts.

use strum_macros::Display;

/// Provider code: the bucket exists (owned by someone, possibly the caller).
pub const BUCKET_ALREADY_EXISTS: &str = "BucketAlreadyExists";
/// Provider code: the bucket exists and the caller already owns it.
pub const BUCKET_ALREADY_OWNED_BY_YOU: &str = "BucketAlreadyOwnedByYou";
pub const NO_SUCH_BUCKET: &str = "NoSuchBucket";
pub const NO_SUCH_KEY: &str = "NoSuchKey";

/// Gateway operations, used for error context and for idempotency lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Operation {
    #[strum(to_string = "create bucket")]
    CreateBucket,
    #[strum(to_string = "delete bucket")]
    DeleteBucket,
    #[strum(to_string = "check bucket")]
    HeadBucket,
    #[strum(to_string = "put object")]
    PutObject,
    #[strum(to_string = "get object")]
    GetObject,
    #[strum(to_string = "delete object")]
    DeleteObject,
}

/// Category a provider failure falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorClass {
    /// The goal state was already reached; absorbed as success.
    Idempotent,
    /// The request was rejected because of what the caller asked for.
    Caller,
    /// The gateway or the network may succeed on a later attempt.
    Transient,
    /// The request could not be built or the client could not be configured.
    Fatal,
}

/// Codes absorbed as success, per operation. Bucket deletion has no entry, so deleting a
/// missing bucket stays a failure.
const IDEMPOTENT_CODES: &[(Operation, &[&str])] = &[
    (Operation::CreateBucket, &[BUCKET_ALREADY_EXISTS, BUCKET_ALREADY_OWNED_BY_YOU]),
    (Operation::DeleteObject, &[NO_SUCH_BUCKET, NO_SUCH_KEY]),
];

const TRANSIENT_CODES: &[&str] = &["InternalError", "ServiceUnavailable", "SlowDown", "RequestTimeout"];

/// Classifies a service-level failure from its error code and HTTP status.
pub fn classify(operation: Operation, code: Option<&str>, status: Option<u16>) -> ErrorClass {
    if let Some(code) = code {
        let absorbed = IDEMPOTENT_CODES
            .iter()
            .any(|(candidate, codes)| *candidate == operation && codes.contains(&code));
        if absorbed {
            return ErrorClass::Idempotent;
        }
        if TRANSIENT_CODES.contains(&code) {
            return ErrorClass::Transient;
        }
    }

    match status {
        Some(status) if status >= 500 => ErrorClass::Transient,
        _ => ErrorClass::Caller,
    }
}
