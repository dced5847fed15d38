//! Client for S3-compatible object storage gateways.
//!
//! A [`GatewayClient`] is built once per storage target from [`ConnectionParams`]. It always
//! addresses buckets path-style against a single endpoint, can layer a private CA onto the system
//! trust store, and treats "already in the requested state" answers from the gateway as success.

pub mod classify;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod logging;
pub mod operations;
pub mod params;
pub mod probe;
pub mod transport;

// Re-export commonly used items
pub use classify::{ErrorClass, Operation};
pub use client::{GatewayClient, GATEWAY_REGION};
pub use endpoint::{ResolvedEndpoint, StaticEndpointResolver};
pub use error::{GatewayError, GatewayResult};
pub use operations::{ObjectContent, ObjectGateway, Outcome};
pub use params::{ConnectionParams, GatewayCliArgs};
