use aws_sdk_s3::config::interceptors::{BeforeDeserializationInterceptorContextRef, BeforeTransmitInterceptorContextRef};
use aws_sdk_s3::config::{ConfigBag, Intercept, RuntimeComponents};
use aws_sdk_s3::error::BoxError;
use tracing::debug;

/// Logs every request a handle sends and the status it gets back. Only attached when the
/// client is built with `debug` set.
#[derive(Debug, Clone)]
pub(crate) struct WireLog {
    handle: &'static str,
}

impl WireLog {
    pub(crate) fn new(handle: &'static str) -> Self {
        Self { handle }
    }
}

impl Intercept for WireLog {
    fn name(&self) -> &'static str {
        "GatewayWireLog"
    }

    fn read_before_transmit(
        &self,
        context: &BeforeTransmitInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let request = context.request();
        debug!(handle = self.handle, method = %request.method(), uri = %request.uri(), "Sending gateway request");
        Ok(())
    }

    fn read_before_deserialization(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let status = context.response().status().as_u16();
        debug!(handle = self.handle, status, "Received gateway response");
        Ok(())
    }
}
