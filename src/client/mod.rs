//! Calling side of the engine
//!
//! `Client` pairs a `MessageCodec` with a `Transport` and hands out typed
//! outcomes for single calls, notifications and batches.

pub mod batch;
pub mod correlator;
pub mod transport;

use tracing::debug;

pub use batch::{BatchCoordinator, BatchResponse};
pub use correlator::CallCorrelator;
pub use transport::Transport;

use crate::errors::RpcError;
use crate::protocol::{Call, MessageCodec, Outcome, Params, SpecVersion};

pub struct Client<T> {
    codec: MessageCodec,
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(spec: SpecVersion, transport: T) -> Self {
        Self {
            codec: MessageCodec::new(spec),
            transport,
        }
    }

    pub fn spec(&self) -> SpecVersion {
        self.codec.spec()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn call(
        &self,
        method: impl Into<String>,
        params: Option<Params>,
    ) -> Result<Outcome, RpcError> {
        self.send(Call::new(method, params)).await
    }

    pub async fn send(&self, call: Call) -> Result<Outcome, RpcError> {
        CallCorrelator::new(self.codec, call)
            .send(&self.transport)
            .await
    }

    /// Fire-and-forget; whatever the server answers is discarded.
    pub async fn notify(
        &self,
        method: impl Into<String>,
        params: Option<Params>,
    ) -> Result<(), RpcError> {
        let call = Call::notification(method, params);
        let payload = self.codec.encode(&call)?;
        let reply = self
            .transport
            .send(payload)
            .await
            .map_err(RpcError::Transport)?;
        if !reply.is_empty() {
            debug!(method = %call.method, bytes = reply.len(), "discarding reply to notification");
        }
        Ok(())
    }

    pub async fn batch(&self, calls: Vec<Call>) -> Result<BatchResponse, RpcError> {
        BatchCoordinator::new(self.codec, calls)
            .send(&self.transport)
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::correlator::tests::CannedTransport;

    #[tokio::test]
    async fn call_generates_id_that_the_response_must_echo() {
        let client = Client::new(
            SpecVersion::V2,
            CannedTransport::new(r#"{"jsonrpc":"2.0","id":"fixed","result":1}"#),
        );

        let error = client
            .call("ping", None)
            .await
            .expect_err("generated id differs from canned reply");
        assert!(matches!(error, RpcError::Protocol(_)));

        let sent = client.transport().last_sent();
        assert!(sent["id"].is_string());
        assert_eq!(sent["method"], "ping");
    }

    #[tokio::test]
    async fn notify_sends_without_id_and_ignores_reply() {
        let client = Client::new(SpecVersion::V2, CannedTransport::new("garbage"));
        client
            .notify("log", Some(Params::Positional(vec![json!("x")])))
            .await
            .expect("notify");

        assert_eq!(
            client.transport().last_sent(),
            json!({"jsonrpc": "2.0", "method": "log", "params": ["x"]})
        );
    }

    #[tokio::test]
    async fn outcome_converts_into_value() {
        let client = Client::new(
            SpecVersion::V1,
            CannedTransport::new(r#"{"id":1,"result":"pong","error":null}"#),
        );
        let value = client
            .send(Call::with_id(1_i64, "ping", None))
            .await
            .expect("outcome")
            .into_result()
            .expect("result");
        assert_eq!(value, json!("pong"));
        assert_eq!(client.spec(), SpecVersion::V1);
    }
}
