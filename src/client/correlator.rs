//! Single-call round trips.

use serde_json::Value;
use tracing::debug;

use crate::client::transport::Transport;
use crate::errors::RpcError;
use crate::protocol::{Call, MessageCodec, Outcome};

/// Parses response bytes, rejecting empty and whitespace-only bodies.
pub fn decode_response(bytes: &[u8]) -> Result<Value, RpcError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(RpcError::EmptyResponse);
    }
    serde_json::from_slice(bytes).map_err(|err| RpcError::Syntax(err.to_string()))
}

pub struct CallCorrelator {
    codec: MessageCodec,
    call: Call,
}

impl CallCorrelator {
    pub fn new(codec: MessageCodec, call: Call) -> Self {
        Self { codec, call }
    }

    pub fn call(&self) -> &Call {
        &self.call
    }

    pub async fn send<T: Transport + ?Sized>(&self, transport: &T) -> Result<Outcome, RpcError> {
        let payload = self.codec.encode(&self.call)?;
        debug!(
            method = %self.call.method,
            id = ?self.call.id,
            spec = %self.codec.spec(),
            "sending call"
        );

        let response = transport
            .send(payload)
            .await
            .map_err(RpcError::Transport)?;
        let wire = decode_response(&response)?;
        self.codec.classify_response(self.call.id.as_ref(), &wire)
    }
}
