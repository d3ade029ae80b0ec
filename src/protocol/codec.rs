//! Version-indexed wire rules and the `MessageCodec` facade over them.

use serde_json::{Map, Value};

use crate::errors::RpcError;
use crate::protocol::message::{Call, CallId, ErrorObject, Inbound, Outcome, SpecVersion};
use crate::protocol::{v1::V1Rules, v2::V2Rules};

/// Everything that differs between JSON-RPC 1.0 and 2.0.
pub trait WireRules: Send + Sync {
    fn version(&self) -> SpecVersion;

    fn serialize_call(&self, call: &Call) -> Result<Value, RpcError>;

    /// Error shape is checked before result shape. A decoded value matching
    /// neither shape is `RpcError::Protocol`; `RpcError::Syntax` is reserved
    /// for bytes that never decoded.
    fn classify_response(
        &self,
        original_id: Option<&CallId>,
        wire: &Value,
    ) -> Result<Outcome, RpcError>;

    fn classify_inbound(&self, wire: &Value) -> Inbound;

    fn format_result(&self, id: &CallId, result: Value) -> Value;

    fn format_error(&self, id: Option<&CallId>, error: &ErrorObject) -> Value;
}

impl SpecVersion {
    pub fn rules(self) -> &'static dyn WireRules {
        match self {
            Self::V1 => &V1Rules,
            Self::V2 => &V2Rules,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageCodec {
    spec: SpecVersion,
}

impl MessageCodec {
    pub fn new(spec: SpecVersion) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> SpecVersion {
        self.spec
    }

    fn rules(&self) -> &'static dyn WireRules {
        self.spec.rules()
    }

    /// Builds the wire object for `call` and checks it against the inbound
    /// rules of the same version before handing it out.
    pub fn serialize(&self, call: &Call) -> Result<Value, RpcError> {
        if call.method.trim().is_empty() {
            return Err(RpcError::SpecViolation(
                "method name must not be empty".to_string(),
            ));
        }

        let wire = self.rules().serialize_call(call)?;
        if let Inbound::Malformed { .. } = self.rules().classify_inbound(&wire) {
            return Err(RpcError::SpecViolation(format!(
                "call `{}` does not form a valid JSON-RPC {} message",
                call.method, self.spec
            )));
        }

        Ok(wire)
    }

    pub fn encode(&self, call: &Call) -> Result<Vec<u8>, RpcError> {
        let wire = self.serialize(call)?;
        encode_value(&wire)
    }

    pub fn classify_response(
        &self,
        original_id: Option<&CallId>,
        wire: &Value,
    ) -> Result<Outcome, RpcError> {
        self.rules().classify_response(original_id, wire)
    }

    pub fn classify_inbound(&self, wire: &Value) -> Inbound {
        self.rules().classify_inbound(wire)
    }

    pub fn format_result(&self, id: &CallId, result: Value) -> Value {
        self.rules().format_result(id, result)
    }

    pub fn format_error(&self, id: Option<&CallId>, error: &ErrorObject) -> Value {
        self.rules().format_error(id, error)
    }
}

pub fn encode_value(value: &Value) -> Result<Vec<u8>, RpcError> {
    serde_json::to_vec(value).map_err(|err| RpcError::Syntax(err.to_string()))
}

/// Strict equality; a missing original id compares as `null`.
pub(crate) fn id_matches(original_id: Option<&CallId>, wire_id: &Value) -> bool {
    original_id.map_or(Value::Null, CallId::to_value) == *wire_id
}

pub(crate) fn inbound_method(object: &Map<String, Value>) -> Option<String> {
    object
        .get("method")
        .and_then(Value::as_str)
        .filter(|method| !method.trim().is_empty())
        .map(str::to_string)
}
