//! Server-side dispatch of inbound payloads
//!
//! A dispatch cycle is a pure function of the procedure table and the inbound
//! bytes: decode, detect single or batch shape, classify and invoke each
//! element in order, then package whatever responses were produced.

use std::panic::{catch_unwind, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::errors::ProcedureFault;
use crate::protocol::codec::encode_value;
use crate::protocol::{ErrorCode, ErrorObject, Inbound, MessageCodec, Params, SpecVersion};
use crate::server::audit::redact_audit_params;
use crate::server::procedures::ProcedureTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Single,
    Batch,
}

#[derive(Debug)]
pub struct Dispatcher {
    codec: MessageCodec,
    procedures: ProcedureTable,
}

/// Whitespace-only payloads decode as `null`, which then fails
/// classification as an invalid request rather than a parse error.
fn decode_request(request: &[u8]) -> Result<Value, serde_json::Error> {
    if request.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(request)
}

fn package(shape: Shape, mut responses: Vec<Value>) -> Option<Value> {
    match (shape, responses.len()) {
        (_, 0) => None,
        (Shape::Single, _) => responses.pop(),
        (Shape::Batch, _) => Some(Value::Array(responses)),
    }
}

impl Dispatcher {
    pub fn new(spec: SpecVersion, procedures: ProcedureTable) -> Self {
        Self {
            codec: MessageCodec::new(spec),
            procedures,
        }
    }

    pub fn spec(&self) -> SpecVersion {
        self.codec.spec()
    }

    pub fn procedures(&self) -> &ProcedureTable {
        &self.procedures
    }

    /// Serialized response payload, or `None` when nothing is owed to the
    /// peer.
    pub fn dispatch(&self, request: &[u8]) -> Option<Vec<u8>> {
        let payload = self.handle(request)?;
        match encode_value(&payload) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                error!(error = %err, "failed to encode response payload");
                None
            }
        }
    }

    pub fn handle(&self, request: &[u8]) -> Option<Value> {
        let decoded = match decode_request(request) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "rejecting undecodable payload");
                return Some(
                    self.codec
                        .format_error(None, &ErrorCode::ParseError.into()),
                );
            }
        };

        let (shape, elements) = match decoded {
            Value::Array(items) => (Shape::Batch, items),
            other => (Shape::Single, vec![other]),
        };

        let responses = elements
            .iter()
            .filter_map(|element| self.process(element))
            .collect();
        package(shape, responses)
    }

    fn process(&self, element: &Value) -> Option<Value> {
        match self.codec.classify_inbound(element) {
            Inbound::Malformed { id } => {
                warn!(id = ?id, spec = %self.codec.spec(), "invalid request element");
                Some(
                    self.codec
                        .format_error(id.as_ref(), &ErrorCode::InvalidRequest.into()),
                )
            }
            Inbound::Request { id, method, params } => {
                let response = match self.invoke(&method, params, false) {
                    Ok(result) => self.codec.format_result(&id, result),
                    Err(error) => self.codec.format_error(Some(&id), &error),
                };
                Some(response)
            }
            Inbound::Notification { method, params } => {
                // Notifications are owed nothing, not even errors.
                if let Err(error) = self.invoke(&method, params, true) {
                    debug!(method = %method, code = error.code, "notification failed, no response sent");
                }
                None
            }
        }
    }

    fn invoke(
        &self,
        method: &str,
        params: Option<Params>,
        notification: bool,
    ) -> Result<Value, ErrorObject> {
        let audit_params = redact_audit_params(params.as_ref());

        let Some(procedure) = self.procedures.resolve(method) else {
            info!(
                method = %method,
                params = %audit_params,
                notification,
                outcome = "not_found",
                "rpc call audited"
            );
            return Err(ErrorCode::MethodNotFound.into());
        };

        let params = params.unwrap_or_default();
        let result = catch_unwind(AssertUnwindSafe(|| procedure(params)))
            .unwrap_or_else(|_| Err(ProcedureFault::internal("")))
            .map_err(|fault| fault.to_error_object());

        info!(
            method = %method,
            params = %audit_params,
            notification,
            outcome = if result.is_ok() { "success" } else { "failure" },
            "rpc call audited"
        );

        result
    }
}
