//! JSON-RPC 1.0 wire rules.
//!
//! 1.0 has no version tag, always carries an `id` (null for notifications on
//! the way out), accepts positional parameters only and treats `error` as an
//! opaque value.

use serde_json::{json, Map, Value};

use crate::errors::RpcError;
use crate::protocol::codec::{id_matches, inbound_method, WireRules};
use crate::protocol::message::{Call, CallId, ErrorObject, Inbound, Outcome, Params, SpecVersion};

#[derive(Debug, Clone, Copy, Default)]
pub struct V1Rules;

/// Best-effort typed view of an opaque 1.0 error value. The raw value is kept
/// as `data`.
pub fn error_from_opaque(raw: &Value) -> ErrorObject {
    let code = raw.get("code").and_then(Value::as_i64).unwrap_or(0);
    let message = match raw {
        Value::String(text) => text.clone(),
        _ => raw
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| raw.to_string(), str::to_string),
    };
    ErrorObject::new(code, message, Some(raw.clone()))
}

fn error_shape(original_id: Option<&CallId>, object: &Map<String, Value>) -> Option<ErrorObject> {
    let error = object.get("error").filter(|error| !error.is_null())?;
    let id = object.get("id")?;
    if !id.is_null() && !id_matches(original_id, id) {
        return None;
    }
    Some(error_from_opaque(error))
}

fn result_shape(original_id: Option<&CallId>, object: &Map<String, Value>) -> Option<Value> {
    let result = object.get("result")?;
    let id = object.get("id")?;
    // Legacy servers answer empty results with whatever id they like.
    if id_matches(original_id, id) || result.is_null() {
        return Some(result.clone());
    }
    None
}

impl WireRules for V1Rules {
    fn version(&self) -> SpecVersion {
        SpecVersion::V1
    }

    fn serialize_call(&self, call: &Call) -> Result<Value, RpcError> {
        let mut object = Map::new();
        object.insert("method".to_string(), json!(call.method));
        object.insert(
            "id".to_string(),
            call.id.as_ref().map_or(Value::Null, CallId::to_value),
        );
        match &call.params {
            Some(Params::Named(_)) => {
                return Err(RpcError::SpecViolation(
                    "JSON-RPC 1.0 does not support named parameters".to_string(),
                ))
            }
            Some(params) => {
                object.insert("params".to_string(), params.to_value());
            }
            None => {}
        }
        Ok(Value::Object(object))
    }

    fn classify_response(
        &self,
        original_id: Option<&CallId>,
        wire: &Value,
    ) -> Result<Outcome, RpcError> {
        let invalid = || RpcError::Protocol("invalid response structure".to_string());
        let object = wire.as_object().ok_or_else(invalid)?;

        if let Some(error) = error_shape(original_id, object) {
            return Ok(Outcome::Error(error));
        }
        if let Some(result) = result_shape(original_id, object) {
            return Ok(Outcome::Result(result));
        }
        Err(invalid())
    }

    fn classify_inbound(&self, wire: &Value) -> Inbound {
        let Some(object) = wire.as_object() else {
            return Inbound::Malformed { id: None };
        };
        let raw_id = object.get("id");
        let malformed = || Inbound::Malformed {
            id: raw_id.and_then(CallId::from_value),
        };

        let Some(method) = inbound_method(object) else {
            return malformed();
        };
        let params = match object.get("params") {
            None => None,
            Some(Value::Array(items)) => Some(Params::Positional(items.clone())),
            Some(_) => return malformed(),
        };

        match raw_id {
            None => Inbound::Notification { method, params },
            Some(value) => match CallId::from_value(value) {
                Some(id) => Inbound::Request { id, method, params },
                None => Inbound::Malformed { id: None },
            },
        }
    }

    fn format_result(&self, id: &CallId, result: Value) -> Value {
        json!({
            "id": id.to_value(),
            "result": result,
            "error": null,
        })
    }

    fn format_error(&self, id: Option<&CallId>, error: &ErrorObject) -> Value {
        json!({
            "id": id.map_or(Value::Null, CallId::to_value),
            "result": null,
            "error": {
                "code": error.code,
                "message": error.message,
                "data": error.data.clone().unwrap_or(Value::Null),
            },
        })
    }
}
