//! JSON-RPC 2.0 wire rules.

use serde_json::{json, Map, Value};

use crate::errors::RpcError;
use crate::protocol::codec::{id_matches, inbound_method, WireRules};
use crate::protocol::message::{Call, CallId, ErrorObject, Inbound, Outcome, Params, SpecVersion};

pub const JSONRPC_VERSION: &str = "2.0";

#[derive(Debug, Clone, Copy, Default)]
pub struct V2Rules;

fn has_version_tag(object: &Map<String, Value>) -> bool {
    object.get("jsonrpc").and_then(Value::as_str) == Some(JSONRPC_VERSION)
}

fn error_shape(original_id: Option<&CallId>, wire: &Value) -> Option<ErrorObject> {
    let object = wire.as_object().filter(|object| has_version_tag(object))?;
    let error = object.get("error")?.as_object()?;
    let code = error.get("code")?.as_i64()?;
    let message = error.get("message")?.as_str()?;

    // Parse and invalid-request errors legitimately carry no id.
    match object.get("id") {
        None | Some(Value::Null) => {}
        Some(id) if id_matches(original_id, id) => {}
        Some(_) => return None,
    }

    let data = error.get("data").filter(|data| !data.is_null()).cloned();
    Some(ErrorObject::new(code, message, data))
}

fn result_shape(original_id: Option<&CallId>, wire: &Value) -> Option<Value> {
    let object = wire.as_object().filter(|object| has_version_tag(object))?;
    let id = object.get("id")?;
    if !id_matches(original_id, id) {
        return None;
    }
    object.get("result").cloned()
}

impl WireRules for V2Rules {
    fn version(&self) -> SpecVersion {
        SpecVersion::V2
    }

    fn serialize_call(&self, call: &Call) -> Result<Value, RpcError> {
        let mut object = Map::new();
        object.insert("jsonrpc".to_string(), json!(JSONRPC_VERSION));
        object.insert("method".to_string(), json!(call.method));
        if let Some(id) = &call.id {
            object.insert("id".to_string(), id.to_value());
        }
        if let Some(params) = &call.params {
            object.insert("params".to_string(), params.to_value());
        }
        Ok(Value::Object(object))
    }

    fn classify_response(
        &self,
        original_id: Option<&CallId>,
        wire: &Value,
    ) -> Result<Outcome, RpcError> {
        if let Some(error) = error_shape(original_id, wire) {
            return Ok(Outcome::Error(error));
        }
        if let Some(result) = result_shape(original_id, wire) {
            return Ok(Outcome::Result(result));
        }
        Err(RpcError::Protocol("invalid response structure".to_string()))
    }

    fn classify_inbound(&self, wire: &Value) -> Inbound {
        let Some(object) = wire.as_object() else {
            return Inbound::Malformed { id: None };
        };
        let raw_id = object.get("id");
        let malformed = || Inbound::Malformed {
            id: raw_id.and_then(CallId::from_value),
        };

        if !has_version_tag(object) {
            return malformed();
        }
        let Some(method) = inbound_method(object) else {
            return malformed();
        };
        let params = match object.get("params") {
            None => None,
            Some(value) => match Params::from_value(value) {
                Some(params) => Some(params),
                None => return malformed(),
            },
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
            "jsonrpc": JSONRPC_VERSION,
            "id": id.to_value(),
            "result": result,
        })
    }

    fn format_error(&self, id: Option<&CallId>, error: &ErrorObject) -> Value {
        json!({
            "jsonrpc": JSONRPC_VERSION,
            "id": id.map_or(Value::Null, CallId::to_value),
            "error": {
                "code": error.code,
                "message": error.message,
                "data": error.data.clone().unwrap_or(Value::Null),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn classify(original: i64, wire: Value) -> Result<Outcome, RpcError> {
        V2Rules.classify_response(Some(&CallId::from(original)), &wire)
    }

    #[test]
    fn serializes_request_with_id_and_params() {
        let call = Call::with_id(1_i64, "add", Some(Params::Positional(vec![json!(2), json!(3)])));
        let wire = V2Rules.serialize_call(&call).expect("serialize");
        assert_eq!(
            wire,
            json!({"jsonrpc": "2.0", "id": 1, "method": "add", "params": [2, 3]})
        );
    }

    #[test]
    fn notification_omits_id_and_absent_params() {
        let wire = V2Rules
            .serialize_call(&Call::notification("log", None))
            .expect("serialize");
        assert_eq!(wire, json!({"jsonrpc": "2.0", "method": "log"}));
    }

    #[test]
    fn accepts_result_with_matching_id() {
        let outcome = classify(1, json!({"jsonrpc": "2.0", "id": 1, "result": null}))
            .expect("null result is valid");
        assert_eq!(outcome, Outcome::Result(Value::Null));
    }

    #[test]
    fn rejects_result_with_mismatched_id() {
        let error = classify(1, json!({"jsonrpc": "2.0", "id": 2, "result": 5}))
            .expect_err("mismatched id must be rejected");
        assert!(matches!(error, RpcError::Protocol(_)));
    }

    #[test]
    fn rejects_result_without_version_tag() {
        assert!(classify(1, json!({"id": 1, "result": 5})).is_err());
        assert!(classify(1, json!({"jsonrpc": "1.0", "id": 1, "result": 5})).is_err());
    }

    #[test]
    fn rejects_string_id_against_numeric_original() {
        assert!(classify(1, json!({"jsonrpc": "2.0", "id": "1", "result": 5})).is_err());
    }

    #[test]
    fn error_without_id_is_accepted() {
        let outcome = classify(
            4,
            json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32700, "message": "Parse error"}}),
        )
        .expect("null id error");
        assert_eq!(
            outcome,
            Outcome::Error(ErrorObject::new(-32700, "Parse error", None))
        );

        let outcome = classify(
            4,
            json!({"jsonrpc": "2.0", "error": {"code": 12, "message": "app", "data": {"x": 1}}}),
        )
        .expect("absent id error");
        assert_eq!(
            outcome,
            Outcome::Error(ErrorObject::new(12, "app", Some(json!({"x": 1}))))
        );
    }

    #[test]
    fn error_with_foreign_id_is_rejected() {
        let error = classify(
            4,
            json!({"jsonrpc": "2.0", "id": 5, "error": {"code": -32601, "message": "Method not found"}}),
        )
        .expect_err("foreign id");
        assert!(matches!(error, RpcError::Protocol(_)));
    }

    #[test]
    fn error_object_requires_code_and_message() {
        assert!(classify(1, json!({"jsonrpc": "2.0", "id": 1, "error": {"code": -1}})).is_err());
        assert!(classify(1, json!({"jsonrpc": "2.0", "id": 1, "error": "boom"})).is_err());
    }

    #[test]
    fn classifies_inbound_request_and_notification() {
        assert_eq!(
            V2Rules.classify_inbound(&json!({"jsonrpc": "2.0", "id": "a", "method": "ping"})),
            Inbound::Request {
                id: CallId::from("a"),
                method: "ping".to_string(),
                params: None,
            }
        );
        assert_eq!(
            V2Rules.classify_inbound(&json!({"jsonrpc": "2.0", "method": "log", "params": {"x": 1}})),
            Inbound::Notification {
                method: "log".to_string(),
                params: Params::from_value(&json!({"x": 1})),
            }
        );
    }

    #[test]
    fn malformed_inbound_keeps_determinable_id() {
        assert_eq!(
            V2Rules.classify_inbound(&json!({"jsonrpc": "2.0", "id": 3, "method": "x", "params": 1})),
            Inbound::Malformed {
                id: Some(CallId::from(3_i64))
            }
        );
        assert_eq!(
            V2Rules.classify_inbound(&json!({"id": 3, "method": "x"})),
            Inbound::Malformed {
                id: Some(CallId::from(3_i64))
            }
        );
        assert_eq!(
            V2Rules.classify_inbound(&json!({"jsonrpc": "2.0", "id": [1], "method": "x"})),
            Inbound::Malformed { id: None }
        );
        assert_eq!(
            V2Rules.classify_inbound(&json!({"jsonrpc": "2.0", "id": 1, "method": 7})),
            Inbound::Malformed {
                id: Some(CallId::from(1_i64))
            }
        );
        assert_eq!(V2Rules.classify_inbound(&json!(1)), Inbound::Malformed { id: None });
    }

    #[test]
    fn formats_error_with_null_data() {
        let wire = V2Rules.format_error(None, &ErrorObject::new(-32600, "Invalid Request", None));
        assert_eq!(
            wire,
            json!({"jsonrpc": "2.0", "id": null, "error": {"code": -32600, "message": "Invalid Request", "data": null}})
        );
    }
}
