//! Wire-independent message model shared by the client and the dispatcher.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::RpcError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecVersion {
    V1,
    #[default]
    V2,
}

#[derive(Debug, Error)]
#[error("unknown JSON-RPC version `{0}`, expected 1.0 or 2.0")]
pub struct UnknownSpecVersion(pub String);

impl SpecVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1.0",
            Self::V2 => "2.0",
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecVersion {
    type Err = UnknownSpecVersion;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "1.0" | "v1" => Ok(Self::V1),
            "2" | "2.0" | "v2" => Ok(Self::V2),
            other => Err(UnknownSpecVersion(other.to_string())),
        }
    }
}

/// Correlation identifier. Absence is modelled as `Option<CallId>` by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CallId {
    Number(Number),
    String(String),
    Null,
}

impl CallId {
    /// Fresh random identifier, formatted as a hyphenated UUID.
    pub fn generate() -> Self {
        Self::String(Uuid::new_v4().to_string())
    }

    /// Accepts only the JSON types an id may take on the wire.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(Self::Number(number.clone())),
            Value::String(string) => Some(Self::String(string.clone())),
            Value::Null => Some(Self::Null),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Number(number) => Value::Number(number.clone()),
            Self::String(string) => Value::String(string.clone()),
            Self::Null => Value::Null,
        }
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::String(string) => write!(f, "{string}"),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<i64> for CallId {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for CallId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for CallId {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for CallId {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Params {
    Positional(Vec<Value>),
    Named(Map<String, Value>),
}

impl Default for Params {
    fn default() -> Self {
        Self::Positional(Vec::new())
    }
}

impl Params {
    /// Arrays and objects are the only structured parameter shapes.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(Self::Positional(items.clone())),
            Value::Object(map) => Some(Self::Named(map.clone())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Positional(items) => Value::Array(items.clone()),
            Self::Named(map) => Value::Object(map.clone()),
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Self::Named(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Positional(items) => items.len(),
            Self::Named(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn positional(&self, index: usize) -> Option<&Value> {
        match self {
            Self::Positional(items) => items.get(index),
            Self::Named(_) => None,
        }
    }

    pub fn named(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Positional(_) => None,
            Self::Named(map) => map.get(name),
        }
    }
}

impl From<Vec<Value>> for Params {
    fn from(items: Vec<Value>) -> Self {
        Self::Positional(items)
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self::Named(map)
    }
}

/// An outbound invocation. `id == None` marks a notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub id: Option<CallId>,
    pub method: String,
    pub params: Option<Params>,
}

impl Call {
    pub fn new(method: impl Into<String>, params: Option<Params>) -> Self {
        Self::with_id(CallId::generate(), method, params)
    }

    pub fn with_id(id: impl Into<CallId>, method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            id: Some(id.into()),
            method: method.into(),
            params,
        }
    }

    pub fn notification(method: impl Into<String>, params: Option<Params>) -> Self {
        Self {
            id: None,
            method: method.into(),
            params,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Protocol-level error codes. Anything else is an application code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    pub fn code(self) -> i64 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// Typed error payload. JSON-RPC 1.0 errors are opaque, so for them `code` is
/// 0 unless the peer sent one and the raw `error` value is always in `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ErrorObject {
    pub fn new(code: i64, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }
}

impl From<ErrorCode> for ErrorObject {
    fn from(code: ErrorCode) -> Self {
        Self::new(code.code(), code.message(), None)
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Result(Value),
    Error(ErrorObject),
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    pub fn into_result(self) -> Result<Value, RpcError> {
        match self {
            Self::Result(value) => Ok(value),
            Self::Error(error) => Err(RpcError::Remote(error)),
        }
    }
}

/// Classification of one inbound element on the serving side.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Request {
        id: CallId,
        method: String,
        params: Option<Params>,
    },
    Notification {
        method: String,
        params: Option<Params>,
    },
    Malformed {
        id: Option<CallId>,
    },
}
