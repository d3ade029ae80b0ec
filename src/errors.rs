use serde_json::Value;
use thiserror::Error;

use crate::protocol::{CallId, ErrorCode, ErrorObject};

/// Opaque failure raised by a transport implementation.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Transport(TransportError),
    #[error("empty response")]
    EmptyResponse,
    #[error("syntax error: {0}")]
    Syntax(String),
    #[error("spec violation: {0}")]
    SpecViolation(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("remote error: {0}")]
    Remote(ErrorObject),
    #[error("no response matched call {0}")]
    Unmatched(CallId),
    #[error("procedure `{0}` is already registered")]
    DuplicateProcedure(String),
    #[error("procedure name must not be empty")]
    InvalidProcedureName,
}

impl RpcError {
    pub fn transport(err: impl Into<TransportError>) -> Self {
        Self::Transport(err.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    InvalidParams,
    Internal,
    Application(i64),
}

/// Failure raised by host procedure code while serving a call.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ProcedureFault {
    pub kind: FaultKind,
    pub message: String,
    pub data: Option<Value>,
}

impl ProcedureFault {
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::InvalidParams,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Internal,
            message: message.into(),
            data: None,
        }
    }

    pub fn application(code: i64, message: impl Into<String>) -> Self {
        Self {
            kind: FaultKind::Application(code),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Wire error for this fault. An empty message falls back to the
    /// standard text for the code.
    pub fn to_error_object(&self) -> ErrorObject {
        let (code, default_message) = match self.kind {
            FaultKind::InvalidParams => (
                ErrorCode::InvalidParams.code(),
                ErrorCode::InvalidParams.message(),
            ),
            FaultKind::Internal => (
                ErrorCode::InternalError.code(),
                ErrorCode::InternalError.message(),
            ),
            FaultKind::Application(code) => (code, "Server error"),
        };

        let message = if self.message.trim().is_empty() {
            default_message.to_string()
        } else {
            self.message.clone()
        };

        ErrorObject::new(code, message, self.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parameter_faults_map_to_invalid_params() {
        let error = ProcedureFault::invalid_params("expected two numbers").to_error_object();
        assert_eq!(error.code, -32602);
        assert_eq!(error.message, "expected two numbers");
    }

    #[test]
    fn empty_message_uses_default_text() {
        let error = ProcedureFault::internal("").to_error_object();
        assert_eq!(error, ErrorObject::new(-32603, "Internal error", None));

        let error = ProcedureFault::invalid_params(" ").to_error_object();
        assert_eq!(error.message, "Invalid params");
    }

    #[test]
    fn application_codes_pass_through() {
        let error = ProcedureFault::application(4001, "quota exceeded")
            .with_data(json!({"limit": 10}))
            .to_error_object();
        assert_eq!(
            error,
            ErrorObject::new(4001, "quota exceeded", Some(json!({"limit": 10})))
        );
    }

    #[test]
    fn transport_errors_display_unmodified() {
        let error = RpcError::transport("connection reset");
        assert_eq!(error.to_string(), "connection reset");
    }
}
