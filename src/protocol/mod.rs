//! JSON-RPC message construction and classification
//!
//! Builds spec-correct call payloads and classifies inbound elements and
//! responses for JSON-RPC 1.0 and 2.0.

pub mod codec;
pub mod message;
pub mod v1;
pub mod v2;

pub use codec::{MessageCodec, WireRules};
pub use message::{
    Call, CallId, ErrorCode, ErrorObject, Inbound, Outcome, Params, SpecVersion,
};
