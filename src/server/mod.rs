//! Serving side of the engine
//!
//! Procedures are registered in a `ProcedureTable` and handed to a
//! `Dispatcher`, which turns inbound payloads into response payloads.

pub mod audit;
pub mod dispatcher;
pub mod host;
pub mod procedures;

pub use dispatcher::Dispatcher;
pub use host::{serve, ServerTransport};
pub use procedures::{parse_params, Procedure, ProcedureTable};
