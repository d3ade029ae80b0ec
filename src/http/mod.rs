//! HTTP host for a Dispatcher
//!
//! Exposes the dispatcher on `POST /rpc` alongside a health probe.

pub mod handlers;
