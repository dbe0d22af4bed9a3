//! HTTP gateway for a single stateful computation engine session.
//!
//! Exposes `/eval`, `/feval`, `/getVariable` and `/putVariable` as JSON
//! endpoints. Every request becomes exactly one operation against the shared
//! engine session, and requests are executed strictly one at a time.

pub mod codec;
pub mod config;
pub mod engine;
pub mod handlers;
pub mod protocol;
pub mod server;
pub mod telemetry;
pub mod worker;

pub mod schema;
