//! Delivery of database change events to WebSocket clients.

pub mod forwarder;

pub use forwarder::ChangeForwarder;
