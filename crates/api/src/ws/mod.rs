//! WebSocket infrastructure for the table change feed.
//!
//! Provides connection management with per-table subscriptions, the client
//! message protocol, heartbeat monitoring, and the HTTP upgrade handler used
//! by Axum routes.

mod handler;
mod heartbeat;
pub mod manager;
pub mod protocol;

pub use handler::ws_handler;
pub use heartbeat::start_heartbeat;
pub use manager::WsManager;
