//! Maintrack change feed.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`TableChange`]: a row-level change to one of the maintenance tables.
//! - [`ChangeListener`]: background service bridging PostgreSQL
//!   `LISTEN/NOTIFY` onto the bus.

pub mod bus;
pub mod listener;

pub use bus::{ChangeAction, EventBus, TableChange, WATCHED_TABLES};
pub use listener::{ChangeListener, ReconnectConfig, CHANGE_CHANNEL};
