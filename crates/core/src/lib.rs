//! Maintrack domain logic.
//!
//! This crate has zero internal dependencies so it can be shared by the
//! repository layer, the HTTP API and any future CLI tooling. Everything in
//! here is a pure function over plain values: no I/O, no clock reads except
//! where a caller passes `now` in.

pub mod dashboard;
pub mod downtime;
pub mod error;
pub mod machine;
pub mod photos;
pub mod pm_schedule;
pub mod recurrence;
pub mod search;
pub mod types;
pub mod work_order;
