//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?limit=` for list endpoints that return a single bounded page.
///
/// Values are clamped in the handler via `clamp_limit`.
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}
