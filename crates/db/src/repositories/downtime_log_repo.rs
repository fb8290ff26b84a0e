//! Repository for the `downtime_logs` table.

use maintrack_core::downtime::ClosedDowntime;
use maintrack_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::downtime_log::{CreateDowntimeLog, DowntimeLog, DowntimeLogWithMachine};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, machine_id, reason, description, started_at, ended_at, duration_minutes, created_at";

/// Columns for queries joining `machines m`.
const JOINED_COLUMNS: &str = "d.id, d.machine_id, d.reason, d.description, d.started_at, \
    d.ended_at, d.duration_minutes, d.created_at, m.name AS machine_name";

/// Provides operations for downtime logs.
pub struct DowntimeLogRepo;

impl DowntimeLogRepo {
    /// Open a new log. `started_at` defaults to `now` when not supplied.
    ///
    /// Fails with a unique violation on `uq_downtime_logs_active_machine` if
    /// the machine already has an active log.
    pub async fn create(
        pool: &PgPool,
        input: &CreateDowntimeLog,
        now: Timestamp,
    ) -> Result<DowntimeLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO downtime_logs (machine_id, reason, description, started_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DowntimeLog>(&query)
            .bind(input.machine_id)
            .bind(&input.reason)
            .bind(&input.description)
            .bind(input.started_at.unwrap_or(now))
            .fetch_one(pool)
            .await
    }

    /// Find a log by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<DowntimeLog>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM downtime_logs WHERE id = $1");
        sqlx::query_as::<_, DowntimeLog>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The `limit` most recently started logs, active and closed, with
    /// machine names.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<DowntimeLogWithMachine>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM downtime_logs d
             JOIN machines m ON m.id = d.machine_id
             ORDER BY d.started_at DESC, d.id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, DowntimeLogWithMachine>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Every active log, oldest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<DowntimeLogWithMachine>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM downtime_logs d
             JOIN machines m ON m.id = d.machine_id
             WHERE d.ended_at IS NULL
             ORDER BY d.started_at ASC"
        );
        sqlx::query_as::<_, DowntimeLogWithMachine>(&query)
            .fetch_all(pool)
            .await
    }

    /// `duration_minutes` of every closed log, for dashboard totals.
    pub async fn list_closed_durations(pool: &PgPool) -> Result<Vec<i64>, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT duration_minutes FROM downtime_logs WHERE duration_minutes IS NOT NULL",
        )
        .fetch_all(pool)
        .await
    }

    /// Close an active log.
    ///
    /// The update only applies while `ended_at` is still null, so of two
    /// concurrent closes exactly one gets `Some`.
    pub async fn close(
        pool: &PgPool,
        id: DbId,
        closed: &ClosedDowntime,
    ) -> Result<Option<DowntimeLog>, sqlx::Error> {
        let query = format!(
            "UPDATE downtime_logs SET
                ended_at = $2,
                duration_minutes = $3
             WHERE id = $1 AND ended_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DowntimeLog>(&query)
            .bind(id)
            .bind(closed.ended_at)
            .bind(closed.duration_minutes)
            .fetch_optional(pool)
            .await
    }

    /// Number of active logs on `machine_id` other than `exclude_id`.
    pub async fn count_other_active(
        pool: &PgPool,
        machine_id: DbId,
        exclude_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM downtime_logs
             WHERE machine_id = $1 AND id <> $2 AND ended_at IS NULL",
        )
        .bind(machine_id)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Delete a log by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM downtime_logs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
