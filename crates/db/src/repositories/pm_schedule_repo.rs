//! Repository for the `pm_schedules` table.

use maintrack_core::recurrence::PmCompletion;
use maintrack_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::pm_schedule::{
    CreatePmSchedule, PmSchedule, PmScheduleWithMachine, UpdatePmSchedule,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, machine_id, task_name, description, frequency, \
    last_completed_date, next_due_date, is_active, created_at, updated_at";

/// Columns for queries joining `machines m`.
const JOINED_COLUMNS: &str = "p.id, p.machine_id, p.task_name, p.description, p.frequency, \
    p.last_completed_date, p.next_due_date, p.is_active, p.created_at, p.updated_at, \
    m.name AS machine_name";

/// Provides CRUD operations for PM schedules.
pub struct PmScheduleRepo;

impl PmScheduleRepo {
    /// Insert a new schedule, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePmSchedule,
    ) -> Result<PmSchedule, sqlx::Error> {
        let query = format!(
            "INSERT INTO pm_schedules
                (machine_id, task_name, description, frequency, next_due_date, is_active)
             VALUES ($1, $2, $3, COALESCE($4, 'monthly'), $5, COALESCE($6, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PmSchedule>(&query)
            .bind(input.machine_id)
            .bind(&input.task_name)
            .bind(&input.description)
            .bind(&input.frequency)
            .bind(input.next_due_date)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a schedule by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PmSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pm_schedules WHERE id = $1");
        sqlx::query_as::<_, PmSchedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All schedules with machine names, soonest due first, undated last.
    pub async fn list_with_machine(
        pool: &PgPool,
    ) -> Result<Vec<PmScheduleWithMachine>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM pm_schedules p
             JOIN machines m ON m.id = p.machine_id
             ORDER BY p.next_due_date ASC NULLS LAST, p.id"
        );
        sqlx::query_as::<_, PmScheduleWithMachine>(&query)
            .fetch_all(pool)
            .await
    }

    /// `(is_active, next_due_date)` of every schedule, for dashboard counts.
    pub async fn list_active_due_dates(
        pool: &PgPool,
    ) -> Result<Vec<(bool, Option<Date>)>, sqlx::Error> {
        sqlx::query_as::<_, (bool, Option<Date>)>(
            "SELECT is_active, next_due_date FROM pm_schedules",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a schedule. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePmSchedule,
    ) -> Result<Option<PmSchedule>, sqlx::Error> {
        let query = format!(
            "UPDATE pm_schedules SET
                task_name = COALESCE($2, task_name),
                description = COALESCE($3, description),
                frequency = COALESCE($4, frequency),
                next_due_date = COALESCE($5, next_due_date),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PmSchedule>(&query)
            .bind(id)
            .bind(&input.task_name)
            .bind(&input.description)
            .bind(&input.frequency)
            .bind(input.next_due_date)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Write both completion columns in one statement.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn mark_complete(
        pool: &PgPool,
        id: DbId,
        completion: &PmCompletion,
    ) -> Result<Option<PmSchedule>, sqlx::Error> {
        let query = format!(
            "UPDATE pm_schedules SET
                last_completed_date = $2,
                next_due_date = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PmSchedule>(&query)
            .bind(id)
            .bind(completion.last_completed_date)
            .bind(completion.next_due_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a schedule by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM pm_schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
