//! Repository for the `machines` table.

use maintrack_core::search::like_pattern;
use maintrack_core::types::DbId;
use sqlx::PgPool;

use crate::models::machine::{CreateMachine, Machine, MachineListParams, UpdateMachine};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, model, serial_number, location, status, notes, photo_url, \
    installed_at, last_maintained_at, created_at, updated_at";

/// Provides CRUD operations for machines.
pub struct MachineRepo;

impl MachineRepo {
    /// Insert a new machine, returning the created row.
    ///
    /// If `status` is `None` in the input, defaults to `running`.
    pub async fn create(pool: &PgPool, input: &CreateMachine) -> Result<Machine, sqlx::Error> {
        let query = format!(
            "INSERT INTO machines (name, model, serial_number, location, status, notes, installed_at)
             VALUES ($1, $2, $3, $4, COALESCE($5, 'running'), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Machine>(&query)
            .bind(&input.name)
            .bind(&input.model)
            .bind(&input.serial_number)
            .bind(&input.location)
            .bind(&input.status)
            .bind(&input.notes)
            .bind(input.installed_at)
            .fetch_one(pool)
            .await
    }

    /// Find a machine by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Machine>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM machines WHERE id = $1");
        sqlx::query_as::<_, Machine>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List machines with optional status and text filters, ordered by name.
    pub async fn list_filtered(
        pool: &PgPool,
        params: &MachineListParams,
    ) -> Result<Vec<Machine>, sqlx::Error> {
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if params.status.is_some() {
            conditions.push(format!("status = ${param_idx}"));
            param_idx += 1;
        }
        if search.is_some() {
            conditions.push(format!(
                "(name ILIKE ${param_idx} OR location ILIKE ${param_idx} OR model ILIKE ${param_idx})"
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!("SELECT {COLUMNS} FROM machines {where_clause} ORDER BY name, id");
        let mut q = sqlx::query_as::<_, Machine>(&query);

        if let Some(status) = &params.status {
            q = q.bind(status);
        }
        if let Some(pattern) = search {
            q = q.bind(pattern);
        }

        q.fetch_all(pool).await
    }

    /// Machines that have no active downtime log, ordered by name.
    ///
    /// Decommissioned machines are excluded.
    pub async fn list_available(pool: &PgPool) -> Result<Vec<Machine>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM machines m
             WHERE m.status <> 'decommissioned'
               AND NOT EXISTS (
                   SELECT 1 FROM downtime_logs d
                   WHERE d.machine_id = m.id AND d.ended_at IS NULL
               )
             ORDER BY m.name, m.id"
        );
        sqlx::query_as::<_, Machine>(&query).fetch_all(pool).await
    }

    /// Status of every machine, for dashboard counts.
    pub async fn list_statuses(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>("SELECT status FROM machines")
            .fetch_all(pool)
            .await
    }

    /// Update a machine. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateMachine,
    ) -> Result<Option<Machine>, sqlx::Error> {
        let query = format!(
            "UPDATE machines SET
                name = COALESCE($2, name),
                model = COALESCE($3, model),
                serial_number = COALESCE($4, serial_number),
                location = COALESCE($5, location),
                status = COALESCE($6, status),
                notes = COALESCE($7, notes),
                installed_at = COALESCE($8, installed_at),
                last_maintained_at = COALESCE($9, last_maintained_at)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Machine>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.model)
            .bind(&input.serial_number)
            .bind(&input.location)
            .bind(&input.status)
            .bind(&input.notes)
            .bind(input.installed_at)
            .bind(input.last_maintained_at)
            .fetch_optional(pool)
            .await
    }

    /// Set the status column only. Returns `true` if a row was updated.
    pub async fn update_status(pool: &PgPool, id: DbId, status: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE machines SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store the public URL of an uploaded photo.
    pub async fn set_photo_url(
        pool: &PgPool,
        id: DbId,
        photo_url: &str,
    ) -> Result<Option<Machine>, sqlx::Error> {
        let query = format!("UPDATE machines SET photo_url = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Machine>(&query)
            .bind(id)
            .bind(photo_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a machine and, by cascade, its work orders, schedules and
    /// downtime logs. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM machines WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
