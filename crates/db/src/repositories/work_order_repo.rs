//! Repository for the `work_orders` table.

use maintrack_core::search::like_pattern;
use maintrack_core::types::{Date, DbId, Timestamp};
use sqlx::PgPool;

use crate::models::work_order::{
    CreateWorkOrder, UpdateWorkOrder, WorkOrder, WorkOrderWithMachine,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, machine_id, title, description, issue_type, priority, status, \
    assigned_to, due_date, photo_url, created_at, updated_at, completed_at";

/// Columns for queries joining `machines m`.
const JOINED_COLUMNS: &str = "w.id, w.machine_id, w.title, w.description, w.issue_type, \
    w.priority, w.status, w.assigned_to, w.due_date, w.photo_url, w.created_at, w.updated_at, \
    w.completed_at, m.name AS machine_name";

/// Filters accepted by [`WorkOrderRepo::list_filtered`].
#[derive(Debug, Clone, Default)]
pub struct WorkOrderQuery<'a> {
    /// Restrict to these statuses; `None` means any.
    pub statuses: Option<Vec<&'a str>>,
    pub priority: Option<&'a str>,
    pub machine_id: Option<DbId>,
    pub search: Option<&'a str>,
    pub limit: i64,
    pub offset: i64,
}

/// Provides CRUD operations for work orders.
pub struct WorkOrderRepo;

impl WorkOrderRepo {
    /// Insert a new work order, returning the created row.
    ///
    /// New orders always start `open`.
    pub async fn create(pool: &PgPool, input: &CreateWorkOrder) -> Result<WorkOrder, sqlx::Error> {
        let query = format!(
            "INSERT INTO work_orders
                (machine_id, title, description, issue_type, priority, assigned_to, due_date)
             VALUES ($1, $2, $3, COALESCE($4, 'other'), COALESCE($5, 'medium'), $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkOrder>(&query)
            .bind(input.machine_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.issue_type)
            .bind(&input.priority)
            .bind(&input.assigned_to)
            .bind(input.due_date)
            .fetch_one(pool)
            .await
    }

    /// Find a work order by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<WorkOrder>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM work_orders WHERE id = $1");
        sqlx::query_as::<_, WorkOrder>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List work orders with their machine names, newest first.
    pub async fn list_filtered(
        pool: &PgPool,
        filter: &WorkOrderQuery<'_>,
    ) -> Result<Vec<WorkOrderWithMachine>, sqlx::Error> {
        let search = filter
            .search
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let mut conditions: Vec<String> = Vec::new();
        let mut param_idx: usize = 1;

        if filter.statuses.is_some() {
            conditions.push(format!("w.status = ANY(${param_idx})"));
            param_idx += 1;
        }
        if filter.priority.is_some() {
            conditions.push(format!("w.priority = ${param_idx}"));
            param_idx += 1;
        }
        if filter.machine_id.is_some() {
            conditions.push(format!("w.machine_id = ${param_idx}"));
            param_idx += 1;
        }
        if search.is_some() {
            conditions.push(format!(
                "(w.title ILIKE ${param_idx} OR w.description ILIKE ${param_idx})"
            ));
            param_idx += 1;
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM work_orders w \
             JOIN machines m ON m.id = w.machine_id \
             {where_clause} \
             ORDER BY w.created_at DESC, w.id DESC \
             LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let mut q = sqlx::query_as::<_, WorkOrderWithMachine>(&query);

        if let Some(statuses) = &filter.statuses {
            q = q.bind(statuses.clone());
        }
        if let Some(priority) = filter.priority {
            q = q.bind(priority);
        }
        if let Some(machine_id) = filter.machine_id {
            q = q.bind(machine_id);
        }
        if let Some(pattern) = search {
            q = q.bind(pattern);
        }
        q = q.bind(filter.limit).bind(filter.offset);

        q.fetch_all(pool).await
    }

    /// The `limit` most recently created work orders.
    pub async fn list_recent(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<WorkOrderWithMachine>, sqlx::Error> {
        Self::list_filtered(
            pool,
            &WorkOrderQuery {
                limit,
                ..Default::default()
            },
        )
        .await
    }

    /// `(status, due_date)` of every work order, for dashboard counts.
    pub async fn list_status_due_dates(
        pool: &PgPool,
    ) -> Result<Vec<(String, Option<Date>)>, sqlx::Error> {
        sqlx::query_as::<_, (String, Option<Date>)>("SELECT status, due_date FROM work_orders")
            .fetch_all(pool)
            .await
    }

    /// Update a work order. Only non-`None` fields in `input` are applied,
    /// except `completed_at`, which is always written as given.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkOrder,
        completed_at: Option<Timestamp>,
    ) -> Result<Option<WorkOrder>, sqlx::Error> {
        let query = format!(
            "UPDATE work_orders SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                issue_type = COALESCE($4, issue_type),
                priority = COALESCE($5, priority),
                status = COALESCE($6, status),
                assigned_to = COALESCE($7, assigned_to),
                due_date = COALESCE($8, due_date),
                completed_at = $9
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WorkOrder>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.issue_type)
            .bind(&input.priority)
            .bind(&input.status)
            .bind(&input.assigned_to)
            .bind(input.due_date)
            .bind(completed_at)
            .fetch_optional(pool)
            .await
    }

    /// Store the public URL of an uploaded photo.
    pub async fn set_photo_url(
        pool: &PgPool,
        id: DbId,
        photo_url: &str,
    ) -> Result<Option<WorkOrder>, sqlx::Error> {
        let query =
            format!("UPDATE work_orders SET photo_url = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, WorkOrder>(&query)
            .bind(id)
            .bind(photo_url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a work order by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM work_orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
