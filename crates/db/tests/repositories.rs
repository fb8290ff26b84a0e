//! Integration tests for the maintenance repositories.
//!
//! Exercises the repository layer against a real database:
//! - Defaults applied on insert
//! - Filtered listing and ordering
//! - Guarded downtime close and the one-active-log index
//! - Cascade delete from machines

use chrono::{NaiveDate, TimeZone, Utc};
use maintrack_core::downtime::close_downtime;
use maintrack_core::recurrence::{complete_pm, Frequency};
use maintrack_db::models::downtime_log::CreateDowntimeLog;
use maintrack_db::models::machine::{CreateMachine, MachineListParams, UpdateMachine};
use maintrack_db::models::pm_schedule::CreatePmSchedule;
use maintrack_db::models::work_order::{CreateWorkOrder, UpdateWorkOrder};
use maintrack_db::repositories::work_order_repo::WorkOrderQuery;
use maintrack_db::repositories::{DowntimeLogRepo, MachineRepo, PmScheduleRepo, WorkOrderRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_machine(name: &str, location: &str) -> CreateMachine {
    CreateMachine {
        name: name.to_string(),
        model: None,
        serial_number: None,
        location: location.to_string(),
        status: None,
        notes: None,
        installed_at: None,
    }
}

fn new_work_order(machine_id: i64, title: &str) -> CreateWorkOrder {
    CreateWorkOrder {
        machine_id,
        title: title.to_string(),
        description: None,
        issue_type: None,
        priority: None,
        assigned_to: None,
        due_date: None,
    }
}

fn new_downtime(machine_id: i64) -> CreateDowntimeLog {
    CreateDowntimeLog {
        machine_id,
        reason: "Bearing failure".to_string(),
        description: None,
        started_at: None,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ---------------------------------------------------------------------------
// Machines
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_machine_defaults_to_running(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Lathe 1", "Bay A"))
        .await
        .unwrap();
    assert_eq!(machine.status, "running");
    assert_eq!(machine.name, "Lathe 1");
    assert!(machine.photo_url.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_machine_list_filters_and_orders_by_name(pool: PgPool) {
    MachineRepo::create(&pool, &new_machine("Press", "Bay B")).await.unwrap();
    let lathe = MachineRepo::create(&pool, &new_machine("Lathe", "Bay A")).await.unwrap();
    MachineRepo::create(&pool, &new_machine("Conveyor", "Dock")).await.unwrap();
    MachineRepo::update_status(&pool, lathe.id, "breakdown").await.unwrap();

    let all = MachineRepo::list_filtered(&pool, &MachineListParams::default())
        .await
        .unwrap();
    let names: Vec<&str> = all.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Conveyor", "Lathe", "Press"]);

    let broken = MachineRepo::list_filtered(
        &pool,
        &MachineListParams {
            status: Some("breakdown".to_string()),
            search: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].id, lathe.id);

    let bay = MachineRepo::list_filtered(
        &pool,
        &MachineListParams {
            status: None,
            search: Some("bay".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(bay.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_machine_update_applies_only_given_fields(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Mill", "Bay C")).await.unwrap();
    let updated = MachineRepo::update(
        &pool,
        machine.id,
        &UpdateMachine {
            notes: Some("Coolant topped up".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Mill");
    assert_eq!(updated.notes.as_deref(), Some("Coolant topped up"));
    assert!(updated.updated_at >= machine.updated_at);

    assert!(MachineRepo::update(&pool, 999_999, &UpdateMachine::default())
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_machine_status_rejected_by_check(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Drill", "Bay D")).await.unwrap();
    let err = MachineRepo::update_status(&pool, machine.id, "exploded")
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23514"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_machine_cascades(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Saw", "Yard")).await.unwrap();
    let wo = WorkOrderRepo::create(&pool, &new_work_order(machine.id, "Blade"))
        .await
        .unwrap();
    let log = DowntimeLogRepo::create(&pool, &new_downtime(machine.id), Utc::now())
        .await
        .unwrap();

    assert!(MachineRepo::delete(&pool, machine.id).await.unwrap());
    assert!(WorkOrderRepo::find_by_id(&pool, wo.id).await.unwrap().is_none());
    assert!(DowntimeLogRepo::find_by_id(&pool, log.id).await.unwrap().is_none());
    assert!(!MachineRepo::delete(&pool, machine.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Work orders
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_work_order_defaults(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Pump", "Plant")).await.unwrap();
    let wo = WorkOrderRepo::create(&pool, &new_work_order(machine.id, "Leak"))
        .await
        .unwrap();
    assert_eq!(wo.status, "open");
    assert_eq!(wo.priority, "medium");
    assert_eq!(wo.issue_type, "other");
    assert!(wo.completed_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_work_order_fk_violation(pool: PgPool) {
    let err = WorkOrderRepo::create(&pool, &new_work_order(424_242, "Orphan"))
        .await
        .unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.code().as_deref(), Some("23503"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_completed_at_requires_terminal_status(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Fan", "Roof")).await.unwrap();
    let wo = WorkOrderRepo::create(&pool, &new_work_order(machine.id, "Noise"))
        .await
        .unwrap();

    let err = WorkOrderRepo::update(&pool, wo.id, &UpdateWorkOrder::default(), Some(Utc::now()))
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().unwrap().constraint(),
        Some("ck_work_orders_completed_at")
    );

    let done = WorkOrderRepo::update(
        &pool,
        wo.id,
        &UpdateWorkOrder {
            status: Some("completed".to_string()),
            ..Default::default()
        },
        Some(Utc::now()),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(done.status, "completed");
    assert!(done.completed_at.is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_work_order_list_filters(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Boiler", "Basement"))
        .await
        .unwrap();
    let a = WorkOrderRepo::create(&pool, &new_work_order(machine.id, "Pressure valve"))
        .await
        .unwrap();
    let b = WorkOrderRepo::create(&pool, &new_work_order(machine.id, "Annual inspection"))
        .await
        .unwrap();
    WorkOrderRepo::update(
        &pool,
        b.id,
        &UpdateWorkOrder {
            status: Some("cancelled".to_string()),
            ..Default::default()
        },
        Some(Utc::now()),
    )
    .await
    .unwrap();

    let active = WorkOrderRepo::list_filtered(
        &pool,
        &WorkOrderQuery {
            statuses: Some(vec!["open", "assigned", "in_progress"]),
            limit: 50,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].work_order.id, a.id);
    assert_eq!(active[0].machine_name, "Boiler");

    let found = WorkOrderRepo::list_filtered(
        &pool,
        &WorkOrderQuery {
            search: Some("VALVE"),
            limit: 50,
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 1);

    let recent = WorkOrderRepo::list_recent(&pool, 1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].work_order.id, b.id);
}

// ---------------------------------------------------------------------------
// PM schedules
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pm_mark_complete_writes_both_dates(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Compressor", "Plant"))
        .await
        .unwrap();
    let schedule = PmScheduleRepo::create(
        &pool,
        &CreatePmSchedule {
            machine_id: machine.id,
            task_name: "Change filter".to_string(),
            description: None,
            frequency: None,
            next_due_date: Some(date(2024, 1, 1)),
            is_active: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(schedule.frequency, "monthly");
    assert!(schedule.is_active);

    let completion = complete_pm(Frequency::Monthly, date(2024, 1, 15)).unwrap();
    let updated = PmScheduleRepo::mark_complete(&pool, schedule.id, &completion)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.last_completed_date, Some(date(2024, 1, 15)));
    assert_eq!(updated.next_due_date, Some(date(2024, 2, 15)));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pm_list_orders_undated_last(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Chiller", "Roof")).await.unwrap();
    for (name, due) in [
        ("Undated", None),
        ("Later", Some(date(2024, 6, 1))),
        ("Sooner", Some(date(2024, 3, 1))),
    ] {
        PmScheduleRepo::create(
            &pool,
            &CreatePmSchedule {
                machine_id: machine.id,
                task_name: name.to_string(),
                description: None,
                frequency: Some("weekly".to_string()),
                next_due_date: due,
                is_active: Some(true),
            },
        )
        .await
        .unwrap();
    }

    let rows = PmScheduleRepo::list_with_machine(&pool).await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.schedule.task_name.as_str()).collect();
    assert_eq!(names, vec!["Sooner", "Later", "Undated"]);
    assert!(rows.iter().all(|r| r.machine_name == "Chiller"));
}

// ---------------------------------------------------------------------------
// Downtime logs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_active_log_violates_unique_index(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Kiln", "Shed")).await.unwrap();
    DowntimeLogRepo::create(&pool, &new_downtime(machine.id), Utc::now())
        .await
        .unwrap();

    let err = DowntimeLogRepo::create(&pool, &new_downtime(machine.id), Utc::now())
        .await
        .unwrap_err();
    assert_eq!(
        err.as_database_error().unwrap().constraint(),
        Some("uq_downtime_logs_active_machine")
    );

    let available = MachineRepo::list_available(&pool).await.unwrap();
    assert!(available.iter().all(|m| m.id != machine.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_close_is_guarded(pool: PgPool) {
    let machine = MachineRepo::create(&pool, &new_machine("Oven", "Line 2")).await.unwrap();
    let started = Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap();
    let log = DowntimeLogRepo::create(
        &pool,
        &CreateDowntimeLog {
            started_at: Some(started),
            ..new_downtime(machine.id)
        },
        Utc::now(),
    )
    .await
    .unwrap();
    assert!(log.is_active());

    let closed = close_downtime(
        log.started_at,
        log.ended_at,
        started + chrono::Duration::minutes(125),
    )
    .unwrap();
    let first = DowntimeLogRepo::close(&pool, log.id, &closed).await.unwrap().unwrap();
    assert_eq!(first.duration_minutes, Some(125));
    assert!(!first.is_active());

    assert!(DowntimeLogRepo::close(&pool, log.id, &closed).await.unwrap().is_none());
    assert_eq!(
        DowntimeLogRepo::count_other_active(&pool, machine.id, log.id).await.unwrap(),
        0
    );
    assert_eq!(
        DowntimeLogRepo::list_closed_durations(&pool).await.unwrap(),
        vec![125]
    );

    // A fresh log may be opened once the previous one is closed.
    DowntimeLogRepo::create(&pool, &new_downtime(machine.id), Utc::now())
        .await
        .unwrap();
    assert_eq!(DowntimeLogRepo::list_active(&pool).await.unwrap().len(), 1);
    assert_eq!(DowntimeLogRepo::list_recent(&pool, 100).await.unwrap().len(), 2);
}
