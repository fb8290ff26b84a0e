//! HTTP-level integration tests for the `/downtime` endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, post_empty, post_json};
use sqlx::PgPool;

async fn machine_status(pool: &PgPool, id: i64) -> String {
    let (app, _photos) = common::build_test_app(pool.clone()).await;
    let json = body_json(get(app, &format!("/api/v1/machines/{id}")).await).await;
    json["data"]["status"].as_str().unwrap().to_string()
}

async fn start(pool: &PgPool, body: serde_json::Value) -> axum::response::Response {
    let (app, _photos) = common::build_test_app(pool.clone()).await;
    post_json(app, "/api/v1/downtime", body).await
}

async fn end(pool: &PgPool, id: i64, body: serde_json::Value) -> axum::response::Response {
    let (app, _photos) = common::build_test_app(pool.clone()).await;
    post_json(app, &format!("/api/v1/downtime/{id}/end"), body).await
}

// ---------------------------------------------------------------------------
// Start / end flow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_sets_machine_breakdown_and_second_start_conflicts(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Extruder").await;

    let response = start(
        &pool,
        serde_json::json!({"machine_id": machine_id, "reason": "Motor overheating"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["data"]["ended_at"].is_null());
    assert!(json["data"]["duration_minutes"].is_null());

    assert_eq!(machine_status(&pool, machine_id).await, "breakdown");

    let response = start(
        &pool,
        serde_json::json!({"machine_id": machine_id, "reason": "Again"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_records_duration_and_restores_machine(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Extruder").await;

    let response = start(
        &pool,
        serde_json::json!({
            "machine_id": machine_id,
            "reason": "Die change",
            "started_at": "2024-05-06T08:00:00Z",
        }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = end(&pool, id, serde_json::json!({"ended_at": "2024-05-06T10:05:00Z"})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["duration_minutes"], 125);
    assert!(json["data"]["ended_at"].is_string());

    assert_eq!(machine_status(&pool, machine_id).await, "running");

    let response = end(&pool, id, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_before_start_returns_400(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Extruder").await;
    let response = start(
        &pool,
        serde_json::json!({
            "machine_id": machine_id,
            "reason": "Jam",
            "started_at": "2024-05-06T08:00:00Z",
        }),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = end(&pool, id, serde_json::json!({"ended_at": "2024-05-06T07:00:00Z"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_with_no_body_closes_now(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Extruder").await;
    let response = start(
        &pool,
        serde_json::json!({"machine_id": machine_id, "reason": "Sensor fault"}),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let (app, _photos) = common::build_test_app(pool.clone()).await;
    let response = post_empty(app, &format!("/api/v1/downtime/{id}/end")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["ended_at"].is_string());
    assert_eq!(json["data"]["duration_minutes"], 0);
    assert_eq!(machine_status(&pool, machine_id).await, "running");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn future_start_is_rejected_and_machine_untouched(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Extruder").await;

    let response = start(
        &pool,
        serde_json::json!({
            "machine_id": machine_id,
            "reason": "Planned outage",
            "started_at": "2099-01-01T00:00:00Z",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(machine_status(&pool, machine_id).await, "running");

    let response = start(
        &pool,
        serde_json::json!({"machine_id": machine_id, "reason": "Motor overheating"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn future_end_is_rejected_and_log_stays_active(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Extruder").await;
    let response = start(
        &pool,
        serde_json::json!({"machine_id": machine_id, "reason": "Jam"}),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = end(&pool, id, serde_json::json!({"ended_at": "2099-01-01T00:00:00Z"})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert_eq!(machine_status(&pool, machine_id).await, "breakdown");

    let response = end(&pool, id, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_missing_log_returns_404(pool: PgPool) {
    let response = end(&pool, 999999, serde_json::json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn blank_reason_returns_400(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Extruder").await;
    let response = start(
        &pool,
        serde_json::json!({"machine_id": machine_id, "reason": ""}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_on_missing_machine_returns_404(pool: PgPool) {
    let response = start(
        &pool,
        serde_json::json!({"machine_id": 999999, "reason": "Ghost"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn decommissioned_machine_cannot_break_down(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Retired").await;
    let (app, _photos) = common::build_test_app(pool.clone()).await;
    common::put_json(
        app,
        &format!("/api/v1/machines/{machine_id}"),
        serde_json::json!({"status": "decommissioned"}),
    )
    .await;

    let response = start(
        &pool,
        serde_json::json!({"machine_id": machine_id, "reason": "Fault"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_splits_active_and_history_with_rollup(pool: PgPool) {
    let a = common::create_machine(&pool, "Alpha").await;
    let b = common::create_machine(&pool, "Bravo").await;

    let response = start(
        &pool,
        serde_json::json!({
            "machine_id": a,
            "reason": "Sensor fault",
            "started_at": "2024-05-06T08:00:00Z",
        }),
    )
    .await;
    let closed_id = body_json(response).await["data"]["id"].as_i64().unwrap();
    end(&pool, closed_id, serde_json::json!({"ended_at": "2024-05-06T08:30:00Z"})).await;

    start(&pool, serde_json::json!({"machine_id": b, "reason": "Belt snapped"})).await;

    let (app, _photos) = common::build_test_app(pool).await;
    let response = get(app, "/api/v1/downtime").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    let active = json["data"]["active"].as_array().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0]["machine_name"], "Bravo");
    assert!(active[0]["elapsed_minutes"].is_number());
    assert!(active[0]["elapsed_label"].is_string());

    let history = json["data"]["history"].as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["id"], closed_id);
    assert_eq!(history[0]["duration_label"], "30m");

    assert_eq!(json["data"]["rollup"]["active"], 1);
    assert_eq!(json["data"]["rollup"]["historical"], 1);
    assert_eq!(json["data"]["rollup"]["total_hours"], 0.5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_downtime_returns_204_then_404(pool: PgPool) {
    let machine_id = common::create_machine(&pool, "Extruder").await;
    let response = start(
        &pool,
        serde_json::json!({"machine_id": machine_id, "reason": "Test"}),
    )
    .await;
    let id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let (app, _photos) = common::build_test_app(pool.clone()).await;
    assert_eq!(
        delete(app, &format!("/api/v1/downtime/{id}")).await.status(),
        StatusCode::NO_CONTENT
    );

    let (app, _photos) = common::build_test_app(pool).await;
    assert_eq!(
        delete(app, &format!("/api/v1/downtime/{id}")).await.status(),
        StatusCode::NOT_FOUND
    );
}
