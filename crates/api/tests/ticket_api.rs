//! Integration tests for the ticket lifecycle over HTTP.
//!
//! Departments: `dept1` (requester), `dept2` (handling team with `u2`, `u3`
//! and admin `admin2`), `dept3` (escalation target with `u4`).

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, cast, open_ticket};
use helpdesk_db::repositories::NotificationRepo;
use serde_json::json;
use sqlx::PgPool;

async fn unread(pool: &PgPool, user_id: i64) -> i64 {
    NotificationRepo::unread_count(pool, user_id).await.unwrap()
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_ticket_defaults_and_notifies_destination(pool: PgPool) {
    let mut app = build_test_app(pool.clone());
    let c = cast(&pool).await;

    let response = app
        .post(
            "/api/v1/tickets",
            &c.u1,
            json!({
                "title": "  VPN drops every hour  ",
                "description": "Since Monday",
                "destination_department_id": c.dept2,
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let ticket = body_json(response).await["data"].clone();
    assert_eq!(ticket["title"], "VPN drops every hour");
    assert_eq!(ticket["status"], "open");
    assert_eq!(ticket["priority"], "medium");
    assert_eq!(ticket["created_by"], c.u1.id);
    assert_eq!(ticket["source_department_id"], c.dept1);
    assert!(ticket["assigned_to"].is_null());

    let events = app.drain_events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].name(), "ticket.created");

    assert_eq!(unread(&pool, c.u2.id).await, 1);
    assert_eq!(unread(&pool, c.u3.id).await, 1);
    assert_eq!(unread(&pool, c.admin2.id).await, 1);
    assert_eq!(unread(&pool, c.u1.id).await, 0, "creator is not notified");
    assert_eq!(unread(&pool, c.u4.id).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_ticket_pushes_live_notification(pool: PgPool) {
    let mut app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let mut live = app.state.ws_manager.subscribe("u2-tab".into(), c.u2.id).await;

    let ticket_id = open_ticket(&app, &c.u1, c.dept2).await;
    app.drain_events().await;

    let axum::extract::ws::Message::Text(text) = live.try_recv().unwrap() else {
        panic!("expected a text frame");
    };
    let frame: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
    assert_eq!(frame["event"], "newNotification");
    assert_eq!(frame["payload"]["notification_type"], "new_ticket");
    assert_eq!(frame["payload"]["ticket_id"], ticket_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_without_department_is_rejected(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;

    let response = app
        .post(
            "/api/v1/tickets",
            &c.nomad,
            json!({ "title": "Help", "description": "Please", "destination_department_id": c.dept2 }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "UNASSIGNED_DEPARTMENT");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_blank_title_is_rejected(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;

    let response = app
        .post(
            "/api/v1/tickets",
            &c.u1,
            json!({ "title": "   ", "description": "x", "destination_department_id": c.dept2 }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_missing_fields_is_bad_request(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;

    let response = app
        .post("/api/v1/tickets", &c.u1, json!({ "title": "No description" }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_to_unknown_department_is_not_found(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;

    let response = app
        .post(
            "/api/v1/tickets",
            &c.u1,
            json!({ "title": "t", "description": "d", "destination_department_id": 9999 }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_requests_without_token_are_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);

    let response = app
        .request(Method::GET, "/api/v1/tickets", None, None)
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Full lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claim_escalate_reassign_close(pool: PgPool) {
    let mut app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;

    // Claim by u2; u3 then loses.
    let response = app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u2, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let claimed = body_json(response).await["data"].clone();
    assert_eq!(claimed["status"], "in_progress");
    assert_eq!(claimed["assigned_to"], c.u2.id);

    let response = app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u3, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "ALREADY_ASSIGNED");

    // Escalate by the assignee.
    let response = app
        .post(
            &format!("/api/v1/tickets/{id}/escalate"),
            &c.u2,
            json!({ "reason": "Needs facilities" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let escalated = body_json(response).await["data"].clone();
    assert_eq!(escalated["status"], "escalated");
    assert_eq!(escalated["escalation_reason"], "Needs facilities");
    assert_eq!(escalated["escalated_by"], c.u2.id);
    assert!(!escalated["escalation_date"].is_null());

    // Reassign by the destination admin.
    let response = app
        .post(
            &format!("/api/v1/tickets/{id}/reassign"),
            &c.admin2,
            json!({ "assignee_id": c.u4.id, "department_id": c.dept3 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let reassigned = body_json(response).await["data"].clone();
    assert_eq!(reassigned["status"], "in_progress");
    assert_eq!(reassigned["assigned_to"], c.u4.id);
    assert_eq!(reassigned["destination_department_id"], c.dept3);
    assert_eq!(reassigned["reassigned_by"], c.admin2.id);

    // The previous assignee can no longer close it.
    let response = app.post(&format!("/api/v1/tickets/{id}/close"), &c.u2, json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.post(&format!("/api/v1/tickets/{id}/close"), &c.u4, json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let closed = body_json(response).await["data"].clone();
    assert_eq!(closed["status"], "closed");
    assert_eq!(closed["closed_by"], c.u4.id);
    assert!(!closed["resolution_date"].is_null());

    // Closed is terminal.
    let response = app.post(&format!("/api/v1/tickets/{id}/close"), &c.u4, json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    let names: Vec<&str> = app
        .drain_events()
        .await
        .iter()
        .map(|e| e.name())
        .collect();
    assert_eq!(
        names,
        vec![
            "ticket.created",
            "ticket.status_changed",
            "ticket.status_changed",
            "ticket.status_changed",
            "ticket.status_changed",
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claim_from_other_department_is_forbidden(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;

    let response = app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u4, json!({})).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_escalate_requires_reason_and_assignee(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;
    app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u2, json!({})).await;

    let response = app
        .post(&format!("/api/v1/tickets/{id}/escalate"), &c.u2, json!({ "reason": "" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = app
        .post(&format!("/api/v1/tickets/{id}/escalate"), &c.u2, json!({ "reason": "   " }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post(&format!("/api/v1/tickets/{id}/escalate"), &c.u3, json!({ "reason": "Mine now" }))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reassign_requires_destination_admin_and_escalation(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;
    app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u2, json!({})).await;

    let body = json!({ "assignee_id": c.u3.id, "department_id": c.dept2 });

    // Not escalated yet.
    let response = app
        .post(&format!("/api/v1/tickets/{id}/reassign"), &c.admin2, body.clone())
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    app.post(&format!("/api/v1/tickets/{id}/escalate"), &c.u2, json!({ "reason": "stuck" }))
        .await;

    // A plain member of the destination department is not enough.
    let response = app
        .post(&format!("/api/v1/tickets/{id}/reassign"), &c.u3, body.clone())
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown assignee.
    let response = app
        .post(
            &format!("/api/v1/tickets/{id}/reassign"),
            &c.admin2,
            json!({ "assignee_id": 99999, "department_id": c.dept2 }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_destination_admin_can_close_escalated_ticket(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;
    app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u2, json!({})).await;
    app.post(&format!("/api/v1/tickets/{id}/escalate"), &c.u2, json!({ "reason": "stuck" }))
        .await;

    let response = app.post(&format!("/api/v1/tickets/{id}/close"), &c.admin2, json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["closed_by"], c.admin2.id);
}

// ---------------------------------------------------------------------------
// Generic status write
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_status_is_gated_like_close(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;
    app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u2, json!({})).await;
    let uri = format!("/api/v1/tickets/{id}/status");

    // A department peer who is not the assignee.
    let response = app.put(&uri, &c.u3, json!({ "status": "closed" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The creator's department is not the destination.
    let response = app.put(&uri, &c.u1, json!({ "status": "closed" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Escalation needs a reason, so it has its own endpoint.
    let response = app.put(&uri, &c.u2, json!({ "status": "escalated" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_STATE");

    let response = app.put(&uri, &c.u2, json!({ "status": "closed" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "closed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_set_status_rejects_unknown_status(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;

    let response = app
        .put(&format!("/api/v1/tickets/{id}/status"), &c.u2, json!({ "status": "pending" }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Fan-out on transitions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_change_notifies_stakeholders_except_actor(pool: PgPool) {
    let mut app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;
    app.drain_events().await;

    app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u2, json!({})).await;
    app.drain_events().await;

    // u1 had no notification from creation; u3 and admin2 already had one.
    assert_eq!(unread(&pool, c.u1.id).await, 1);
    assert_eq!(unread(&pool, c.u3.id).await, 2);
    assert_eq!(unread(&pool, c.admin2.id).await, 2);
    assert_eq!(unread(&pool, c.u2.id).await, 1, "the claimant only has the creation notice");

    let list = NotificationRepo::list_for_user(&pool, c.u1.id, false, 10, 0)
        .await
        .unwrap();
    assert_eq!(list[0].notification_type, "status_change");
    assert_eq!(list[0].metadata["from"], "open");
    assert_eq!(list[0].metadata["to"], "in_progress");
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_ticket_visibility(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;
    let uri = format!("/api/v1/tickets/{id}");

    assert_eq!(app.get(&uri, &c.u1).await.status(), StatusCode::OK);
    assert_eq!(app.get(&uri, &c.u3).await.status(), StatusCode::OK);
    assert_eq!(app.get(&uri, &c.outsider).await.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        app.get("/api/v1/tickets/99999", &c.u1).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_tickets_by_scope(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;
    open_ticket(&app, &c.u1, c.dept3).await;
    app.post(&format!("/api/v1/tickets/{id}/claim"), &c.u2, json!({})).await;

    let created = body_json(app.get("/api/v1/tickets", &c.u1).await).await;
    assert_eq!(created["data"].as_array().unwrap().len(), 2);

    let assigned = body_json(app.get("/api/v1/tickets?scope=assigned", &c.u2).await).await;
    assert_eq!(assigned["data"].as_array().unwrap().len(), 1);
    assert_eq!(assigned["data"][0]["id"], id);

    let department = body_json(app.get("/api/v1/tickets?scope=department", &c.u4).await).await;
    assert_eq!(department["data"].as_array().unwrap().len(), 1);

    let open_only =
        body_json(app.get("/api/v1/tickets?status=open", &c.u1).await).await;
    assert_eq!(open_only["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_stakeholders_endpoint(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;

    let json = body_json(app.get(&format!("/api/v1/tickets/{id}/stakeholders"), &c.u1).await).await;

    let mut expected = vec![c.u1.id, c.u2.id, c.u3.id, c.admin2.id];
    expected.sort();
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    assert_eq!(ids, expected);
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_requires_admin_and_cascades(pool: PgPool) {
    let mut app = build_test_app(pool.clone());
    let c = cast(&pool).await;
    let id = open_ticket(&app, &c.u1, c.dept2).await;
    app.drain_events().await;
    let uri = format!("/api/v1/tickets/{id}");

    let response = app.delete(&uri, &c.u1).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.delete(&uri, &c.admin2).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["id"], id);

    assert_eq!(unread(&pool, c.u2.id).await, 0, "notifications cascade");
    assert_eq!(app.delete(&uri, &c.admin2).await.status(), StatusCode::NOT_FOUND);
}
