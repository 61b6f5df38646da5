use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::scheduling::router::{assign_handler, AssignShiftRequest};
use crate::scheduling::{InMemorySchedulingRepository, RecordingNotifier, SchedulingService};
use crate::scheduling::VacationOverlapPolicy;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

#[tokio::test]
async fn assign_route_creates_assignment() {
    let (service, repository, notifier) = build_service();
    let shift = create_shift(&service, 3, 9, 17);
    let router = router_with_service(service);

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/shifts/{}/assignments", shift.id),
            json!({ "employee_id": EMPLOYEE, "manager_id": MANAGER }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::CREATED);
    let payload = read_json_body(response).await;
    assert_eq!(payload["assigned"], json!(true));
    assert_eq!(payload["assignment"]["status"], json!("ASSIGNED"));
    assert_eq!(payload["assignment"]["employee_id"], json!(EMPLOYEE));
    assert_eq!(repository.assignment_count(), 1);
    assert_eq!(notifier.events().len(), 1);
}

#[tokio::test]
async fn assign_handler_maps_wrong_manager_to_forbidden() {
    let (service, _, _) = build_service();
    let shift = create_shift(&service, 4, 9, 17);

    let response = assign_handler::<InMemorySchedulingRepository, RecordingNotifier>(
        State(Arc::new(service)),
        Path(shift.id.0.clone()),
        Ok(axum::Json(AssignShiftRequest {
            employee_id: id(EMPLOYEE),
            manager_id: id(OTHER_MANAGER),
        })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("not authorized"));
}

#[tokio::test]
async fn assign_route_maps_conflict_and_missing_shift() {
    let (service, _, _) = build_service();
    let morning = create_shift(&service, 5, 8, 12);
    let overlapping = create_shift(&service, 5, 11, 19);
    service
        .assign_shift(&morning.id, &id(EMPLOYEE), &id(MANAGER))
        .expect("seed assignment");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/shifts/{}/assignments", overlapping.id),
            json!({ "employee_id": EMPLOYEE, "manager_id": MANAGER }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/shifts/shf-missing/assignments",
            json!({ "employee_id": EMPLOYEE, "manager_id": MANAGER }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_shift_route_validates_window() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/shifts",
            json!({
                "created_by": MANAGER,
                "date": "2025-11-21",
                "start_time": "09:00:00",
                "end_time": "17:00:00",
                "location_id": "loc-downtown"
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json_body(response).await;
    let shift_id = created["id"].as_str().expect("shift id").to_string();

    let response = router
        .clone()
        .oneshot(get_request(&format!("/api/v1/shifts/{shift_id}")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/shifts",
            json!({
                "created_by": MANAGER,
                "date": "2025-11-21",
                "start_time": "17:00:00",
                "end_time": "09:00:00"
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn vacation_routes_cover_submit_and_approve() {
    let (service, _, notifier) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/vacations",
            json!({
                "employee_id": EMPLOYEE,
                "start_date": "2025-12-01",
                "end_date": "2025-12-05",
                "reason": "Holiday"
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CREATED);
    let submitted = read_json_body(response).await;
    assert_eq!(submitted["status"], json!("PENDING"));
    let request_id = submitted["id"].as_str().expect("request id").to_string();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/vacations/{request_id}/approve"),
            json!({ "manager_id": MANAGER, "comments": "Approved" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = read_json_body(response).await;
    assert_eq!(outcome["request"]["status"], json!("APPROVED"));
    assert_eq!(outcome["request"]["reviewed_by"], json!(MANAGER));
    assert_eq!(outcome["request"]["review_notes"], json!("Approved"));
    assert_eq!(outcome["overlapping_approved"], json!([]));

    let response = router
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/vacations/{request_id}/reject"),
            json!({ "manager_id": MANAGER }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(notifier.events().len(), 1);
}

#[tokio::test]
async fn vacation_routes_reject_bad_ranges_and_foreign_cancels() {
    let (service, _, _) = build_service();
    let request = pending_vacation(&service, EMPLOYEE, 10, 12);
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/vacations",
            json!({
                "employee_id": EMPLOYEE,
                "start_date": "2025-12-05",
                "end_date": "2025-12-01"
            }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/vacations/{}/cancel", request.id),
            json!({ "employee_id": OTHER_EMPLOYEE }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = router
        .oneshot(get_request("/api/v1/vacations/vac-unknown"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn team_and_schedule_routes_return_views() {
    let (service, _, _) = build_service();
    let shift = create_shift(&service, 18, 9, 17);
    service
        .assign_shift(&shift.id, &id(EMPLOYEE), &id(MANAGER))
        .expect("seed assignment");
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(get_request(&format!("/api/v1/managers/{MANAGER}/team")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let team = read_json_body(response).await;
    assert_eq!(team["manager_id"], json!(MANAGER));
    assert_eq!(team["members"][0]["id"], json!(EMPLOYEE));
    assert_eq!(team["members"][0]["name"], json!("linus Tester"));

    let response = router
        .clone()
        .oneshot(get_request(&format!(
            "/api/v1/employees/{EMPLOYEE}/shifts?from=2025-11-18&to=2025-11-18"
        )))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::OK);
    let schedule = read_json_body(response).await;
    assert_eq!(schedule.as_array().map(Vec::len), Some(1));
    assert_eq!(schedule[0]["shift"]["id"], json!(shift.id.0));

    let response = router
        .oneshot(get_request(&format!("/api/v1/managers/{EMPLOYEE}/team")))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repository_outage_maps_to_internal_error() {
    let service = SchedulingService::new(
        Arc::new(UnavailableRepository),
        Arc::new(FailingNotifier),
        VacationOverlapPolicy::Record,
    );
    let router = crate::scheduling::scheduling_router(Arc::new(service));

    let response = router
        .oneshot(get_request("/api/v1/shifts/shf-1"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_requests_keep_the_json_error_body() {
    let (service, _, _) = build_service();
    let router = router_with_service(service);

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/vacations")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"employee_id\": "))
                .expect("request builds"),
        )
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/vacations",
            json!({ "employee_id": EMPLOYEE, "start_date": "2025-11-20" }),
        ))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .unwrap_or_default()
        .contains("end_date"));

    let response = router
        .oneshot(get_request(&format!(
            "/api/v1/employees/{EMPLOYEE}/shifts?from=next-tuesday"
        )))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    assert!(payload["error"].is_string());
}
