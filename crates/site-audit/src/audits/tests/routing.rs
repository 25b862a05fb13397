use super::common::*;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use crate::audits::penalty::{PenaltyEstimator, PenaltyTable};
use crate::audits::router::{
    assessment_handler, estimate_handler, ranking_handler, scoring_router, EstimateRequest,
};
use crate::audits::service::AuditScoringService;

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<axum::body::Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize body"),
        ))
        .expect("request builds")
}

#[tokio::test]
async fn estimate_route_prices_payload_with_inline_table() {
    let router = scoring_router(Arc::new(build_service()));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/penalty/estimate",
            json!({
                "evaluation": {
                    "id": "ev-inline",
                    "work_id": "w-1",
                    "employees_count": 50,
                    "status": "completed",
                    "type": "obra",
                    "answers": [
                        { "question_id": "q1", "answer": "nao", "question": { "weight": 1 } },
                        { "question_id": "q2", "answer": "nao", "question": { "weight": 1 } },
                        { "question_id": "q3", "answer": "sim", "question": { "weight": 3 } }
                    ]
                },
                "penalty_table": [
                    { "weight": 1, "employees_min": 0, "employees_max": 100, "min_value": 100, "max_value": 500 }
                ]
            }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_close(body["penalty"]["min"].as_f64().expect("min"), 212.82);
    assert_close(body["penalty"]["max"].as_f64().expect("max"), 1064.1);
    assert_eq!(body["penalty"]["max_label"], "1,064.10");
    assert_eq!(body["conformity"]["non_compliant"], 2);
    assert_close(
        body["conformity"]["rate"].as_f64().expect("rate"),
        100.0 / 3.0,
    );
}

#[tokio::test]
async fn estimate_route_rejects_inline_table_with_inverted_amounts() {
    let router = scoring_router(Arc::new(build_service()));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/penalty/estimate",
            json!({
                "evaluation": {
                    "id": "ev-inline",
                    "work_id": "w-1",
                    "employees_count": 50,
                    "status": "completed",
                    "type": "obra",
                    "answers": [
                        { "question_id": "q1", "answer": "nao", "question": { "weight": 1 } }
                    ]
                },
                "penalty_table": [
                    { "weight": 1, "employees_min": 0, "employees_max": 100, "min_value": 500, "max_value": 100 }
                ]
            }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("row 1"));
}

#[tokio::test]
async fn estimate_route_accepts_float_encoded_headcount() {
    let router = scoring_router(Arc::new(build_service()));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/penalty/estimate",
            json!({
                "evaluation": {
                    "id": "ev-float",
                    "work_id": "w-1",
                    "employees_count": 150.0,
                    "status": "completed",
                    "type": "obra",
                    "answers": [
                        { "question_id": "q1", "answer": "nao", "question": { "weight": 2.0 } }
                    ]
                }
            }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["penalty"]["employees_count"], 150);
    assert_eq!(body["penalty"]["headcount_defaulted"], false);
    // 101..=500 band for weight 2.
    assert_close(
        body["penalty"]["min"].as_f64().expect("min"),
        600.0 * 1.0641,
    );
}

#[tokio::test]
async fn estimate_handler_rejects_non_positive_weight() {
    let service = Arc::new(build_service());
    let request: EstimateRequest = serde_json::from_value(json!({
        "evaluation": {
            "id": "ev-bad",
            "work_id": "w-1",
            "status": "draft",
            "type": "obra",
            "answers": [
                { "question_id": "q1", "answer": "nao", "question": { "weight": -2 } }
            ]
        }
    }))
    .expect("request parses");

    let response = estimate_handler(State(service), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("q1"));
}

#[tokio::test]
async fn assessment_handler_returns_not_found_for_unknown_id() {
    let service = Arc::new(build_service());

    let response = assessment_handler(State(service), Path("nope".to_string())).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assessment_route_uses_source_table() {
    let router = scoring_router(Arc::new(build_service()));

    let response = router
        .oneshot(
            Request::get("/api/v1/evaluations/ev-1/assessment")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["evaluation_id"], "ev-1");
    assert_eq!(body["status_label"], "Completed");
    // Two weight-2 non-conformities for 30 employees: 2 x 300 / 2 x 1200.
    assert_close(
        body["penalty"]["min"].as_f64().expect("min"),
        600.0 * 1.0641,
    );
    assert_eq!(body["penalty"]["headcount_defaulted"], false);
}

#[tokio::test]
async fn ranking_route_lists_stored_sites() {
    let router = scoring_router(Arc::new(build_service()));

    let response = router
        .oneshot(
            Request::get("/api/v1/ranking")
                .body(axum::body::Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total_sites"], 2);
    assert_eq!(body["entries"][0]["work_number"], "OB-002");
    assert_eq!(body["entries"][0]["position"], 1);
    assert_eq!(body["entries"][1]["work_name"], "Residencial Aurora");
}

#[tokio::test]
async fn ranking_post_ranks_supplied_payloads() {
    let router = scoring_router(Arc::new(build_service()));

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/ranking",
            json!({
                "evaluations": [
                    {
                        "id": "a", "work_id": "w-9", "status": "completed", "type": "obra",
                        "answers": [
                            { "question_id": "q1", "answer": "sim", "question": { "weight": 1 } },
                            { "question_id": "q2", "answer": "nao", "question": { "weight": 1 } }
                        ]
                    },
                    {
                        "id": "b", "work_id": "w-9", "status": "completed", "type": "alojamento",
                        "answers": [
                            { "question_id": "q1", "answer": "nao", "question": { "weight": 1 } }
                        ]
                    }
                ]
            }),
        ))
        .await
        .expect("route responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["total_sites"], 1);
    assert_close(
        body["entries"][0]["conformity_rate"]
            .as_f64()
            .expect("rate"),
        50.0,
    );
}

#[tokio::test]
async fn ranking_handler_reports_unavailable_repository() {
    let service = Arc::new(AuditScoringService::new(
        Arc::new(UnavailableRepository),
        Arc::new(PenaltyTable::default()),
        PenaltyEstimator::default(),
    ));

    let response = ranking_handler(State(service)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
