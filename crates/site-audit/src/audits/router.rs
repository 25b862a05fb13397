use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{Evaluation, EvaluationId};
use super::inbound::{evaluations_from_payloads, EvaluationPayload};
use super::penalty::{PenaltyBracket, PenaltyTable};
use super::report::RankingView;
use super::repository::{EvaluationRepository, PenaltyTableSource, RepositoryError};
use super::service::{AuditScoringService, ScoringServiceError};

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub evaluation: EvaluationPayload,
    #[serde(default)]
    pub penalty_table: Option<Vec<PenaltyBracket>>,
}

#[derive(Debug, Deserialize)]
pub struct RankingRequest {
    #[serde(default)]
    pub evaluations: Vec<EvaluationPayload>,
}

/// Router builder exposing the scoring engine over HTTP.
pub fn scoring_router<E, T>(service: Arc<AuditScoringService<E, T>>) -> Router
where
    E: EvaluationRepository + 'static,
    T: PenaltyTableSource + 'static,
{
    Router::new()
        .route("/api/v1/penalty/estimate", post(estimate_handler::<E, T>))
        .route(
            "/api/v1/evaluations/:evaluation_id/assessment",
            get(assessment_handler::<E, T>),
        )
        .route(
            "/api/v1/ranking",
            get(ranking_handler::<E, T>).post(rank_payload_handler::<E, T>),
        )
        .with_state(service)
}

pub(crate) async fn estimate_handler<E, T>(
    State(service): State<Arc<AuditScoringService<E, T>>>,
    axum::Json(request): axum::Json<EstimateRequest>,
) -> Response
where
    E: EvaluationRepository + 'static,
    T: PenaltyTableSource + 'static,
{
    let EstimateRequest {
        evaluation,
        penalty_table,
    } = request;

    let result = Evaluation::try_from(evaluation)
        .map_err(ScoringServiceError::from)
        .and_then(|evaluation| {
            let table = penalty_table.map(PenaltyTable::try_from_brackets).transpose()?;
            service.assess_evaluation(&evaluation, table.as_ref().map(PenaltyTable::brackets))
        });

    match result {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.to_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assessment_handler<E, T>(
    State(service): State<Arc<AuditScoringService<E, T>>>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
    T: PenaltyTableSource + 'static,
{
    let id = EvaluationId(evaluation_id);
    match service.assess(&id) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment.to_view())).into_response(),
        Err(ScoringServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": format!("evaluation {} not found", id.0),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn ranking_handler<E, T>(
    State(service): State<Arc<AuditScoringService<E, T>>>,
) -> Response
where
    E: EvaluationRepository + 'static,
    T: PenaltyTableSource + 'static,
{
    match service.ranking() {
        Ok(entries) => (StatusCode::OK, axum::Json(RankingView::new(entries))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rank_payload_handler<E, T>(
    State(service): State<Arc<AuditScoringService<E, T>>>,
    axum::Json(request): axum::Json<RankingRequest>,
) -> Response
where
    E: EvaluationRepository + 'static,
    T: PenaltyTableSource + 'static,
{
    match evaluations_from_payloads(request.evaluations) {
        Ok(evaluations) => {
            let entries = service.rank_evaluations(&evaluations);
            (StatusCode::OK, axum::Json(RankingView::new(entries))).into_response()
        }
        Err(error) => error_response(error.into()),
    }
}

fn error_response(error: ScoringServiceError) -> Response {
    let status = match &error {
        ScoringServiceError::Inbound(_) | ScoringServiceError::PenaltyTable(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScoringServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ScoringServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
