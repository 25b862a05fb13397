use std::collections::BTreeMap;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::audits::domain::{
    Answer, AnswerValue, Evaluation, EvaluationId, EvaluationKind, EvaluationStatus, QuestionId,
    WorkDetails, WorkId,
};
use crate::audits::penalty::{PenaltyBracket, PenaltyEstimator, PenaltyTable};
use crate::audits::repository::{EvaluationRepository, PenaltyTableSource, RepositoryError};
use crate::audits::service::AuditScoringService;

pub(super) fn answer(id: &str, value: AnswerValue, weight: u32) -> Answer {
    Answer {
        question_id: QuestionId(id.to_string()),
        value,
        question_weight: NonZeroU32::new(weight).expect("positive weight"),
    }
}

pub(super) fn evaluation(id: &str, work: &str, employees: Option<u32>) -> Evaluation {
    Evaluation {
        id: EvaluationId(id.to_string()),
        work_id: WorkId(work.to_string()),
        work: None,
        employees_count: employees,
        status: EvaluationStatus::Completed,
        kind: EvaluationKind::Site,
        answers: Vec::new(),
    }
}

/// Completed site audit with the given compliant / non-compliant split.
pub(super) fn site_audit(
    id: &str,
    work: &str,
    compliant: usize,
    non_compliant: usize,
) -> Evaluation {
    let mut evaluation = evaluation(id, work, Some(30));
    for index in 0..compliant {
        evaluation
            .answers
            .push(answer(&format!("{id}-c{index}"), AnswerValue::Compliant, 1));
    }
    for index in 0..non_compliant {
        evaluation
            .answers
            .push(answer(&format!("{id}-n{index}"), AnswerValue::NonCompliant, 2));
    }
    evaluation
}

pub(super) fn with_work(mut evaluation: Evaluation, name: &str, number: &str) -> Evaluation {
    evaluation.work = Some(WorkDetails {
        name: name.to_string(),
        number: number.to_string(),
    });
    evaluation
}

pub(super) fn bracket(
    weight: u32,
    employees_min: u32,
    employees_max: u32,
    min_value: f64,
    max_value: f64,
) -> PenaltyBracket {
    PenaltyBracket {
        weight,
        employees_min,
        employees_max,
        min_value,
        max_value,
    }
}

/// Small graded table: weights 1-3 across two headcount bands.
pub(super) fn penalty_table() -> PenaltyTable {
    PenaltyTable::new(vec![
        bracket(1, 0, 100, 100.0, 500.0),
        bracket(1, 101, 500, 200.0, 900.0),
        bracket(2, 0, 100, 300.0, 1_200.0),
        bracket(2, 101, 500, 600.0, 2_000.0),
        bracket(3, 0, 100, 800.0, 3_000.0),
        bracket(3, 101, 500, 1_500.0, 5_500.0),
    ])
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

#[derive(Default, Clone)]
pub(super) struct MemoryEvaluations {
    records: Arc<Mutex<BTreeMap<EvaluationId, Evaluation>>>,
}

impl MemoryEvaluations {
    pub(super) fn with(evaluations: Vec<Evaluation>) -> Self {
        let repository = Self::default();
        {
            let mut guard = repository.records.lock().expect("repository mutex poisoned");
            for evaluation in evaluations {
                guard.insert(evaluation.id.clone(), evaluation);
            }
        }
        repository
    }
}

impl EvaluationRepository for MemoryEvaluations {
    fn fetch(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl EvaluationRepository for UnavailableRepository {
    fn fetch(&self, _id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct UnavailableTables;

impl PenaltyTableSource for UnavailableTables {
    fn current(&self) -> Result<PenaltyTable, RepositoryError> {
        Err(RepositoryError::Unavailable("table service offline".to_string()))
    }
}

pub(super) fn stored_evaluations() -> Vec<Evaluation> {
    let mut preview = evaluation("ev-draft", "w-1", None);
    preview.status = EvaluationStatus::Draft;
    preview.answers = vec![
        answer("q1", AnswerValue::NonCompliant, 1),
        answer("q2", AnswerValue::NonCompliant, 3),
    ];

    let mut lodging = site_audit("ev-lodging", "w-2", 0, 5);
    lodging.kind = EvaluationKind::Accommodation;

    vec![
        with_work(site_audit("ev-1", "w-1", 8, 2), "Residencial Aurora", "OB-001"),
        with_work(site_audit("ev-2", "w-1", 6, 4), "Residencial Aurora", "OB-001"),
        with_work(site_audit("ev-3", "w-2", 9, 1), "Torre Norte", "OB-002"),
        preview,
        lodging,
    ]
}

pub(super) fn build_service() -> AuditScoringService<MemoryEvaluations, PenaltyTable> {
    AuditScoringService::new(
        Arc::new(MemoryEvaluations::with(stored_evaluations())),
        Arc::new(penalty_table()),
        PenaltyEstimator::default(),
    )
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
