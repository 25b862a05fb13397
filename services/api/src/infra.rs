use metrics_exporter_prometheus::PrometheusHandle;
use site_audit::audits::{
    evaluations_from_payloads, Evaluation, EvaluationId, EvaluationPayload,
    EvaluationRepository, PenaltyTable, RepositoryError,
};
use site_audit::error::AppError;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Reference brackets shipped with the engine, used when no table is given.
const REFERENCE_PENALTY_TABLE: &[u8] =
    include_bytes!("../../../crates/site-audit/data/nr28_penalty_table.csv");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationRepository {
    records: Arc<Mutex<BTreeMap<EvaluationId, Evaluation>>>,
}

impl InMemoryEvaluationRepository {
    pub(crate) fn seeded(evaluations: Vec<Evaluation>) -> Self {
        let repository = Self::default();
        for evaluation in evaluations {
            repository.insert(evaluation);
        }
        repository
    }

    pub(crate) fn insert(&self, evaluation: Evaluation) {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(evaluation.id.clone(), evaluation);
    }
}

impl EvaluationRepository for InMemoryEvaluationRepository {
    fn fetch(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Evaluation>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(crate) fn load_penalty_table(path: Option<&Path>) -> Result<PenaltyTable, AppError> {
    let table = match path {
        Some(path) => PenaltyTable::from_path(path)?,
        None => PenaltyTable::from_reader(REFERENCE_PENALTY_TABLE)?,
    };
    info!(brackets = table.len(), custom = path.is_some(), "penalty table loaded");
    Ok(table)
}

pub(crate) fn load_evaluations(path: &Path) -> Result<Vec<Evaluation>, AppError> {
    let raw = std::fs::read(path)?;
    parse_evaluations(&raw)
}

pub(crate) fn parse_evaluations(raw: &[u8]) -> Result<Vec<Evaluation>, AppError> {
    let payloads: Vec<EvaluationPayload> = serde_json::from_slice(raw)?;
    Ok(evaluations_from_payloads(payloads)?)
}

/// Sample audits across three sites, including a draft and an accommodation
/// audit that the leaderboard must ignore.
pub(crate) fn demo_evaluations() -> Result<Vec<Evaluation>, AppError> {
    let raw = serde_json::json!([
        {
            "id": "ev-0001", "work_id": "w-aurora", "employees_count": 48,
            "status": "completed", "type": "obra",
            "work": { "name": "Residencial Aurora", "number": "OB-0001" },
            "answers": [
                { "question_id": "nr18-guardrails", "answer": "sim", "question": { "weight": 4 } },
                { "question_id": "nr18-harness", "answer": "nao", "question": { "weight": 4 } },
                { "question_id": "nr18-signage", "answer": "nao", "question": { "weight": 1 } },
                { "question_id": "nr18-ppe", "answer": "sim", "question": { "weight": 3 } },
                { "question_id": "nr10-panels", "answer": "sim", "question": { "weight": 3 } }
            ]
        },
        {
            "id": "ev-0002", "work_id": "w-aurora", "employees_count": 52,
            "status": "completed", "type": "obra",
            "work": { "name": "Residencial Aurora", "number": "OB-0001" },
            "answers": [
                { "question_id": "nr18-guardrails", "answer": "sim", "question": { "weight": 4 } },
                { "question_id": "nr18-harness", "answer": "sim", "question": { "weight": 4 } },
                { "question_id": "nr18-signage", "answer": "nao", "question": { "weight": 1 } },
                { "question_id": "nr18-ppe", "answer": "sim", "question": { "weight": 3 } },
                { "question_id": "nr10-panels", "answer": "na", "question": { "weight": 3 } }
            ]
        },
        {
            "id": "ev-0003", "work_id": "w-norte", "employees_count": 130,
            "status": "completed", "type": "obra",
            "work": { "name": "Torre Norte", "number": "OB-0002" },
            "answers": [
                { "question_id": "nr18-guardrails", "answer": "nao", "question": { "weight": 4 } },
                { "question_id": "nr18-harness", "answer": "nao", "question": { "weight": 4 } },
                { "question_id": "nr18-signage", "answer": "sim", "question": { "weight": 1 } },
                { "question_id": "nr18-ppe", "answer": "nao", "question": { "weight": 3 } }
            ]
        },
        {
            "id": "ev-0004", "work_id": "w-galpao", "employees_count": 12,
            "status": "completed", "type": "obra",
            "work": { "name": "Galpão Logístico", "number": "OB-0003" },
            "answers": [
                { "question_id": "nr18-guardrails", "answer": "sim", "question": { "weight": 4 } },
                { "question_id": "nr18-signage", "answer": "sim", "question": { "weight": 1 } },
                { "question_id": "nr18-ppe", "answer": "sim", "question": { "weight": 3 } }
            ]
        },
        {
            "id": "ev-0005", "work_id": "w-norte", "employees_count": null,
            "status": "draft", "type": "obra",
            "work": { "name": "Torre Norte", "number": "OB-0002" },
            "answers": [
                { "question_id": "nr18-harness", "answer": "nao", "question": { "weight": 4 } },
                { "question_id": "nr35-anchors", "answer": "nao", "question": { "weight": 2 } }
            ]
        },
        {
            "id": "ev-0006", "work_id": "w-alojamento", "employees_count": 40,
            "status": "completed", "type": "alojamento",
            "work": { "name": "Alojamento Central", "number": "AL-0001" },
            "answers": [
                { "question_id": "nr24-beds", "answer": "sim", "question": { "weight": 2 } }
            ]
        }
    ]);

    let payloads: Vec<EvaluationPayload> = serde_json::from_value(raw)?;
    Ok(evaluations_from_payloads(payloads)?)
}
