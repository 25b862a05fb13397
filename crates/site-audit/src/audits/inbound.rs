//! Shape validation for evaluations arriving from the data-access layer.
//!
//! Payloads mirror what the evaluation store returns: the question weight is
//! nested under `question`, the headcount is a nullable JSON number, and the
//! audit type travels as `type`. Conversion into [`Evaluation`] rejects values
//! the scoring engine cannot represent and normalises the rest.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::domain::{
    Answer, AnswerValue, Evaluation, EvaluationId, EvaluationKind, EvaluationStatus, QuestionId,
    WorkDetails, WorkId,
};

/// Rejections raised while converting an inbound payload.
#[derive(Debug, thiserror::Error)]
pub enum InboundError {
    #[error("question {question_id} carries non-positive weight {weight}")]
    NonPositiveWeight { question_id: String, weight: f64 },
    #[error("question {question_id} carries fractional weight {weight}")]
    FractionalWeight { question_id: String, weight: f64 },
    #[error("question {question_id} carries weight {weight} above the supported maximum")]
    WeightOutOfRange { question_id: String, weight: f64 },
    #[error("evaluation {0} is missing its work_id")]
    MissingWorkId(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPayload {
    pub id: String,
    pub work_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<WorkDetails>,
    /// Any JSON number; only positive whole values are kept.
    #[serde(default)]
    pub employees_count: Option<f64>,
    pub status: EvaluationStatus,
    #[serde(rename = "type")]
    pub kind: EvaluationKind,
    #[serde(default)]
    pub answers: Vec<AnswerPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub question_id: String,
    pub answer: AnswerValue,
    pub question: QuestionPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuestionPayload {
    pub weight: f64,
}

impl TryFrom<AnswerPayload> for Answer {
    type Error = InboundError;

    fn try_from(payload: AnswerPayload) -> Result<Self, Self::Error> {
        let weight = parse_weight(&payload.question_id, payload.question.weight)?;

        Ok(Answer {
            question_id: QuestionId(payload.question_id),
            value: payload.answer,
            question_weight: weight,
        })
    }
}

impl TryFrom<EvaluationPayload> for Evaluation {
    type Error = InboundError;

    fn try_from(payload: EvaluationPayload) -> Result<Self, Self::Error> {
        if payload.work_id.trim().is_empty() {
            return Err(InboundError::MissingWorkId(payload.id));
        }

        // Headcounts that are not positive whole numbers are treated as
        // unknown so the estimator's fallback applies.
        let employees_count = payload.employees_count.and_then(whole_headcount);

        let answers = payload
            .answers
            .into_iter()
            .map(Answer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Evaluation {
            id: EvaluationId(payload.id),
            work_id: WorkId(payload.work_id),
            work: payload.work,
            employees_count,
            status: payload.status,
            kind: payload.kind,
            answers,
        })
    }
}

fn parse_weight(question_id: &str, weight: f64) -> Result<NonZeroU32, InboundError> {
    let question_id = question_id.to_string();
    if weight.is_nan() || weight <= 0.0 {
        return Err(InboundError::NonPositiveWeight {
            question_id,
            weight,
        });
    }
    if weight > f64::from(u32::MAX) {
        return Err(InboundError::WeightOutOfRange {
            question_id,
            weight,
        });
    }
    if weight.fract() != 0.0 {
        return Err(InboundError::FractionalWeight {
            question_id,
            weight,
        });
    }
    NonZeroU32::new(weight as u32).ok_or(InboundError::NonPositiveWeight {
        question_id,
        weight,
    })
}

fn whole_headcount(count: f64) -> Option<u32> {
    if !count.is_finite() || count < 1.0 || count.fract() != 0.0 {
        return None;
    }
    Some(count.min(f64::from(u32::MAX)) as u32)
}

/// Convert a batch, failing on the first malformed evaluation.
pub fn evaluations_from_payloads(
    payloads: Vec<EvaluationPayload>,
) -> Result<Vec<Evaluation>, InboundError> {
    payloads.into_iter().map(Evaluation::try_from).collect()
}
