use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for site audits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvaluationId(pub String);

/// Identifier wrapper for the audited construction site ("obra").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkId(pub String);

/// Identifier wrapper for checklist questions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

/// Tri-state checklist response.
///
/// `NotApplicable` answers are left out of both the conformity rate and the
/// penalty estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnswerValue {
    #[serde(rename = "sim")]
    Compliant,
    #[serde(rename = "nao")]
    NonCompliant,
    #[serde(rename = "na")]
    NotApplicable,
}

impl AnswerValue {
    pub const fn is_compliant(self) -> bool {
        matches!(self, Self::Compliant)
    }

    pub const fn is_non_compliant(self) -> bool {
        matches!(self, Self::NonCompliant)
    }

    /// Whether the answer enters the conformity-rate denominator.
    pub const fn counts_toward_conformity(self) -> bool {
        !matches!(self, Self::NotApplicable)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliant => "Conforme",
            Self::NonCompliant => "Não Conforme",
            Self::NotApplicable => "Não Se Aplica",
        }
    }
}

/// One response to one checklist question, with the question's severity
/// weight copied onto it at answer time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub value: AnswerValue,
    pub question_weight: NonZeroU32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Draft,
    Completed,
}

impl EvaluationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Completed => "Completed",
        }
    }
}

/// Distinguishes construction-site audits from worker accommodation audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluationKind {
    #[serde(rename = "obra")]
    Site,
    #[serde(rename = "alojamento")]
    Accommodation,
}

/// Display attributes of the audited site, joined in by the data layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkDetails {
    pub name: String,
    pub number: String,
}

/// A site audit, draft or completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: EvaluationId,
    pub work_id: WorkId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work: Option<WorkDetails>,
    /// Headcount at audit time; `None` when unknown.
    #[serde(default)]
    pub employees_count: Option<u32>,
    pub status: EvaluationStatus,
    pub kind: EvaluationKind,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

impl Evaluation {
    /// Headcount used for bracket lookup, substituting `fallback` when the
    /// evaluation has none (or a zero).
    pub fn headcount_or(&self, fallback: u32) -> u32 {
        match self.employees_count {
            Some(count) if count > 0 => count,
            _ => fallback,
        }
    }

    /// Only completed construction-site audits feed the site leaderboard.
    pub fn is_rankable(&self) -> bool {
        self.status == EvaluationStatus::Completed && self.kind == EvaluationKind::Site
    }

    pub fn non_conformities(&self) -> impl Iterator<Item = &Answer> + '_ {
        self.answers
            .iter()
            .filter(|answer| answer.value.is_non_compliant())
    }
}
