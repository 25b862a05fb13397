use chrono::{DateTime, Utc};
use serde::Serialize;

use super::conformity::{ConformitySummary, WeightShare};
use super::domain::{Evaluation, EvaluationId, EvaluationStatus, WorkId};
use super::penalty::{PenaltyEstimate, PenaltyLine, PenaltyRange};
use super::ranking::SiteRankEntry;

/// Conformity and penalty figures computed for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationAssessment {
    pub evaluation_id: EvaluationId,
    pub work_id: WorkId,
    pub status: EvaluationStatus,
    pub conformity: ConformitySummary,
    pub penalty: PenaltyEstimate,
}

impl EvaluationAssessment {
    pub fn new(evaluation: &Evaluation, penalty: PenaltyEstimate) -> Self {
        Self {
            evaluation_id: evaluation.id.clone(),
            work_id: evaluation.work_id.clone(),
            status: evaluation.status,
            conformity: ConformitySummary::from_answers(&evaluation.answers),
            penalty,
        }
    }

    pub fn to_view(&self) -> AssessmentView {
        AssessmentView {
            evaluation_id: self.evaluation_id.clone(),
            work_id: self.work_id.clone(),
            status_label: self.status.label(),
            conformity: ConformityView {
                compliant: self.conformity.compliant,
                non_compliant: self.conformity.non_compliant,
                not_applicable: self.conformity.not_applicable,
                rate: self.conformity.rate(),
                distribution: self.conformity.distribution(),
            },
            penalty: PenaltyView {
                range: self.penalty.range,
                min_label: format_amount(self.penalty.range.min),
                max_label: format_amount(self.penalty.range.max),
                employees_count: self.penalty.employees_count,
                headcount_defaulted: self.penalty.headcount_defaulted,
                correction_factor: self.penalty.correction_factor,
                lines: self.penalty.lines.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub evaluation_id: EvaluationId,
    pub work_id: WorkId,
    pub status_label: &'static str,
    pub conformity: ConformityView,
    pub penalty: PenaltyView,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConformityView {
    pub compliant: usize,
    pub non_compliant: usize,
    pub not_applicable: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distribution: Vec<WeightShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PenaltyView {
    #[serde(flatten)]
    pub range: PenaltyRange,
    pub min_label: String,
    pub max_label: String,
    pub employees_count: u32,
    pub headcount_defaulted: bool,
    pub correction_factor: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<PenaltyLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankingView {
    pub generated_at: DateTime<Utc>,
    pub total_sites: usize,
    pub entries: Vec<SiteRankEntry>,
}

impl RankingView {
    pub fn new(entries: Vec<SiteRankEntry>) -> Self {
        Self {
            generated_at: Utc::now(),
            total_sites: entries.len(),
            entries,
        }
    }
}

/// Two decimals with comma thousands separators, e.g. `1,064.10`.
pub fn format_amount(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}
