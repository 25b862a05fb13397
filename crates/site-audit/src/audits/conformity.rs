use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Answer, AnswerValue};

/// Answer tallies for a single evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConformitySummary {
    pub compliant: usize,
    pub non_compliant: usize,
    pub not_applicable: usize,
    /// Non-conformity count keyed by question weight.
    pub non_compliant_by_weight: BTreeMap<u32, usize>,
}

/// One weight's slice of the non-conformity distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightShare {
    pub weight: u32,
    pub count: usize,
    pub weighted_points: u64,
    pub share_pct: f64,
}

impl ConformitySummary {
    pub fn from_answers(answers: &[Answer]) -> Self {
        let mut summary = Self::default();

        for answer in answers {
            match answer.value {
                AnswerValue::Compliant => summary.compliant += 1,
                AnswerValue::NonCompliant => {
                    summary.non_compliant += 1;
                    *summary
                        .non_compliant_by_weight
                        .entry(answer.question_weight.get())
                        .or_insert(0) += 1;
                }
                AnswerValue::NotApplicable => summary.not_applicable += 1,
            }
        }

        summary
    }

    /// Answers that count toward the rate (N/A excluded).
    pub fn assessed(&self) -> usize {
        self.compliant + self.non_compliant
    }

    /// Conformity as a percentage in `0..=100`, or `None` when nothing
    /// applicable was answered.
    pub fn rate(&self) -> Option<f64> {
        let assessed = self.assessed();
        if assessed == 0 {
            return None;
        }
        Some(self.compliant as f64 * 100.0 / assessed as f64)
    }

    pub fn weighted_points(&self) -> u64 {
        self.non_compliant_by_weight
            .iter()
            .map(|(weight, count)| u64::from(*weight) * *count as u64)
            .sum()
    }

    /// Severity-weighted breakdown of the non-conformities, ascending by weight.
    pub fn distribution(&self) -> Vec<WeightShare> {
        let total = self.weighted_points();
        if total == 0 {
            return Vec::new();
        }

        self.non_compliant_by_weight
            .iter()
            .map(|(weight, count)| {
                let weighted_points = u64::from(*weight) * *count as u64;
                WeightShare {
                    weight: *weight,
                    count: *count,
                    weighted_points,
                    share_pct: weighted_points as f64 * 100.0 / total as f64,
                }
            })
            .collect()
    }
}
