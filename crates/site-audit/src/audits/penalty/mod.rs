//! Regulatory penalty estimation.
//!
//! Non-conformities are grouped by question weight, each group is priced
//! against the bracket for that weight and the site's headcount, and the sum
//! is scaled by a monetary correction factor. The estimate is best-effort: a
//! missing headcount falls back to a default and unmatched weights contribute
//! nothing, so callers always get a range back.

mod table;

pub use table::{BracketOverlap, PenaltyBracket, PenaltyTable, PenaltyTableError};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::Evaluation;
use table::find_bracket;

/// Index adjustment applied to raw bracket sums.
pub const DEFAULT_CORRECTION_FACTOR: f64 = 1.0641;

/// Headcount assumed for evaluations that do not record one, so drafts can
/// still be previewed.
pub const DEFAULT_EMPLOYEES_COUNT: u32 = 100;

/// Monetary exposure interval. `min <= max` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyRange {
    pub min: f64,
    pub max: f64,
}

impl PenaltyRange {
    pub const ZERO: PenaltyRange = PenaltyRange { min: 0.0, max: 0.0 };

    pub fn is_zero(&self) -> bool {
        self.min == 0.0 && self.max == 0.0
    }
}

/// Contribution of one weight group, before the correction factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyLine {
    pub weight: u32,
    pub non_conformities: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket: Option<PenaltyBracket>,
    pub min: f64,
    pub max: f64,
}

impl PenaltyLine {
    pub fn matched(&self) -> bool {
        self.bracket.is_some()
    }
}

/// Penalty range plus the trail that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyEstimate {
    pub range: PenaltyRange,
    pub employees_count: u32,
    pub headcount_defaulted: bool,
    pub correction_factor: f64,
    pub lines: Vec<PenaltyLine>,
}

impl PenaltyEstimate {
    /// Sum of the line contributions before correction.
    pub fn uncorrected(&self) -> PenaltyRange {
        self.lines
            .iter()
            .fold(PenaltyRange::ZERO, |acc, line| PenaltyRange {
                min: acc.min + line.min,
                max: acc.max + line.max,
            })
    }

    pub fn unmatched_weights(&self) -> Vec<u32> {
        self.lines
            .iter()
            .filter(|line| !line.matched())
            .map(|line| line.weight)
            .collect()
    }
}

/// Stateless estimator holding only its two policy dials.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyEstimator {
    correction_factor: f64,
    default_employees_count: u32,
}

impl Default for PenaltyEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CORRECTION_FACTOR, DEFAULT_EMPLOYEES_COUNT)
    }
}

impl From<&crate::config::ScoringConfig> for PenaltyEstimator {
    fn from(config: &crate::config::ScoringConfig) -> Self {
        Self::new(config.correction_factor, config.default_employees_count)
    }
}

impl PenaltyEstimator {
    pub fn new(correction_factor: f64, default_employees_count: u32) -> Self {
        let correction_factor = if correction_factor.is_finite() && correction_factor > 0.0 {
            correction_factor
        } else {
            DEFAULT_CORRECTION_FACTOR
        };
        let default_employees_count = if default_employees_count > 0 {
            default_employees_count
        } else {
            DEFAULT_EMPLOYEES_COUNT
        };

        Self {
            correction_factor,
            default_employees_count,
        }
    }

    pub fn correction_factor(&self) -> f64 {
        self.correction_factor
    }

    pub fn default_employees_count(&self) -> u32 {
        self.default_employees_count
    }

    pub fn estimate(&self, evaluation: &Evaluation, table: &[PenaltyBracket]) -> PenaltyRange {
        self.assess(evaluation, table).range
    }

    pub fn assess(&self, evaluation: &Evaluation, table: &[PenaltyBracket]) -> PenaltyEstimate {
        let employees_count = evaluation.headcount_or(self.default_employees_count);
        let headcount_defaulted = evaluation.employees_count.filter(|n| *n > 0).is_none();

        let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
        for answer in evaluation.non_conformities() {
            *counts.entry(answer.question_weight.get()).or_insert(0) += 1;
        }

        let mut min_value = 0.0;
        let mut max_value = 0.0;
        let mut lines = Vec::with_capacity(counts.len());

        for (weight, count) in counts {
            let bracket = find_bracket(table, weight, employees_count);
            let (line_min, line_max) = match bracket {
                Some(row) => (row.min_value * count as f64, row.max_value * count as f64),
                None => (0.0, 0.0),
            };
            min_value += line_min;
            max_value += line_max;

            lines.push(PenaltyLine {
                weight,
                non_conformities: count,
                bracket: bracket.cloned(),
                min: line_min,
                max: line_max,
            });
        }

        let range = PenaltyRange {
            min: min_value * self.correction_factor,
            max: max_value * self.correction_factor,
        };

        debug!(
            evaluation_id = %evaluation.id.0,
            employees_count,
            headcount_defaulted,
            weight_groups = lines.len(),
            min = range.min,
            max = range.max,
            "penalty estimated"
        );

        PenaltyEstimate {
            range,
            employees_count,
            headcount_defaulted,
            correction_factor: self.correction_factor,
            lines,
        }
    }
}

/// Estimate with the default dials.
pub fn estimate(evaluation: &Evaluation, table: &[PenaltyBracket]) -> PenaltyRange {
    PenaltyEstimator::default().estimate(evaluation, table)
}
