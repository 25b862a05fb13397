use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// One row of a regulatory penalty table: a (weight, headcount range) rule
/// mapped to a monetary interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyBracket {
    pub weight: u32,
    pub employees_min: u32,
    pub employees_max: u32,
    pub min_value: f64,
    pub max_value: f64,
}

impl PenaltyBracket {
    pub fn matches(&self, weight: u32, employees: u32) -> bool {
        self.weight == weight && self.employees_min <= employees && employees <= self.employees_max
    }

    fn overlaps(&self, other: &PenaltyBracket) -> bool {
        self.weight == other.weight
            && self.employees_min <= other.employees_max
            && other.employees_min <= self.employees_max
    }
}

/// Two brackets for the same weight whose headcount ranges intersect.
/// Indices are positions in table order; `first` always wins a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BracketOverlap {
    pub weight: u32,
    pub first: usize,
    pub second: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PenaltyTableError {
    #[error("failed to read penalty table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid penalty table CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: weight must be at least 1")]
    ZeroWeight { row: usize },
    #[error("row {row}: employees_min {min} exceeds employees_max {max}")]
    InvertedHeadcount { row: usize, min: u32, max: u32 },
    #[error("row {row}: monetary values must be finite and non-negative")]
    NegativeAmount { row: usize },
    #[error("row {row}: min_value {min} exceeds max_value {max}")]
    InvertedAmounts { row: usize, min: f64, max: f64 },
}

/// Ordered bracket list. Order matters: lookups take the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PenaltyTable {
    brackets: Vec<PenaltyBracket>,
}

impl PenaltyTable {
    /// Wrap brackets without validation; the estimator tolerates any rows.
    pub fn new(brackets: Vec<PenaltyBracket>) -> Self {
        Self { brackets }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, PenaltyTableError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Import a CSV export with header
    /// `weight,employees_min,employees_max,min_value,max_value`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PenaltyTableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(reader);

        let brackets = csv_reader
            .deserialize::<PenaltyBracket>()
            .collect::<Result<Vec<_>, _>>()?;

        Self::try_from_brackets(brackets)
    }

    /// Validate rows supplied in memory (e.g. inline in a request) with the
    /// same checks as a CSV import. Rows are numbered from 1.
    pub fn try_from_brackets(brackets: Vec<PenaltyBracket>) -> Result<Self, PenaltyTableError> {
        for (index, bracket) in brackets.iter().enumerate() {
            validate_row(index + 1, bracket)?;
        }

        let table = Self { brackets };
        for overlap in table.overlaps() {
            warn!(
                weight = overlap.weight,
                first = overlap.first,
                second = overlap.second,
                "penalty brackets overlap; the first row wins lookups"
            );
        }

        Ok(table)
    }

    pub fn brackets(&self) -> &[PenaltyBracket] {
        &self.brackets
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }

    pub fn find(&self, weight: u32, employees: u32) -> Option<&PenaltyBracket> {
        find_bracket(&self.brackets, weight, employees)
    }

    /// Report intersecting headcount ranges per weight. Lookups stay
    /// permissive; this exists so callers can surface table-quality issues.
    pub fn overlaps(&self) -> Vec<BracketOverlap> {
        let mut overlaps = Vec::new();
        for (first, left) in self.brackets.iter().enumerate() {
            for (offset, right) in self.brackets[first + 1..].iter().enumerate() {
                if left.overlaps(right) {
                    overlaps.push(BracketOverlap {
                        weight: left.weight,
                        first,
                        second: first + 1 + offset,
                    });
                }
            }
        }
        overlaps
    }
}

impl From<Vec<PenaltyBracket>> for PenaltyTable {
    fn from(brackets: Vec<PenaltyBracket>) -> Self {
        Self::new(brackets)
    }
}

pub(crate) fn find_bracket(
    brackets: &[PenaltyBracket],
    weight: u32,
    employees: u32,
) -> Option<&PenaltyBracket> {
    brackets
        .iter()
        .find(|bracket| bracket.matches(weight, employees))
}

fn validate_row(row: usize, bracket: &PenaltyBracket) -> Result<(), PenaltyTableError> {
    if bracket.weight == 0 {
        return Err(PenaltyTableError::ZeroWeight { row });
    }
    if bracket.employees_min > bracket.employees_max {
        return Err(PenaltyTableError::InvertedHeadcount {
            row,
            min: bracket.employees_min,
            max: bracket.employees_max,
        });
    }
    let amounts_valid = [bracket.min_value, bracket.max_value]
        .iter()
        .all(|value| value.is_finite() && *value >= 0.0);
    if !amounts_valid {
        return Err(PenaltyTableError::NegativeAmount { row });
    }
    if bracket.min_value > bracket.max_value {
        return Err(PenaltyTableError::InvertedAmounts {
            row,
            min: bracket.min_value,
            max: bracket.max_value,
        });
    }
    Ok(())
}
