use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::conformity::ConformitySummary;
use super::domain::{Evaluation, WorkId};

/// Leaderboard row for one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRankEntry {
    pub work_id: WorkId,
    pub work_name: String,
    pub work_number: String,
    /// Mean of the per-evaluation conformity percentages, `0..=100`.
    pub conformity_rate: f64,
    pub total_evaluations: usize,
    pub position: usize,
}

#[derive(Debug, Default)]
struct SiteAccumulator {
    work_name: String,
    work_number: String,
    rates: Vec<f64>,
}

impl SiteAccumulator {
    fn push(&mut self, rate: f64) {
        self.rates.push(rate);
    }

    // Running mean folded over the rates in `total_cmp` order, so the result
    // is bit-identical for any arrival order of the same evaluations.
    fn mean(&mut self) -> f64 {
        self.rates.sort_by(f64::total_cmp);
        self.rates
            .iter()
            .enumerate()
            .fold(0.0, |mean, (seen, rate)| {
                let seen = seen as f64;
                (mean * seen + rate) / (seen + 1.0)
            })
    }
}

/// Aggregates completed site audits into a conformity leaderboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConformityRanker;

impl ConformityRanker {
    pub fn new() -> Self {
        Self
    }

    pub fn rank<'a, I>(&self, evaluations: I) -> Vec<SiteRankEntry>
    where
        I: IntoIterator<Item = &'a Evaluation>,
    {
        let mut sites: HashMap<WorkId, SiteAccumulator> = HashMap::new();
        let mut skipped = 0usize;

        for evaluation in evaluations {
            if !evaluation.is_rankable() {
                skipped += 1;
                continue;
            }
            let Some(rate) = ConformitySummary::from_answers(&evaluation.answers).rate() else {
                skipped += 1;
                continue;
            };

            let site = sites.entry(evaluation.work_id.clone()).or_default();
            if site.work_name.is_empty() && site.work_number.is_empty() {
                if let Some(work) = &evaluation.work {
                    site.work_name = work.name.clone();
                    site.work_number = work.number.clone();
                }
            }
            site.push(rate);
        }

        let mut entries: Vec<SiteRankEntry> = sites
            .into_iter()
            .map(|(work_id, mut site)| SiteRankEntry {
                work_id,
                conformity_rate: site.mean(),
                total_evaluations: site.rates.len(),
                work_name: site.work_name,
                work_number: site.work_number,
                position: 0,
            })
            .collect();

        entries.sort_by(compare_entries);
        assign_positions(&mut entries);

        debug!(sites = entries.len(), skipped, "conformity ranking computed");
        entries
    }
}

/// Rank with a default ranker.
pub fn rank<'a, I>(evaluations: I) -> Vec<SiteRankEntry>
where
    I: IntoIterator<Item = &'a Evaluation>,
{
    ConformityRanker::new().rank(evaluations)
}

fn compare_entries(left: &SiteRankEntry, right: &SiteRankEntry) -> Ordering {
    right
        .conformity_rate
        .total_cmp(&left.conformity_rate)
        .then_with(|| left.work_number.cmp(&right.work_number))
        .then_with(|| left.work_id.cmp(&right.work_id))
}

// Competition ranking: a site's position is one more than the number of sites
// with a strictly greater rate, so ties share a position.
fn assign_positions(entries: &mut [SiteRankEntry]) {
    let mut position = 1;
    let mut previous_rate: Option<f64> = None;
    for (index, entry) in entries.iter_mut().enumerate() {
        if previous_rate.is_some_and(|rate| entry.conformity_rate < rate) {
            position = index + 1;
        }
        entry.position = position;
        previous_rate = Some(entry.conformity_rate);
    }
}
