use std::sync::Arc;

use tracing::info;

use super::domain::{Evaluation, EvaluationId};
use super::inbound::InboundError;
use super::penalty::{PenaltyBracket, PenaltyEstimator, PenaltyTableError};
use super::ranking::{ConformityRanker, SiteRankEntry};
use super::report::EvaluationAssessment;
use super::repository::{EvaluationRepository, PenaltyTableSource, RepositoryError};

/// Service composing the data collaborators with the scoring engine.
pub struct AuditScoringService<E, T> {
    evaluations: Arc<E>,
    penalty_tables: Arc<T>,
    estimator: PenaltyEstimator,
    ranker: ConformityRanker,
}

impl<E, T> AuditScoringService<E, T>
where
    E: EvaluationRepository + 'static,
    T: PenaltyTableSource + 'static,
{
    pub fn new(evaluations: Arc<E>, penalty_tables: Arc<T>, estimator: PenaltyEstimator) -> Self {
        Self {
            evaluations,
            penalty_tables,
            estimator,
            ranker: ConformityRanker::new(),
        }
    }

    pub fn estimator(&self) -> &PenaltyEstimator {
        &self.estimator
    }

    /// Assess a stored evaluation against the current penalty table.
    pub fn assess(
        &self,
        evaluation_id: &EvaluationId,
    ) -> Result<EvaluationAssessment, ScoringServiceError> {
        let evaluation = self
            .evaluations
            .fetch(evaluation_id)?
            .ok_or(RepositoryError::NotFound)?;

        self.assess_evaluation(&evaluation, None)
    }

    /// Preview an evaluation that may not be stored yet. Drafts are priced
    /// too; `table` overrides the source table when given.
    pub fn assess_evaluation(
        &self,
        evaluation: &Evaluation,
        table: Option<&[PenaltyBracket]>,
    ) -> Result<EvaluationAssessment, ScoringServiceError> {
        let estimate = match table {
            Some(brackets) => self.estimator.assess(evaluation, brackets),
            None => {
                let table = self.penalty_tables.current()?;
                self.estimator.assess(evaluation, table.brackets())
            }
        };

        Ok(EvaluationAssessment::new(evaluation, estimate))
    }

    /// Leaderboard over every stored evaluation.
    pub fn ranking(&self) -> Result<Vec<SiteRankEntry>, ScoringServiceError> {
        let evaluations = self.evaluations.list()?;
        let entries = self.ranker.rank(&evaluations);
        info!(
            evaluations = evaluations.len(),
            sites = entries.len(),
            "site ranking refreshed"
        );
        Ok(entries)
    }

    /// Leaderboard over caller-supplied evaluations.
    pub fn rank_evaluations(&self, evaluations: &[Evaluation]) -> Vec<SiteRankEntry> {
        self.ranker.rank(evaluations)
    }
}

/// Error raised by the scoring service.
#[derive(Debug, thiserror::Error)]
pub enum ScoringServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Inbound(#[from] InboundError),
    #[error(transparent)]
    PenaltyTable(#[from] PenaltyTableError),
}
