use super::domain::{Evaluation, EvaluationId};
use super::penalty::PenaltyTable;

/// Read access to stored evaluations, so the service can be exercised without
/// a database.
pub trait EvaluationRepository: Send + Sync {
    fn fetch(&self, id: &EvaluationId) -> Result<Option<Evaluation>, RepositoryError>;
    fn list(&self) -> Result<Vec<Evaluation>, RepositoryError>;
}

/// Supplies the jurisdiction's penalty table. Caching, if any, lives behind
/// this trait.
pub trait PenaltyTableSource: Send + Sync {
    fn current(&self) -> Result<PenaltyTable, RepositoryError>;
}

/// Error enumeration for collaborator failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl PenaltyTableSource for PenaltyTable {
    fn current(&self) -> Result<PenaltyTable, RepositoryError> {
        Ok(self.clone())
    }
}
