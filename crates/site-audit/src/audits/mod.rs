//! Compliance scoring for construction-site safety audits.
//!
//! The engine is two pure computations over already-fetched data:
//! [`PenaltyEstimator`] prices an evaluation's non-conformities against a
//! penalty-bracket table, and [`ConformityRanker`] turns completed site audits
//! into a leaderboard. Everything else in this module is the boundary around
//! them: payload validation, collaborator traits, report views and the HTTP
//! router.

pub mod conformity;
pub mod domain;
pub mod inbound;
pub mod penalty;
pub mod ranking;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use conformity::{ConformitySummary, WeightShare};
pub use domain::{
    Answer, AnswerValue, Evaluation, EvaluationId, EvaluationKind, EvaluationStatus, QuestionId,
    WorkDetails, WorkId,
};
pub use inbound::{evaluations_from_payloads, AnswerPayload, EvaluationPayload, InboundError};
pub use penalty::{
    estimate, PenaltyBracket, PenaltyEstimate, PenaltyEstimator, PenaltyLine, PenaltyRange,
    PenaltyTable, PenaltyTableError, DEFAULT_CORRECTION_FACTOR, DEFAULT_EMPLOYEES_COUNT,
};
pub use ranking::{rank, ConformityRanker, SiteRankEntry};
pub use report::{format_amount, AssessmentView, EvaluationAssessment, RankingView};
pub use repository::{EvaluationRepository, PenaltyTableSource, RepositoryError};
pub use router::scoring_router;
pub use service::{AuditScoringService, ScoringServiceError};
