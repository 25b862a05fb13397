use crate::infra::{demo_evaluations, load_evaluations, load_penalty_table};
use clap::Args;
use site_audit::audits::{
    format_amount, rank, AssessmentView, Evaluation, EvaluationAssessment, EvaluationPayload,
    PenaltyEstimator, PenaltyTable, RankingView,
};
use site_audit::config::AppConfig;
use site_audit::error::AppError;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct PenaltyEstimateArgs {
    /// JSON file holding a single evaluation
    #[arg(long)]
    pub(crate) evaluation: PathBuf,
    /// Penalty table CSV (defaults to the bundled reference table)
    #[arg(long)]
    pub(crate) penalty_table: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct RankingArgs {
    /// JSON file holding an array of evaluations
    #[arg(long)]
    pub(crate) evaluations: PathBuf,
}

pub(crate) fn run_penalty_estimate(args: PenaltyEstimateArgs) -> Result<(), AppError> {
    let estimator = configured_estimator()?;
    let table = load_penalty_table(args.penalty_table.as_deref())?;
    let evaluation = load_evaluation(&args.evaluation)?;

    let assessment = assess(&estimator, &table, &evaluation);
    render_assessment(&assessment.to_view());
    Ok(())
}

pub(crate) fn run_ranking(args: RankingArgs) -> Result<(), AppError> {
    let evaluations = load_evaluations(&args.evaluations)?;
    render_ranking(&RankingView::new(rank(&evaluations)));
    Ok(())
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let estimator = configured_estimator()?;
    let table = load_penalty_table(None)?;
    let evaluations = demo_evaluations()?;

    println!("Site audit scoring demo");
    println!(
        "Penalty table: {} brackets, correction factor {:.4}, default headcount {}",
        table.len(),
        estimator.correction_factor(),
        estimator.default_employees_count()
    );

    for evaluation in &evaluations {
        println!();
        render_assessment(&assess(&estimator, &table, evaluation).to_view());
    }

    println!();
    render_ranking(&RankingView::new(rank(&evaluations)));
    Ok(())
}

fn configured_estimator() -> Result<PenaltyEstimator, AppError> {
    let config = AppConfig::load()?;
    Ok(PenaltyEstimator::from(&config.scoring))
}

fn load_evaluation(path: &Path) -> Result<Evaluation, AppError> {
    let raw = std::fs::read(path)?;
    let payload: EvaluationPayload = serde_json::from_slice(&raw)?;
    Ok(Evaluation::try_from(payload)?)
}

fn assess(
    estimator: &PenaltyEstimator,
    table: &PenaltyTable,
    evaluation: &Evaluation,
) -> EvaluationAssessment {
    EvaluationAssessment::new(evaluation, estimator.assess(evaluation, table.brackets()))
}

fn render_assessment(view: &AssessmentView) {
    println!(
        "Evaluation {} (site {}, {})",
        view.evaluation_id.0, view.work_id.0, view.status_label
    );

    let conformity = &view.conformity;
    let rate = conformity
        .rate
        .map(|rate| format!("{rate:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());
    println!(
        "  Conformity: {rate} ({} compliant, {} non-compliant, {} not applicable)",
        conformity.compliant, conformity.non_compliant, conformity.not_applicable
    );
    for share in &conformity.distribution {
        println!(
            "    weight {}: {} finding(s), {:.1}% of weighted points",
            share.weight, share.count, share.share_pct
        );
    }

    let penalty = &view.penalty;
    let headcount_note = if penalty.headcount_defaulted {
        " (assumed)"
    } else {
        ""
    };
    println!(
        "  Penalty range: {} to {} for {} employees{headcount_note}",
        penalty.min_label, penalty.max_label, penalty.employees_count
    );
    for line in &penalty.lines {
        match &line.bracket {
            Some(bracket) => println!(
                "    weight {} x{} in band {}-{}: {} to {}",
                line.weight,
                line.non_conformities,
                bracket.employees_min,
                bracket.employees_max,
                format_amount(line.min),
                format_amount(line.max)
            ),
            None => println!(
                "    weight {} x{}: no bracket, not priced",
                line.weight, line.non_conformities
            ),
        }
    }
}

fn render_ranking(view: &RankingView) {
    println!("Site leaderboard ({} sites)", view.total_sites);
    if view.entries.is_empty() {
        println!("  No completed site audits");
        return;
    }

    for entry in &view.entries {
        let name = if entry.work_name.is_empty() {
            entry.work_id.0.as_str()
        } else {
            entry.work_name.as_str()
        };
        println!(
            "  #{:<3} {:<10} {:<28} {:>6.2}% across {} evaluation(s)",
            entry.position,
            entry.work_number,
            name,
            entry.conformity_rate,
            entry.total_evaluations
        );
    }
}
