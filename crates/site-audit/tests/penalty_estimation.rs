use serde_json::json;
use site_audit::audits::{
    Evaluation, EvaluationPayload, PenaltyEstimator, PenaltyTable, DEFAULT_CORRECTION_FACTOR,
};

fn reference_table() -> PenaltyTable {
    let data = include_bytes!("../data/nr28_penalty_table.csv");
    PenaltyTable::from_reader(&data[..]).expect("reference table imports")
}

fn evaluation(value: serde_json::Value) -> Evaluation {
    let payload: EvaluationPayload = serde_json::from_value(value).expect("payload parses");
    Evaluation::try_from(payload).expect("payload converts")
}

#[test]
fn reference_table_covers_every_weight_and_headcount_band() {
    let table = reference_table();

    assert_eq!(table.len(), 32);
    assert!(table.overlaps().is_empty());
    for weight in 1..=4 {
        for employees in [1, 10, 11, 50, 100, 101, 500, 1000, 1001, 25_000] {
            assert!(
                table.find(weight, employees).is_some(),
                "no bracket for weight {weight} and {employees} employees"
            );
        }
    }
    assert!(table
        .brackets()
        .iter()
        .all(|bracket| bracket.min_value <= bracket.max_value));
}

#[test]
fn estimates_mixed_severity_audit_against_reference_table() {
    let table = reference_table();
    let evaluation = evaluation(json!({
        "id": "ev-2025-031",
        "work_id": "w-12",
        "employees_count": 80,
        "status": "completed",
        "type": "obra",
        "answers": [
            { "question_id": "nr18-01", "answer": "nao", "question": { "weight": 4 } },
            { "question_id": "nr18-02", "answer": "nao", "question": { "weight": 2 } },
            { "question_id": "nr18-03", "answer": "nao", "question": { "weight": 2 } },
            { "question_id": "nr18-04", "answer": "sim", "question": { "weight": 3 } },
            { "question_id": "nr18-05", "answer": "na", "question": { "weight": 1 } }
        ]
    }));

    let estimate = PenaltyEstimator::default().assess(&evaluation, table.brackets());

    // 51..=100 band: weight 2 -> 2419/3088 each, weight 4 -> 4940/6227.
    let raw_min = 2.0 * 2419.0 + 4940.0;
    let raw_max = 2.0 * 3088.0 + 6227.0;
    assert!((estimate.range.min - raw_min * DEFAULT_CORRECTION_FACTOR).abs() < 1e-6);
    assert!((estimate.range.max - raw_max * DEFAULT_CORRECTION_FACTOR).abs() < 1e-6);
    assert_eq!(estimate.lines.len(), 2);
    assert!(estimate.unmatched_weights().is_empty());
}

#[test]
fn draft_without_headcount_previews_at_default_band() {
    let table = reference_table();
    let evaluation = evaluation(json!({
        "id": "ev-draft-7",
        "work_id": "w-12",
        "employees_count": null,
        "status": "draft",
        "type": "obra",
        "answers": [
            { "question_id": "nr18-01", "answer": "nao", "question": { "weight": 1 } }
        ]
    }));

    let estimate = PenaltyEstimator::default().assess(&evaluation, table.brackets());

    assert!(estimate.headcount_defaulted);
    assert_eq!(estimate.employees_count, 100);
    assert!((estimate.range.min - 1296.0 * DEFAULT_CORRECTION_FACTOR).abs() < 1e-6);
}

#[test]
fn larger_sites_face_larger_penalties_for_the_same_findings() {
    let table = reference_table();
    let estimator = PenaltyEstimator::default();
    let answers = json!([
        { "question_id": "q1", "answer": "nao", "question": { "weight": 3 } },
        { "question_id": "q2", "answer": "nao", "question": { "weight": 1 } }
    ]);

    let mut previous = 0.0;
    for employees in [5, 20, 40, 90, 200, 400, 900, 5_000] {
        let evaluation = evaluation(json!({
            "id": format!("ev-{employees}"),
            "work_id": "w-1",
            "employees_count": employees,
            "status": "completed",
            "type": "obra",
            "answers": answers.clone()
        }));
        let range = estimator.estimate(&evaluation, table.brackets());
        assert!(range.min > previous, "{employees} employees did not increase exposure");
        assert!(range.min <= range.max);
        previous = range.min;
    }
}
