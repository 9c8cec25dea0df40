//! Tabular logs through the detector.

use std::io::{Cursor, Write};

use circbias::data::{
    load_evaluation_csv, parse_evaluation_csv, DataError, EvaluationRecord, EvaluationTable,
};
use circbias::{BiasDetector, DetectOptions, ErrorKind, PsiProxy};
use tempfile::NamedTempFile;

const TUNING_LOG: &str = "\
time_period,algorithm,performance,temperature,budget
1,baseline,0.50,0.5,50
1,tuned,0.40,0.5,50
2,baseline,0.60,0.6,75
2,tuned,0.50,0.6,75
3,baseline,0.70,0.7,100
3,tuned,0.60,0.7,100
4,baseline,0.80,0.8,125
4,tuned,0.70,0.8,125
5,baseline,0.90,0.9,150
5,tuned,0.80,0.9,150
";

#[test]
fn csv_file_to_verdict() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(TUNING_LOG.as_bytes()).unwrap();
    file.flush().unwrap();

    let table = load_evaluation_csv(file.path()).unwrap();
    let result = BiasDetector::default()
        .detect_table(&table, &DetectOptions::new())
        .unwrap();

    assert_eq!(result.metadata.algorithm_names, vec!["baseline", "tuned"]);
    assert_eq!(result.metadata.constraint_names, vec!["temperature", "budget"]);
    assert_eq!(result.metadata.periods, Some(vec![1, 2, 3, 4, 5]));
    assert_eq!(result.metadata.time_periods, 5);
    assert_eq!(result.metadata.psi_proxy, PsiProxy::Performance);
    assert!(result.overall_bias);
    assert_eq!(result.bias_votes, 2);
}

#[test]
fn table_and_matrix_paths_agree() {
    let table = parse_evaluation_csv(Cursor::new(TUNING_LOG)).unwrap();
    let pivoted = table.pivot().unwrap();
    let detector = BiasDetector::default();

    let from_table = detector.detect_table(&table, &DetectOptions::new()).unwrap();
    let from_matrix = detector
        .detect(
            &pivoted.data.performance,
            &pivoted.data.constraints,
            &DetectOptions::new(),
        )
        .unwrap();
    assert_eq!(from_table.scores(), from_matrix.scores());
    assert_eq!(from_table.decision(), from_matrix.decision());
}

#[test]
fn supplied_names_override_table_names() {
    let table = parse_evaluation_csv(Cursor::new(TUNING_LOG)).unwrap();
    let result = BiasDetector::default()
        .detect_table(&table, &DetectOptions::new().algorithm_names(["A", "B"]))
        .unwrap();
    assert_eq!(result.metadata.algorithm_names, vec!["A", "B"]);
}

#[test]
fn unsorted_rows_pivot_by_period() {
    let mut table = EvaluationTable::new(vec!["budget".into()]);
    table.push(EvaluationRecord::new(30, "a", 0.9, vec![300.0]));
    table.push(EvaluationRecord::new(10, "a", 0.5, vec![100.0]));
    table.push(EvaluationRecord::new(20, "a", 0.7, vec![200.0]));

    let pivoted = table.pivot().unwrap();
    assert_eq!(pivoted.periods, vec![10, 20, 30]);
    assert_eq!(pivoted.data.performance[(0, 0)], 0.5);
    assert_eq!(pivoted.data.constraints[(2, 0)], 300.0);
}

#[test]
fn missing_cell_is_shape_error() {
    let log = "time_period,algorithm,performance,budget\n1,a,0.5,1\n1,b,0.4,1\n2,a,0.6,2\n";
    let table = parse_evaluation_csv(Cursor::new(log)).unwrap();
    let err = BiasDetector::default()
        .detect_table(&table, &DetectOptions::new())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn loader_errors_are_descriptive() {
    let log = "time_period,algorithm,performance,budget\nlast,a,0.5,1\n";
    let err = parse_evaluation_csv(Cursor::new(log)).unwrap_err();
    assert!(matches!(err, DataError::InvalidValue { line: 2, .. }));
    assert!(err.to_string().contains("time_period"));

    let missing = load_evaluation_csv(std::path::Path::new("/nonexistent/evaluations.csv"));
    assert!(matches!(missing, Err(DataError::Io(_))));
}
