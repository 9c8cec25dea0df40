//! Detection scenarios with literal inputs and expected verdicts.

use circbias::{
    decide, matrix_from_rows, BiasDetector, DetectOptions, Indicator, IndicatorScores, Matrix,
    Thresholds, Warning,
};

fn matrix(rows: &[&[f64]]) -> Matrix {
    let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
    matrix_from_rows("test", &rows).unwrap()
}

fn tuning_performance() -> Matrix {
    matrix(&[
        &[0.50, 0.40],
        &[0.60, 0.50],
        &[0.70, 0.60],
        &[0.80, 0.70],
        &[0.90, 0.80],
    ])
}

fn tuning_constraints() -> Matrix {
    matrix(&[
        &[0.5, 50.0],
        &[0.6, 75.0],
        &[0.7, 100.0],
        &[0.8, 125.0],
        &[0.9, 150.0],
    ])
}

// =============================================================================
// A. CLEAN, STABLE EVALUATION
// =============================================================================

#[test]
fn clean_stable_evaluation() {
    let p = matrix(&[&[0.80, 0.75], &[0.80, 0.75], &[0.80, 0.75]]);
    let c = matrix(&[&[0.7, 100.0], &[0.7, 100.0], &[0.7, 100.0]]);

    let result = BiasDetector::default()
        .detect(&p, &c, &DetectOptions::new())
        .unwrap();

    assert_eq!(result.psi_score, 0.0);
    assert_eq!(result.ccs_score, 1.0);
    assert_eq!(result.rho_pc_score, 0.0);
    assert!(!result.overall_bias);
    assert_eq!(result.bias_votes, 0);
    assert_eq!(result.confidence, 0.0);
    assert!(result
        .diagnostics
        .contains(|w| matches!(w, Warning::StaticConstraints { .. })));
}

// =============================================================================
// B. PURE CONSTRAINT DRIFT, STABLE PERFORMANCE
// =============================================================================

#[test]
fn constraint_drift_with_stable_performance() {
    let p = matrix(&[&[0.80], &[0.80], &[0.80], &[0.80]]);
    let c = matrix(&[&[100.0], &[200.0], &[300.0], &[400.0]]);

    let result = BiasDetector::default()
        .detect(&p, &c, &DetectOptions::new())
        .unwrap();

    assert_eq!(result.psi_score, 0.0);
    // cv = sqrt(12500) / 250 ≈ 0.447
    assert!(result.ccs_score < 0.75, "ccs = {}", result.ccs_score);
    assert!((result.ccs_score - 1.0 / (1.0 + 12_500f64.sqrt() / 250.0)).abs() < 1e-12);
    assert_eq!(result.rho_pc_score, 0.0);
    assert!(result.bias_votes <= 1);
    assert!(!result.overall_bias);
}

// =============================================================================
// C. TUNING-DRIVEN INFLATION
// =============================================================================

#[test]
fn tuning_driven_inflation() {
    let result = BiasDetector::default()
        .detect(&tuning_performance(), &tuning_constraints(), &DetectOptions::new())
        .unwrap();

    assert!(result.rho_pc_score.abs() > 0.95, "rho = {}", result.rho_pc_score);
    assert!((result.psi_score - 0.1).abs() < 1e-9, "psi = {}", result.psi_score);
    assert!(result.ccs_score < 0.85, "ccs = {}", result.ccs_score);

    // Consecutive differences are exactly 0.1, below τ_psi = 0.15.
    assert!(!result.psi_bias);
    assert!(result.ccs_bias);
    assert!(result.rho_pc_bias);
    assert_eq!(result.bias_votes, 2);
    assert!(result.overall_bias);
    assert!((result.confidence - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn tuning_driven_inflation_all_flags_with_tighter_psi() {
    let options = DetectOptions::new().thresholds(Thresholds::new(0.05, 0.85, 0.5));
    let result = BiasDetector::default()
        .detect(&tuning_performance(), &tuning_constraints(), &options)
        .unwrap();

    assert!(result.psi_bias && result.ccs_bias && result.rho_pc_bias);
    assert_eq!(result.bias_votes, 3);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.metadata.thresholds.psi, 0.05);
}

// =============================================================================
// D. PERFECTLY CORRELATED BUT CONSTANT CONSTRAINTS
// =============================================================================

#[test]
fn constant_constraints_break_correlation() {
    let c = matrix(&[
        &[0.7, 100.0],
        &[0.7, 100.0],
        &[0.7, 100.0],
        &[0.7, 100.0],
        &[0.7, 100.0],
    ]);

    let result = BiasDetector::default()
        .detect(&tuning_performance(), &c, &DetectOptions::new())
        .unwrap();

    assert_eq!(result.rho_pc_score, 0.0);
    assert_eq!(result.ccs_score, 1.0);
    assert!(result.psi_score > 0.0);
    assert!(result.bias_votes <= 1);
    assert!(!result.overall_bias);
}

// =============================================================================
// E. DECISION BOUNDARY
// =============================================================================

#[test]
fn decision_boundary() {
    let scores = IndicatorScores {
        psi: 0.20,
        ccs: 0.80,
        rho_pc: 0.10,
    };
    let decision = decide(&scores, &Thresholds::default());

    assert!(decision.psi_flag);
    assert!(decision.ccs_flag);
    assert!(!decision.rho_flag);
    assert_eq!(decision.votes, 2);
    assert!(decision.overall);
    assert!((decision.confidence - 2.0 / 3.0).abs() < 1e-12);
}

#[test]
fn thresholds_are_strict() {
    let scores = IndicatorScores {
        psi: 0.15,
        ccs: 0.85,
        rho_pc: -0.5,
    };
    let decision = decide(&scores, &Thresholds::default());
    assert_eq!(decision.votes, 0);
}

// =============================================================================
// F. BOOTSTRAP REPRODUCIBILITY
// =============================================================================

#[test]
fn bootstrap_reproducible_with_seed() {
    let detector = BiasDetector::default();
    let options = DetectOptions::new().bootstrap(500).seed(42);
    let p = tuning_performance();
    let c = tuning_constraints();

    let first = detector.detect(&p, &c, &options).unwrap();
    let second = detector.detect(&p, &c, &options).unwrap();

    let a = first.bootstrap.unwrap();
    let b = second.bootstrap.unwrap();
    for indicator in Indicator::ALL {
        let (lo_a, hi_a, p_a) = a.interval(indicator);
        let (lo_b, hi_b, p_b) = b.interval(indicator);
        assert_eq!(lo_a.to_bits(), lo_b.to_bits(), "{}", indicator);
        assert_eq!(hi_a.to_bits(), hi_b.to_bits(), "{}", indicator);
        assert_eq!(p_a.to_bits(), p_b.to_bits(), "{}", indicator);
    }
    assert_eq!(a.n_bootstrap, 500);
    assert_eq!(first.metadata.seed, Some(42));
}

#[test]
fn bootstrap_point_estimates_are_scores() {
    let p = tuning_performance();
    let c = tuning_constraints();
    let detector = BiasDetector::default();
    let plain = detector.detect(&p, &c, &DetectOptions::new()).unwrap();
    let boot = detector
        .detect(&p, &c, &DetectOptions::new().bootstrap(200).seed(1))
        .unwrap();

    assert_eq!(plain.scores(), boot.scores());
    assert_eq!(plain.decision(), boot.decision());
    let fields = boot.bootstrap.unwrap();
    assert!(fields.ccs_ci_lower <= fields.ccs_ci_upper);
    assert!((0.0..=1.0).contains(&fields.rho_pc_pvalue));
    // 200 replicates is below the recommended count.
    assert!(boot
        .diagnostics
        .contains(|w| matches!(w, Warning::LowReplicateCount { .. })));
    let low_count = boot
        .diagnostics
        .iter()
        .filter(|w| matches!(w, Warning::LowReplicateCount { .. }))
        .count();
    assert_eq!(low_count, 1);
}

// =============================================================================
// DEGENERATE INPUTS AND VALIDATION
// =============================================================================

#[test]
fn two_periods_zero_correlation_with_warning() {
    let p = matrix(&[&[0.5], &[0.9]]);
    let c = matrix(&[&[1.0], &[2.0]]);
    let result = BiasDetector::default()
        .detect(&p, &c, &DetectOptions::new())
        .unwrap();
    assert_eq!(result.rho_pc_score, 0.0);
    assert!(result
        .diagnostics
        .contains(|w| matches!(w, Warning::InsufficientPeriodsForCorrelation { .. })));
}

#[test]
fn single_period_rejected() {
    let p = matrix(&[&[0.5, 0.6]]);
    let c = matrix(&[&[1.0]]);
    let err = BiasDetector::default()
        .detect(&p, &c, &DetectOptions::new())
        .unwrap_err();
    assert_eq!(err.kind(), circbias::ErrorKind::InsufficientData);
}

#[test]
fn row_mismatch_rejected() {
    let c = matrix(&[&[1.0], &[2.0], &[3.0]]);
    let err = BiasDetector::default()
        .detect(&tuning_performance(), &c, &DetectOptions::new())
        .unwrap_err();
    assert_eq!(err.kind(), circbias::ErrorKind::DimensionMismatch);
    let record = err.to_record();
    assert_eq!(record.kind, circbias::ErrorKind::DimensionMismatch);
    assert!(!record.message.is_empty());
}

#[test]
fn non_finite_rejected() {
    let mut p = tuning_performance();
    p[(2, 1)] = f64::NAN;
    let err = BiasDetector::default()
        .detect(&p, &tuning_constraints(), &DetectOptions::new())
        .unwrap_err();
    assert_eq!(err.kind(), circbias::ErrorKind::NonFinite);
}

#[test]
fn relabeling_algorithms_changes_nothing() {
    let p = tuning_performance();
    let swapped = Matrix::from_fn(5, 2, |i, j| p[(i, 1 - j)]);
    let detector = BiasDetector::default();
    let a = detector
        .detect(&p, &tuning_constraints(), &DetectOptions::new())
        .unwrap();
    let b = detector
        .detect(&swapped, &tuning_constraints(), &DetectOptions::new())
        .unwrap();
    assert!((a.psi_score - b.psi_score).abs() < 1e-12);
    assert_eq!(a.ccs_score, b.ccs_score);
    assert!((a.rho_pc_score - b.rho_pc_score).abs() < 1e-12);
}

// =============================================================================
// ADAPTIVE THRESHOLDS
// =============================================================================

#[test]
fn adaptive_thresholds_recorded_in_metadata() {
    let detector = BiasDetector::new(circbias::DetectionConfig::quick()).unwrap();
    let result = detector
        .detect(
            &tuning_performance(),
            &tuning_constraints(),
            &DetectOptions::new().adaptive_thresholds().seed(7),
        )
        .unwrap();

    assert!(result.metadata.adaptive_thresholds_enabled);
    assert_eq!(result.metadata.seed, Some(7));
    let adaptive = result.adaptive.unwrap();
    assert_eq!(adaptive.n_adaptive_simulations, 200);
    assert_eq!(adaptive.adaptive_quantile, 0.95);
    // CCS ignores the shuffled axis, so its threshold is the observed score.
    assert_eq!(result.metadata.thresholds.ccs, result.ccs_score);
    assert!(!result.ccs_bias);
    assert!((0.0..=1.0).contains(&result.metadata.thresholds.rho_pc));
}
