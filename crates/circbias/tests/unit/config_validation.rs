//! Tests for configuration validation.
//!
//! Invalid values must be rejected with a configuration error naming the
//! offending parameter, and a rejected change must leave the previous value
//! in place.

use circbias::{
    current_config, reset_config, set_config, update_config, BiasDetector, ConfigOption,
    DetectOptions, DetectionConfig, ErrorKind, Parallelism, SampleLimits, Thresholds,
};

fn rejected(config: DetectionConfig) -> String {
    let err = config.validate().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    err.parameter().unwrap_or_default().to_string()
}

// =============================================================================
// THRESHOLDS
// =============================================================================

#[test]
fn psi_threshold_open_interval() {
    for value in [0.0, 1.0, -0.1, f64::NAN] {
        let config = DetectionConfig::default().thresholds(Thresholds::new(value, 0.85, 0.5));
        assert_eq!(rejected(config), "psi_threshold", "value {}", value);
    }
    let ok = DetectionConfig::default().thresholds(Thresholds::new(0.999, 0.85, 0.5));
    assert!(ok.validate().is_ok());
}

#[test]
fn ccs_threshold_half_open_interval() {
    let config = DetectionConfig::default().thresholds(Thresholds::new(0.15, 0.0, 0.5));
    assert_eq!(rejected(config), "ccs_threshold");
    let ok = DetectionConfig::default().thresholds(Thresholds::new(0.15, 1.0, 0.5));
    assert!(ok.validate().is_ok());
}

#[test]
fn rho_threshold_closed_interval() {
    let config = DetectionConfig::default().thresholds(Thresholds::new(0.15, 0.85, 1.01));
    assert_eq!(rejected(config), "rho_pc_threshold");
    for value in [0.0, 1.0] {
        let ok = DetectionConfig::default().thresholds(Thresholds::new(0.15, 0.85, value));
        assert!(ok.validate().is_ok());
    }
}

// =============================================================================
// BOOTSTRAP AND ADAPTIVE SETTINGS
// =============================================================================

#[test]
fn n_bootstrap_minimum() {
    assert_eq!(rejected(DetectionConfig::default().n_bootstrap(99)), "n_bootstrap");
    assert!(DetectionConfig::default().n_bootstrap(100).validate().is_ok());
}

#[test]
fn confidence_level_open_interval() {
    for value in [0.0, 1.0, 1.5] {
        assert_eq!(
            rejected(DetectionConfig::default().confidence_level(value)),
            "confidence_level"
        );
    }
}

#[test]
fn adaptive_settings_validated() {
    let config = DetectionConfig {
        adaptive_quantile: 0.0,
        ..DetectionConfig::default()
    };
    assert_eq!(rejected(config), "adaptive_quantile");

    let config = DetectionConfig {
        n_adaptive_simulations: 0,
        ..DetectionConfig::default()
    };
    assert_eq!(rejected(config), "n_adaptive_simulations");
}

#[test]
fn sample_limits_floors() {
    let config = DetectionConfig {
        limits: SampleLimits {
            min_time_periods: 1,
            ..SampleLimits::default()
        },
        ..DetectionConfig::default()
    };
    assert_eq!(rejected(config), "min_time_periods");
}

#[test]
fn stricter_limits_enforced_by_detector() {
    let config = DetectionConfig {
        limits: SampleLimits {
            min_time_periods: 5,
            ..SampleLimits::default()
        },
        ..DetectionConfig::default()
    };
    let detector = BiasDetector::new(config).unwrap();
    let p = circbias::Matrix::from_element(4, 1, 0.5);
    let c = circbias::Matrix::from_fn(4, 1, |i, _| i as f64);
    let err = detector.detect(&p, &c, &DetectOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
}

#[test]
fn bootstrap_option_below_minimum_rejected() {
    let p = circbias::Matrix::from_fn(4, 1, |i, _| 0.5 + 0.1 * i as f64);
    let c = circbias::Matrix::from_fn(4, 1, |i, _| i as f64 + 1.0);
    let err = BiasDetector::default()
        .detect(&p, &c, &DetectOptions::new().bootstrap(10))
        .unwrap_err();
    assert_eq!(err.parameter(), Some("n_bootstrap"));
}

#[test]
fn parallelism_is_not_validated_away() {
    let config = DetectionConfig::default().parallelism(Parallelism::processes(4));
    assert!(config.validate().is_ok());
}

// =============================================================================
// PROCESS-WIDE DEFAULT
// =============================================================================

fn trending() -> (circbias::Matrix, circbias::Matrix) {
    let p = circbias::Matrix::from_fn(6, 2, |i, k| 0.5 + 0.05 * i as f64 + 0.01 * k as f64);
    let c = circbias::Matrix::from_fn(6, 1, |i, _| 100.0 + 10.0 * i as f64);
    (p, c)
}

/// Single test so no other test observes the global mid-change.
#[test]
fn global_config_lifecycle() {
    reset_config();
    assert_eq!(current_config(), DetectionConfig::default());

    let updated = update_config([
        ConfigOption::PsiThreshold(0.2),
        ConfigOption::RandomSeed(Some(99)),
    ])
    .unwrap();
    assert_eq!(updated.thresholds.psi, 0.2);
    assert_eq!(current_config().random_seed, Some(99));

    // One bad option rolls back the whole update.
    let err = update_config([
        ConfigOption::CcsThreshold(0.5),
        ConfigOption::ConfidenceLevel(2.0),
    ])
    .unwrap_err();
    assert_eq!(err.parameter(), Some("confidence_level"));
    assert_eq!(current_config().thresholds.ccs, 0.85);

    let err = set_config(DetectionConfig::default().n_bootstrap(5)).unwrap_err();
    assert_eq!(err.parameter(), Some("n_bootstrap"));
    assert_eq!(current_config().thresholds.psi, 0.2);

    set_config(DetectionConfig::quick()).unwrap();
    let detector = BiasDetector::from_global();
    assert_eq!(detector.config().n_bootstrap, 200);

    // A configured replicate count drives a bootstrap that names no count.
    update_config([ConfigOption::NBootstrap(300)]).unwrap();
    let (p, c) = trending();
    let options = DetectOptions::new().enable_bootstrap().seed(11);
    let result = detector.detect(&p, &c, &options).unwrap();
    assert_eq!(result.bootstrap.unwrap().n_bootstrap, 300);

    // A fixed-config detector ignores later global changes.
    let pinned = BiasDetector::new(current_config()).unwrap();

    // Changes between calls apply to the next call.
    update_config([ConfigOption::NBootstrap(250), ConfigOption::PsiThreshold(0.3)]).unwrap();
    let result = detector.detect(&p, &c, &options).unwrap();
    assert_eq!(result.bootstrap.unwrap().n_bootstrap, 250);
    assert_eq!(result.metadata.thresholds.psi, 0.3);
    assert_eq!(pinned.config().n_bootstrap, 300);

    reset_config();
    assert_eq!(detector.config(), DetectionConfig::default());
    assert_eq!(current_config(), DetectionConfig::default());
}
