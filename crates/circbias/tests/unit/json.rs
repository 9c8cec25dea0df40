//! Canonical JSON mapping of result records.

use circbias::output::{from_json, to_json, to_json_pretty};
use circbias::{matrix_from_rows, BiasDetector, DetectOptions, Matrix};

fn inputs() -> (Matrix, Matrix) {
    let p = matrix_from_rows(
        "p",
        &[vec![0.50, 0.40], vec![0.61, 0.52], vec![0.69, 0.58], vec![0.83, 0.71]],
    )
    .unwrap();
    let c = matrix_from_rows(
        "c",
        &[vec![1.0, 50.0], vec![1.0, 80.0], vec![2.0, 90.0], vec![2.0, 160.0]],
    )
    .unwrap();
    (p, c)
}

#[test]
fn plain_result_round_trips() {
    let (p, c) = inputs();
    let result = BiasDetector::default()
        .detect(&p, &c, &DetectOptions::new())
        .unwrap();
    let back = from_json(&to_json(&result).unwrap()).unwrap();
    assert_eq!(back, result);
    assert!(back.bootstrap.is_none());
}

#[test]
fn full_result_round_trips_bit_exact() {
    let (p, c) = inputs();
    let detector = BiasDetector::new(circbias::DetectionConfig::quick()).unwrap();
    let options = DetectOptions::new()
        .bootstrap(300)
        .adaptive_thresholds()
        .seed(12)
        .constraint_names(["tier", "budget"]);
    let result = detector.detect(&p, &c, &options).unwrap();

    let back = from_json(&to_json_pretty(&result).unwrap()).unwrap();
    assert_eq!(back, result);
    let (a, b) = (result.bootstrap.unwrap(), back.bootstrap.unwrap());
    assert_eq!(a.rho_pc_std_error.to_bits(), b.rho_pc_std_error.to_bits());
    assert_eq!(back.adaptive, result.adaptive);
}

#[test]
fn value_types_follow_mapping() {
    let (p, c) = inputs();
    let result = BiasDetector::default()
        .detect(&p, &c, &DetectOptions::new().bootstrap(100).seed(3))
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&to_json(&result).unwrap()).unwrap();

    assert!(value["bias_votes"].is_u64());
    assert!(value["overall_bias"].is_boolean());
    assert!(value["psi_score"].is_f64());
    assert!(value["metadata"]["algorithm_names"].is_array());
    assert!(value["metadata"]["time_periods"].is_u64());
    assert_eq!(value["bootstrap_enabled"], true);
    assert_eq!(value["n_bootstrap"], 100);
    for key in ["psi", "ccs", "rho_pc"] {
        for suffix in ["ci_lower", "ci_upper", "pvalue", "std_error"] {
            let name = format!("{}_{}", key, suffix);
            assert!(value[&name].is_number(), "missing {}", name);
        }
    }
    assert_eq!(value["metadata"]["adaptive_thresholds_enabled"], false);
    assert!(value["diagnostics"].is_array());
    assert_eq!(value["diagnostics"][0]["kind"], "low_replicate_count");
}
