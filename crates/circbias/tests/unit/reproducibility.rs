//! Seeded runs must not depend on scheduling, worker count or backend.

use circbias::{
    permutation_test, AbsIndicator, Backend, BiasDetector, DetectOptions, DetectionConfig,
    Diagnostics, DetectionResult, Indicator, Matrix, NullProblem, Parallelism, PermutationConfig,
    Warning,
};

fn noisy_trend(t: usize) -> (Matrix, Matrix) {
    let p = Matrix::from_fn(t, 3, |i, k| {
        0.6 + 0.01 * i as f64 + 0.03 * (((i * 7 + k * 5) % 13) as f64 / 13.0)
    });
    let c = Matrix::from_fn(t, 2, |i, j| 100.0 + 5.0 * i as f64 + ((i * 3 + j) % 4) as f64);
    (p, c)
}

fn without_diagnostics(mut result: DetectionResult) -> DetectionResult {
    result.diagnostics = Diagnostics::new();
    result
}

#[test]
fn permutation_replicates_identical_across_worker_counts() {
    let (p, c) = noisy_trend(12);
    let metric = AbsIndicator(Indicator::RhoPc);
    let problem = NullProblem::shuffle(&metric, &p, &c);

    let run = |parallelism: Parallelism| {
        let config = PermutationConfig::seeded(300, 2024).with_parallelism(parallelism);
        permutation_test(&problem, &config, &mut Diagnostics::new()).unwrap()
    };

    let reference = run(Parallelism::sequential());
    for workers in [1, 2, 4] {
        let threaded = run(Parallelism::threads(workers));
        assert_eq!(threaded.replicates, reference.replicates, "workers = {}", workers);
        assert_eq!(threaded.p_value.to_bits(), reference.p_value.to_bits());

        let again = run(Parallelism::threads(workers));
        assert_eq!(again.replicates, threaded.replicates);
    }
}

#[test]
fn process_backend_degrades_with_warning() {
    let (p, c) = noisy_trend(8);
    let problem = NullProblem::shuffle(&Indicator::Psi, &p, &c);
    let config = PermutationConfig::seeded(100, 5).with_parallelism(Parallelism::processes(2));
    let mut diagnostics = Diagnostics::new();

    let result = permutation_test(&problem, &config, &mut diagnostics).unwrap();
    assert_eq!(result.backend_used, Backend::Sequential);
    assert!(diagnostics.contains(|w| matches!(w, Warning::BackendUnavailable { .. })));

    let sequential = PermutationConfig::seeded(100, 5);
    let reference = permutation_test(&problem, &sequential, &mut Diagnostics::new()).unwrap();
    assert_eq!(result.replicates, reference.replicates);
}

#[test]
fn detection_identical_across_backends() {
    let (p, c) = noisy_trend(10);
    let options = DetectOptions::new().bootstrap(200).adaptive_thresholds().seed(31);

    let run = |parallelism: Parallelism| {
        let config = DetectionConfig::quick().parallelism(parallelism);
        let detector = BiasDetector::new(config).unwrap();
        without_diagnostics(detector.detect(&p, &c, &options).unwrap())
    };

    let reference = run(Parallelism::sequential());
    assert_eq!(run(Parallelism::threads(2)), reference);
    assert_eq!(run(Parallelism::threads(4)), reference);
    assert_eq!(run(Parallelism::processes(2)), reference);
}

#[test]
fn configured_seed_used_when_call_has_none() {
    let (p, c) = noisy_trend(6);
    let detector = BiasDetector::new(DetectionConfig::quick().seed(77)).unwrap();
    let a = detector
        .detect(&p, &c, &DetectOptions::new().bootstrap(150))
        .unwrap();
    let b = detector
        .detect(&p, &c, &DetectOptions::new().bootstrap(150))
        .unwrap();
    assert_eq!(a.metadata.seed, Some(77));
    assert_eq!(a, b);

    // A per-call seed wins over the configured one.
    let c_seeded = detector
        .detect(&p, &c, &DetectOptions::new().bootstrap(150).seed(78))
        .unwrap();
    assert_eq!(c_seeded.metadata.seed, Some(78));
}

#[test]
fn entropy_seed_is_reported_and_replayable() {
    let (p, c) = noisy_trend(6);
    let detector = BiasDetector::default();
    let first = detector
        .detect(&p, &c, &DetectOptions::new().bootstrap(150))
        .unwrap();
    let seed = first.metadata.seed.unwrap();

    let replay = detector
        .detect(&p, &c, &DetectOptions::new().bootstrap(150).seed(seed))
        .unwrap();
    assert_eq!(replay.bootstrap, first.bootstrap);
}
