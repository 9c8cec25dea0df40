//! The detector façade.
//!
//! One call runs the full pipeline: validate the inputs, pick thresholds
//! (supplied, configured, or derived from shuffle nulls), score the three
//! indicators (directly or through the bootstrap), apply the 2-of-3 rule and
//! assemble a [`DetectionResult`].

use std::sync::{Mutex, PoisonError};

use tracing::{debug, debug_span, info, warn};

use circbias_core::statistics::resolve_seed;
use circbias_core::{
    adaptive_thresholds, bootstrap_indicator, decide, validate, AdaptiveThresholdConfig,
    BiasError, BootstrapConfig, Diagnostics, EvaluationData, Indicator, IndicatorScores, Matrix,
    ParamTensor, Thresholds,
};

use crate::config::{current_config, DetectionConfig};
use crate::data::EvaluationTable;
use crate::result::{
    default_names, AdaptiveFields, BootstrapFields, DetectionResult, PsiProxy, ResultMetadata,
};

/// Per-call options. Unset fields fall back to the detector's configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectOptions {
    /// Thresholds to use instead of the configured ones.
    pub thresholds: Option<Thresholds>,
    /// Run the bootstrap.
    pub bootstrap: bool,
    /// Replicates per indicator; the configured count when unset.
    pub n_bootstrap: Option<usize>,
    /// Derive thresholds from shuffle nulls.
    pub adaptive_thresholds: bool,
    /// Parameter tensor Θ used as the PSI proxy.
    pub params: Option<ParamTensor>,
    /// Column labels of P.
    pub algorithm_names: Option<Vec<String>>,
    /// Column labels of C.
    pub constraint_names: Option<Vec<String>>,
    /// Master seed for this call.
    pub seed: Option<u64>,
}

impl DetectOptions {
    /// Options with everything taken from the configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use these thresholds.
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Enable the bootstrap with the configured replicate count.
    pub fn enable_bootstrap(mut self) -> Self {
        self.bootstrap = true;
        self
    }

    /// Enable the bootstrap with `n` replicates.
    pub fn bootstrap(mut self, n: usize) -> Self {
        self.bootstrap = true;
        self.n_bootstrap = Some(n);
        self
    }

    /// Derive thresholds from shuffle nulls.
    pub fn adaptive_thresholds(mut self) -> Self {
        self.adaptive_thresholds = true;
        self
    }

    /// Use Θ as the PSI proxy.
    pub fn params(mut self, params: ParamTensor) -> Self {
        self.params = Some(params);
        self
    }

    /// Label the algorithm columns.
    pub fn algorithm_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.algorithm_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Label the constraint columns.
    pub fn constraint_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraint_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Fix the master seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Circular-reasoning-bias detector.
///
/// Runs with a validated [`DetectionConfig`] (fixed, or the process-wide one)
/// and keeps a copy of the most recent result for report rendering. Results never depend on the retained copy.
///
/// # Example
///
/// ```ignore
/// use circbias::{BiasDetector, DetectOptions, DetectionConfig};
///
/// let detector = BiasDetector::new(DetectionConfig::default())?;
/// let result = detector.detect(&performance, &constraints, &DetectOptions::new().bootstrap(1000))?;
/// if result.overall_bias {
///     println!("bias suspected ({} of 3 indicators)", result.bias_votes);
/// }
/// ```
#[derive(Debug)]
pub struct BiasDetector {
    source: ConfigSource,
    last: Mutex<Option<DetectionResult>>,
}

#[derive(Debug, Clone, Copy)]
enum ConfigSource {
    Fixed(DetectionConfig),
    Global,
}

impl Default for BiasDetector {
    fn default() -> Self {
        Self::with_source(ConfigSource::Fixed(DetectionConfig::default()))
    }
}

impl BiasDetector {
    /// Create a detector after validating `config`.
    pub fn new(config: DetectionConfig) -> Result<Self, BiasError> {
        config.validate()?;
        Ok(Self::with_source(ConfigSource::Fixed(config)))
    }

    /// Create a detector that follows the process-wide configuration.
    ///
    /// Each call reads [`current_config`] once on entry, so a
    /// [`set_config`](crate::set_config) between calls applies to the next call.
    pub fn from_global() -> Self {
        Self::with_source(ConfigSource::Global)
    }

    fn with_source(source: ConfigSource) -> Self {
        Self {
            source,
            last: Mutex::new(None),
        }
    }

    /// The configuration the next call runs with.
    pub fn config(&self) -> DetectionConfig {
        match self.source {
            ConfigSource::Fixed(config) => config,
            ConfigSource::Global => current_config(),
        }
    }

    /// Most recent successful result, if any.
    pub fn last_result(&self) -> Option<DetectionResult> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Detect on a performance matrix (T, K) and a constraint matrix (T, p).
    pub fn detect(
        &self,
        performance: &Matrix,
        constraints: &Matrix,
        options: &DetectOptions,
    ) -> Result<DetectionResult, BiasError> {
        let data = EvaluationData::new(performance.clone(), constraints.clone());
        self.detect_data(data, options)
    }

    /// Detect on a tabular evaluation log.
    ///
    /// Algorithm and constraint names default to the table's; period labels are
    /// reported in the metadata.
    pub fn detect_table(
        &self,
        table: &EvaluationTable,
        options: &DetectOptions,
    ) -> Result<DetectionResult, BiasError> {
        let pivoted = table.pivot()?;
        debug!(
            records = table.len(),
            periods = pivoted.periods.len(),
            algorithms = pivoted.algorithm_names.len(),
            "pivoted evaluation table"
        );
        let mut options = options.clone();
        options
            .algorithm_names
            .get_or_insert(pivoted.algorithm_names);
        options
            .constraint_names
            .get_or_insert_with(|| table.constraint_names.clone());
        let mut result = self.run(pivoted.data, &options)?;
        result.metadata.periods = Some(pivoted.periods);
        self.remember(&result);
        Ok(result)
    }

    /// Detect on an owned input bundle.
    pub fn detect_data(
        &self,
        data: EvaluationData,
        options: &DetectOptions,
    ) -> Result<DetectionResult, BiasError> {
        let result = self.run(data, options)?;
        self.remember(&result);
        Ok(result)
    }

    fn remember(&self, result: &DetectionResult) {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());
    }

    fn run(
        &self,
        mut data: EvaluationData,
        options: &DetectOptions,
    ) -> Result<DetectionResult, BiasError> {
        let config = self.config();
        if let Some(params) = &options.params {
            data.params = Some(params.clone());
        }

        let _span = debug_span!(
            "detect",
            time_periods = data.time_periods(),
            num_algorithms = data.num_algorithms(),
            num_constraints = data.num_constraints(),
        )
        .entered();

        validate(&data, &config.limits)?;
        let algorithm_names = labels(
            "algorithm_names",
            options.algorithm_names.as_deref(),
            "Algorithm",
            data.num_algorithms(),
        )?;
        let constraint_names = labels(
            "constraint_names",
            options.constraint_names.as_deref(),
            "Constraint",
            data.num_constraints(),
        )?;
        debug!("inputs validated");

        let resamples = options.bootstrap || options.adaptive_thresholds;
        let seed = resamples.then(|| resolve_seed(options.seed.or(config.random_seed)));
        let mut diagnostics = Diagnostics::new();

        let (thresholds, adaptive) = match seed.filter(|_| options.adaptive_thresholds) {
            Some(seed) => {
                let adaptive_config = AdaptiveThresholdConfig {
                    seed: Some(seed),
                    ..config.adaptive_config()
                };
                let derived = adaptive_thresholds(&data, &adaptive_config, &mut diagnostics)?;
                debug!(
                    psi = derived.thresholds.psi,
                    ccs = derived.thresholds.ccs,
                    rho_pc = derived.thresholds.rho_pc,
                    "adaptive thresholds derived"
                );
                let fields = AdaptiveFields {
                    adaptive_quantile: derived.quantile,
                    n_adaptive_simulations: derived.n_simulations,
                    psi_permutation_pvalue: derived.psi_null.p_value,
                    ccs_permutation_pvalue: derived.ccs_null.p_value,
                    rho_pc_permutation_pvalue: derived.rho_null.p_value,
                };
                (derived.thresholds, Some(fields))
            }
            None => {
                let thresholds = options.thresholds.unwrap_or(config.thresholds);
                thresholds.validate()?;
                (thresholds, None)
            }
        };

        let scores = IndicatorScores::compute(&data, &mut diagnostics)?;
        debug!(
            psi = scores.psi,
            ccs = scores.ccs,
            rho_pc = scores.rho_pc,
            "indicators computed"
        );

        let bootstrap = match seed.filter(|_| options.bootstrap) {
            Some(seed) => {
                let defaults = config.bootstrap_config();
                let bootstrap_config = BootstrapConfig {
                    n_bootstrap: options.n_bootstrap.unwrap_or(defaults.n_bootstrap),
                    seed: Some(seed),
                    ..defaults
                };
                let mut local = Diagnostics::new();
                let psi = bootstrap_indicator(Indicator::Psi, &data, &bootstrap_config, &mut local)?;
                let ccs = bootstrap_indicator(Indicator::Ccs, &data, &bootstrap_config, &mut local)?;
                let rho =
                    bootstrap_indicator(Indicator::RhoPc, &data, &bootstrap_config, &mut local)?;
                diagnostics.extend_unique(local);
                debug!(n_bootstrap = bootstrap_config.n_bootstrap, seed, "bootstrap complete");
                Some(BootstrapFields::from_records(&psi, &ccs, &rho))
            }
            None => None,
        };

        let decision = decide(&scores, &thresholds);

        for warning in &diagnostics {
            warn!(severity = ?warning.severity(), "{}", warning);
        }
        info!(
            overall_bias = decision.overall,
            votes = decision.votes,
            psi = scores.psi,
            ccs = scores.ccs,
            rho_pc = scores.rho_pc,
            "detection complete"
        );

        let psi_proxy = if data.params.is_some() {
            PsiProxy::Parameters
        } else {
            PsiProxy::Performance
        };

        Ok(DetectionResult {
            psi_score: scores.psi,
            ccs_score: scores.ccs,
            rho_pc_score: scores.rho_pc,
            psi_bias: decision.psi_flag,
            ccs_bias: decision.ccs_flag,
            rho_pc_bias: decision.rho_flag,
            overall_bias: decision.overall,
            bias_votes: decision.votes,
            confidence: decision.confidence,
            bootstrap,
            adaptive,
            metadata: ResultMetadata {
                time_periods: data.time_periods(),
                num_algorithms: data.num_algorithms(),
                num_constraints: data.num_constraints(),
                algorithm_names,
                constraint_names,
                thresholds,
                adaptive_thresholds_enabled: options.adaptive_thresholds,
                psi_proxy,
                seed,
                periods: None,
            },
            diagnostics,
        })
    }
}

/// Supplied labels checked against the axis length, or `prefix_1..n`.
fn labels(
    name: &str,
    supplied: Option<&[String]>,
    prefix: &str,
    n: usize,
) -> Result<Vec<String>, BiasError> {
    match supplied {
        Some(names) if names.len() != n => {
            Err(BiasError::mismatch(name, "length", n, names.len()))
        }
        Some(names) => Ok(names.to_vec()),
        None => Ok(default_names(prefix, n)),
    }
}
