//! Error taxonomy for bias detection.
//!
//! Every fallible operation in the workspace returns [`BiasError`]. Validation
//! errors abort a call immediately; per-replicate errors inside the bootstrap
//! and permutation engines are absorbed into failure counts and only surface
//! as [`BiasError::AllReplicatesFailed`] when nothing survives.

use serde::{Deserialize, Serialize};

/// Errors produced by the detection engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BiasError {
    /// An input array has the wrong number of dimensions or is ragged/empty.
    #[error("{name} has an invalid shape: {message}")]
    Shape {
        /// Name of the offending input.
        name: String,
        /// What is wrong with the shape.
        message: String,
    },

    /// An axis length disagrees between inputs.
    #[error("{name} {axis} mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Name of the offending input.
        name: String,
        /// Which axis disagrees ("rows", "algorithms", "length", ...).
        axis: &'static str,
        /// Length implied by the reference input.
        expected: usize,
        /// Length found.
        actual: usize,
    },

    /// NaN or infinity present in an input.
    #[error("{name} contains a non-finite value at {location}")]
    NonFinite {
        /// Name of the offending input.
        name: String,
        /// Human-readable position of the first non-finite entry.
        location: String,
    },

    /// Too few observations for the requested computation.
    #[error("insufficient data for {name}: need at least {required}, got {actual}")]
    InsufficientData {
        /// Name of the offending input or axis.
        name: String,
        /// Minimum required count.
        required: usize,
        /// Count found.
        actual: usize,
    },

    /// A configuration value is outside its legal range.
    #[error("invalid configuration for {parameter}: {message}")]
    Configuration {
        /// Name of the offending option.
        parameter: String,
        /// Description of the legal range.
        message: String,
    },

    /// Arithmetic failure inside the indicator kernel or a user metric.
    #[error("computation failed: {message}")]
    Computation {
        /// Description of the failure.
        message: String,
    },

    /// The permutation engine could not produce a single valid replicate.
    #[error("all {attempted} replicates failed")]
    AllReplicatesFailed {
        /// Number of replicates attempted.
        attempted: usize,
    },

    /// A requested parallel backend is not available.
    #[error("backend {backend} is unavailable: {reason}")]
    BackendUnavailable {
        /// Backend that was requested.
        backend: String,
        /// Why it cannot be used.
        reason: String,
    },
}

/// Discriminant of [`BiasError`], stable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`BiasError::Shape`].
    Shape,
    /// See [`BiasError::DimensionMismatch`].
    DimensionMismatch,
    /// See [`BiasError::NonFinite`].
    NonFinite,
    /// See [`BiasError::InsufficientData`].
    InsufficientData,
    /// See [`BiasError::Configuration`].
    Configuration,
    /// See [`BiasError::Computation`].
    Computation,
    /// See [`BiasError::AllReplicatesFailed`].
    AllReplicatesFailed,
    /// See [`BiasError::BackendUnavailable`].
    BackendUnavailable,
}

/// User-visible structured error record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Error kind.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Offending parameter or input name, when one applies.
    pub parameter: Option<String>,
}

impl BiasError {
    /// Build a shape error for `name`.
    pub fn shape(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Shape {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Build a dimension-mismatch error for `name` along `axis`.
    pub fn mismatch(
        name: impl Into<String>,
        axis: &'static str,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::DimensionMismatch {
            name: name.into(),
            axis,
            expected,
            actual,
        }
    }

    /// Build a configuration error for `parameter`.
    pub fn configuration(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Build a computation error.
    pub fn computation(message: impl Into<String>) -> Self {
        Self::Computation {
            message: message.into(),
        }
    }

    /// The kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Shape { .. } => ErrorKind::Shape,
            Self::DimensionMismatch { .. } => ErrorKind::DimensionMismatch,
            Self::NonFinite { .. } => ErrorKind::NonFinite,
            Self::InsufficientData { .. } => ErrorKind::InsufficientData,
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Computation { .. } => ErrorKind::Computation,
            Self::AllReplicatesFailed { .. } => ErrorKind::AllReplicatesFailed,
            Self::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
        }
    }

    /// Name of the offending parameter or input, when one applies.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Shape { name, .. }
            | Self::DimensionMismatch { name, .. }
            | Self::NonFinite { name, .. }
            | Self::InsufficientData { name, .. } => Some(name.as_str()),
            Self::Configuration { parameter, .. } => Some(parameter.as_str()),
            Self::BackendUnavailable { backend, .. } => Some(backend.as_str()),
            Self::Computation { .. } | Self::AllReplicatesFailed { .. } => None,
        }
    }

    /// Convert into the structured record handed to callers.
    pub fn to_record(&self) -> ErrorRecord {
        ErrorRecord {
            kind: self.kind(),
            message: self.to_string(),
            parameter: self.parameter().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_parameter() {
        let err = BiasError::configuration("psi_threshold", "must be in (0, 1)");
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.parameter(), Some("psi_threshold"));

        let err = BiasError::AllReplicatesFailed { attempted: 10 };
        assert_eq!(err.kind(), ErrorKind::AllReplicatesFailed);
        assert!(err.parameter().is_none());
    }

    #[test]
    fn test_display_messages() {
        let err = BiasError::mismatch("constraints", "rows", 5, 4);
        assert_eq!(
            err.to_string(),
            "constraints rows mismatch: expected 5, got 4"
        );

        let err = BiasError::InsufficientData {
            name: "time_periods".into(),
            required: 2,
            actual: 1,
        };
        assert!(err.to_string().contains("need at least 2, got 1"));
    }

    #[test]
    fn test_record_serializes_snake_case_kind() {
        let record = BiasError::shape("performance", "ragged rows").to_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"shape\""));
        assert!(json.contains("\"parameter\":\"performance\""));
    }
}
