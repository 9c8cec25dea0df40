//! JSON serialization for detection results.
//!
//! Floats are written with enough digits to read back bit-identical, so a
//! result survives `to_json` followed by `from_json` unchanged.

use crate::result::DetectionResult;

/// Serialize a result to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for DetectionResult).
pub fn to_json(result: &DetectionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string(result)
}

/// Serialize a result to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for DetectionResult).
pub fn to_json_pretty(result: &DetectionResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

/// Read a result back from JSON.
pub fn from_json(json: &str) -> Result<DetectionResult, serde_json::Error> {
    serde_json::from_str(json)
}
