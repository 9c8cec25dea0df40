//! Serialized forms of detection results.

pub mod json;

pub use json::{from_json, to_json, to_json_pretty};
