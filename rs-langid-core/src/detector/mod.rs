//! Detection engine on top of the rule filter and the n-gram models.

/// High-level detector: rule shortcut, candidate filtering, n-gram scoring
/// and ranking.
pub mod language_detector;

/// Detector settings with validated setters and environment overrides.
pub mod config;

/// Ranked confidence values returned by the detector.
pub mod confidence;
