//! Analysis pipeline metrics.
//!
//! Recorded through the `metrics` facade; a binary decides whether a
//! recorder (Prometheus) is installed.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const FRAMES_SAMPLED_TOTAL: &str = "engagelens_frames_sampled_total";
    pub const DETECTION_MISSES_TOTAL: &str = "engagelens_detection_misses_total";
    pub const NODS_DETECTED_TOTAL: &str = "engagelens_nods_detected_total";
    pub const ANALYSIS_DURATION_SECONDS: &str = "engagelens_analysis_duration_seconds";
    pub const LOW_ENGAGEMENT_SEGMENTS_TOTAL: &str = "engagelens_low_engagement_segments_total";
    pub const TRANSCRIPTIONS_UNAVAILABLE_TOTAL: &str = "engagelens_transcriptions_unavailable_total";
}

/// Record frames handed to the models.
pub fn record_frames_sampled(count: usize) {
    counter!(names::FRAMES_SAMPLED_TOTAL).increment(count as u64);
}

/// Record a frame a model produced nothing for.
///
/// `model` is `emotion` or `landmark`, `reason` is `no_face` or `failed`.
pub fn record_detection_miss(model: &'static str, reason: &'static str) {
    counter!(names::DETECTION_MISSES_TOTAL, "model" => model, "reason" => reason).increment(1);
}

pub fn record_nods_detected(count: u32) {
    counter!(names::NODS_DETECTED_TOTAL).increment(u64::from(count));
}

pub fn record_analysis_duration(duration_secs: f64) {
    histogram!(names::ANALYSIS_DURATION_SECONDS).record(duration_secs);
}

pub fn record_low_engagement_segments(count: usize) {
    counter!(names::LOW_ENGAGEMENT_SEGMENTS_TOTAL).increment(count as u64);
}

pub fn record_transcription_unavailable() {
    counter!(names::TRANSCRIPTIONS_UNAVAILABLE_TOTAL).increment(1);
}
