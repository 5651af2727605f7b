//! Transcript / engagement correlation.

use engagelens_models::timestamp::format_segment_label;
use engagelens_models::utils::{mean, round2};
use engagelens_models::{CombinedEntry, LowEngagementSegment, TranscriptSegment};

/// Mean final score of the entries inside `[segment.start, segment.end]`,
/// or `None` when the segment covers no entry.
pub fn segment_engagement(entries: &[CombinedEntry], segment: &TranscriptSegment) -> Option<f64> {
    mean(
        entries
            .iter()
            .filter(|entry| segment.covers(entry.timestamp))
            .map(|entry| entry.final_score),
    )
}

/// Flags transcript segments spoken while engagement was low.
#[derive(Debug, Clone, Copy)]
pub struct SegmentCorrelator {
    threshold: f64,
}

impl Default for SegmentCorrelator {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl SegmentCorrelator {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Segments whose mean engagement is strictly below the threshold, in
    /// transcript order. Segments covering no entry are skipped.
    pub fn low_engagement_segments(
        &self,
        entries: &[CombinedEntry],
        segments: &[TranscriptSegment],
    ) -> Vec<LowEngagementSegment> {
        segments
            .iter()
            .filter_map(|segment| {
                let average = segment_engagement(entries, segment)?;
                (average < self.threshold).then(|| LowEngagementSegment {
                    timestamp: format_segment_label(segment.start),
                    text: segment.text.clone(),
                    engagement_score: round2(average),
                })
            })
            .collect()
    }
}
