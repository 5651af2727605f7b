//! Summary statistics and the final analysis payload.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::timeline::{CombinedEntry, NodEvent};
use crate::transcript::{LowEngagementSegment, Transcription};

/// Statistics over the emotion-only timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionSummary {
    /// Decoded duration in seconds (`total_frames / fps`)
    pub total_duration: f64,
    /// Frame rate used for timestamps
    pub fps: f64,
    /// Mean base score (0 when no frame had a face)
    pub average_score: f64,
    pub min_score: u32,
    pub max_score: u32,
    /// Mean faces per scored frame, 2 decimals
    pub average_people: f64,
}

/// Spacing between consecutive nods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NodIntervalStats {
    /// Mean gap in seconds, 2 decimals
    pub average: f64,
    /// Shortest gap in seconds, 2 decimals
    pub shortest: f64,
    /// Longest gap in seconds, 2 decimals
    pub longest: f64,
}

/// Output of the nod detection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NodSummary {
    /// Always equal to `nod_history.len()`
    pub nod_count: u32,
    /// Nod timestamps in detection order
    pub nod_history: Vec<NodEvent>,
    pub total_duration: f64,
    pub fps: f64,
    /// Present when at least two nods were detected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervals: Option<NodIntervalStats>,
}

/// Statistics over the fused timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngagementSummary {
    /// Mean final score (unrounded, 0 when empty)
    pub average_score: f64,
    pub max_score: f64,
    pub min_score: f64,
    /// Nods detected in the whole video, matched or not
    pub total_nods: u32,
    /// Mean faces per scored frame, 2 decimals
    pub average_people: f64,
}

/// Fused timeline plus its summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CombinedEngagement {
    pub combined_history: Vec<CombinedEntry>,
    #[serde(flatten)]
    pub summary: EngagementSummary,
}

/// Complete response for one analysed recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EngagementReport {
    #[serde(flatten)]
    pub engagement: CombinedEngagement,
    /// Emotion pass statistics
    pub emotion: EmotionSummary,
    /// Nod pass statistics
    pub nods: NodSummary,
    /// `None` when transcription was unavailable
    pub transcription: Option<Transcription>,
    pub low_engagement_segments: Vec<LowEngagementSegment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flattens_engagement_fields() {
        let report = EngagementReport {
            engagement: CombinedEngagement {
                combined_history: Vec::new(),
                summary: EngagementSummary {
                    total_nods: 3,
                    ..Default::default()
                },
            },
            ..Default::default()
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total_nods"], 3);
        assert!(json["combined_history"].as_array().unwrap().is_empty());
        assert!(json["transcription"].is_null());
        assert!(json["low_engagement_segments"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_nod_summary_omits_missing_intervals() {
        let summary = NodSummary {
            nod_count: 1,
            nod_history: vec![NodEvent::new(2.0)],
            total_duration: 10.0,
            fps: 30.0,
            intervals: None,
        };

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("intervals").is_none());
        assert_eq!(json["nod_history"][0], 2.0);
    }
}
