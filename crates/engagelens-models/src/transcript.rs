//! Speech transcription types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One timed chunk of transcribed speech.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds (>= start)
    pub end: f64,
    /// Spoken text
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Segment duration in seconds.
    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Whether `timestamp` lies inside `[start, end]`.
    pub fn covers(&self, timestamp: f64) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Full output of the transcription service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transcription {
    /// Whole-recording text
    pub full_text: String,
    /// Ordered timed segments
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// A transcript segment whose mean engagement fell below the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LowEngagementSegment {
    /// Segment start formatted as `m:ss`
    pub timestamp: String,
    /// Segment text
    pub text: String,
    /// Mean final score over the covered entries (2 decimals)
    pub engagement_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_is_inclusive() {
        let segment = TranscriptSegment::new(10.0, 20.0, "hello");
        assert!(segment.covers(10.0));
        assert!(segment.covers(20.0));
        assert!(!segment.covers(20.01));
        assert!((segment.duration() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transcription_defaults_segments() {
        let t: Transcription = serde_json::from_str(r#"{"full_text": "hi"}"#).unwrap();
        assert!(t.segments.is_empty());
    }
}
