//! Time-indexed engagement entries.
//!
//! A video's analysis produces two independent timelines in one forward pass
//! over the sampled frames: emotion-based [`FrameEngagement`] entries and
//! discrete [`NodEvent`]s. They are fused into [`CombinedEntry`] points.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum engagement score.
pub const MAX_SCORE: f64 = 100.0;

/// Aggregate emotion-based engagement for one sampled frame.
///
/// Only frames with at least one detected face produce an entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameEngagement {
    /// Seconds from the start of the video
    pub timestamp: f64,
    /// Mean per-face score, floored (0-100)
    pub score: u32,
    /// Number of faces the score was averaged over (always >= 1)
    pub num_people: u32,
}

impl FrameEngagement {
    pub fn new(timestamp: f64, score: u32, num_people: u32) -> Self {
        Self {
            timestamp,
            score,
            num_people,
        }
    }
}

/// A single detected downward head nod.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct NodEvent {
    /// Seconds from the start of the video
    pub timestamp: f64,
}

impl NodEvent {
    pub fn new(timestamp: f64) -> Self {
        Self { timestamp }
    }
}

/// One timeline point after nod fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CombinedEntry {
    /// Seconds from the start of the video
    pub timestamp: f64,
    /// Unchanged emotion-based score
    pub base_score: u32,
    /// Boost contributed by a coinciding nod (>= 0, 2 decimals)
    pub nod_boost: f64,
    /// `min(100, base_score + nod_boost)`, 2 decimals
    pub final_score: f64,
    /// Faces detected in the frame
    pub num_people: u32,
    /// Nod the boost was attributed to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nod_timestamp: Option<f64>,
}

impl CombinedEntry {
    /// Whether a nod contributed to this entry.
    pub fn is_boosted(&self) -> bool {
        self.nod_timestamp.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nod_event_serializes_as_number() {
        let events = vec![NodEvent::new(1.5), NodEvent::new(3.0)];
        assert_eq!(serde_json::to_string(&events).unwrap(), "[1.5,3.0]");
    }

    #[test]
    fn test_combined_entry_omits_missing_nod() {
        let entry = CombinedEntry {
            timestamp: 2.0,
            base_score: 40,
            nod_boost: 0.0,
            final_score: 40.0,
            num_people: 1,
            nod_timestamp: None,
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("nod_timestamp").is_none());
        assert_eq!(json["final_score"], 40.0);
        assert!(!entry.is_boosted());
    }
}
