//! Analysis configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::frames::DEFAULT_FALLBACK_FPS;

/// Which nod is attributed to a timeline entry when several fall inside its
/// coincidence window.
///
/// The boost itself only depends on the entry's score and head count, so the
/// policy decides which `nod_timestamp` the entry reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodMatchPolicy {
    /// Earliest matching nod.
    FirstMatch,
    /// Latest matching nod (later matches overwrite earlier ones).
    #[default]
    LastMatch,
    /// The matching nod yielding the largest boost, earliest on ties.
    MaxBoost,
}

impl NodMatchPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodMatchPolicy::FirstMatch => "first-match",
            NodMatchPolicy::LastMatch => "last-match",
            NodMatchPolicy::MaxBoost => "max-boost",
        }
    }
}

impl fmt::Display for NodMatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "first-match" | "first" => Ok(NodMatchPolicy::FirstMatch),
            "last-match" | "last" => Ok(NodMatchPolicy::LastMatch),
            "max-boost" | "max" => Ok(NodMatchPolicy::MaxBoost),
            other => Err(format!("unknown nod match policy: {}", other)),
        }
    }
}

/// Default cap on one frame-sampling decode.
pub const DEFAULT_DECODE_TIMEOUT_SECS: u64 = 600;

/// Tunables for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Analyse every n-th frame
    pub frame_stride: u32,
    /// Minimum vertical nose movement between sampled frames that counts as
    /// nodding, in normalized `[0, 1]` image units
    pub nod_threshold: f64,
    /// Max distance in seconds between a nod and a timeline entry
    pub coincidence_window_secs: f64,
    /// Segments whose mean engagement is strictly below this get flagged
    pub engagement_threshold: f64,
    pub nod_match_policy: NodMatchPolicy,
    /// Frame rate used when the recording reports none
    pub fallback_fps: f64,
    /// Kill a frame decode running longer than this; `None` waits forever
    pub decode_timeout_secs: Option<u64>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_stride: 30,
            nod_threshold: 0.01,
            coincidence_window_secs: 1.0,
            engagement_threshold: 50.0,
            nod_match_policy: NodMatchPolicy::LastMatch,
            fallback_fps: DEFAULT_FALLBACK_FPS,
            decode_timeout_secs: Some(DEFAULT_DECODE_TIMEOUT_SECS),
        }
    }
}

impl AnalysisConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            frame_stride: std::env::var("ANALYSIS_FRAME_STRIDE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|stride: &u32| *stride > 0)
                .unwrap_or(defaults.frame_stride),
            nod_threshold: std::env::var("ANALYSIS_NOD_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|t: &f64| t.is_finite() && *t >= 0.0)
                .unwrap_or(defaults.nod_threshold),
            coincidence_window_secs: std::env::var("ANALYSIS_NOD_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|w: &f64| w.is_finite() && *w >= 0.0)
                .unwrap_or(defaults.coincidence_window_secs),
            engagement_threshold: std::env::var("ANALYSIS_ENGAGEMENT_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|t: &f64| t.is_finite())
                .unwrap_or(defaults.engagement_threshold),
            nod_match_policy: std::env::var("ANALYSIS_NOD_MATCH_POLICY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.nod_match_policy),
            fallback_fps: defaults.fallback_fps,
            decode_timeout_secs: match std::env::var("ANALYSIS_DECODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
            {
                Some(0) => None,
                Some(secs) => Some(secs),
                None => defaults.decode_timeout_secs,
            },
        }
    }

    pub fn with_frame_stride(mut self, stride: u32) -> Self {
        self.frame_stride = stride.max(1);
        self
    }

    pub fn with_nod_threshold(mut self, threshold: f64) -> Self {
        self.nod_threshold = threshold;
        self
    }

    pub fn with_coincidence_window(mut self, secs: f64) -> Self {
        self.coincidence_window_secs = secs;
        self
    }

    pub fn with_engagement_threshold(mut self, threshold: f64) -> Self {
        self.engagement_threshold = threshold;
        self
    }

    pub fn with_nod_match_policy(mut self, policy: NodMatchPolicy) -> Self {
        self.nod_match_policy = policy;
        self
    }

    pub fn with_fallback_fps(mut self, fps: f64) -> Self {
        self.fallback_fps = fps;
        self
    }

    /// `0` disables the decode timeout.
    pub fn with_decode_timeout(mut self, secs: u64) -> Self {
        self.decode_timeout_secs = (secs > 0).then_some(secs);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.frame_stride, 30);
        assert_eq!(config.nod_threshold, 0.01);
        assert_eq!(config.coincidence_window_secs, 1.0);
        assert_eq!(config.engagement_threshold, 50.0);
        assert_eq!(config.nod_match_policy, NodMatchPolicy::LastMatch);
        assert_eq!(config.fallback_fps, 30.0);
        assert_eq!(config.decode_timeout_secs, Some(600));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("first-match".parse(), Ok(NodMatchPolicy::FirstMatch));
        assert_eq!("LAST_MATCH".parse(), Ok(NodMatchPolicy::LastMatch));
        assert_eq!(" max-boost ".parse(), Ok(NodMatchPolicy::MaxBoost));
        assert!("loudest".parse::<NodMatchPolicy>().is_err());
    }

    #[test]
    fn test_policy_round_trips_through_display() {
        for policy in [
            NodMatchPolicy::FirstMatch,
            NodMatchPolicy::LastMatch,
            NodMatchPolicy::MaxBoost,
        ] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
    }

    #[test]
    fn test_builder_clamps_stride() {
        let config = AnalysisConfig::default()
            .with_frame_stride(0)
            .with_nod_match_policy(NodMatchPolicy::MaxBoost);
        assert_eq!(config.frame_stride, 1);
        assert_eq!(config.nod_match_policy, NodMatchPolicy::MaxBoost);
    }

    #[test]
    fn test_zero_decode_timeout_disables_it() {
        assert_eq!(
            AnalysisConfig::default().with_decode_timeout(0).decode_timeout_secs,
            None
        );
        assert_eq!(
            AnalysisConfig::default().with_decode_timeout(45).decode_timeout_secs,
            Some(45)
        );
    }
}
