//! Multi-signal engagement scoring.
//!
//! Four stages turn per-frame model output into a report:
//!
//! 1. [`EmotionScorer`] maps the emotion distributions of one frame to an
//!    integer engagement score.
//! 2. [`NodDetector`] scans nose positions for downward nods.
//! 3. [`EngagementCombiner`] lifts timeline entries that coincide with a nod.
//! 4. [`SegmentCorrelator`] averages the lifted scores over transcript
//!    segments and flags the quiet ones.
//!
//! Every stage is synchronous and owns its state for one recording only.

pub mod combiner;
pub mod correlator;
pub mod emotion_scorer;
pub mod nod_detector;

pub use combiner::{group_nod_boost, EngagementCombiner};
pub use correlator::{segment_engagement, SegmentCorrelator};
pub use emotion_scorer::{score_frame, EmotionScorer, FaceScore};
pub use nod_detector::{nod_intervals, NodDetector};
