//! Shared data models for the engagement analysis pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Per-face emotion distributions
//! - Frame engagement, nod events and the fused timeline
//! - Transcripts and flagged low-engagement segments
//! - Summary statistics and the final report payload

pub mod emotion;
pub mod report;
pub mod timeline;
pub mod timestamp;
pub mod transcript;
pub mod utils;

// Re-export common types
pub use emotion::{EmotionDistribution, EmotionLabel};
pub use report::{
    CombinedEngagement, EmotionSummary, EngagementReport, EngagementSummary, NodIntervalStats,
    NodSummary,
};
pub use timeline::{CombinedEntry, FrameEngagement, NodEvent, MAX_SCORE};
pub use transcript::{LowEngagementSegment, TranscriptSegment, Transcription};
