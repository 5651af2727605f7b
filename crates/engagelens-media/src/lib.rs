//! Engagement analysis of recorded video.
//!
//! This crate provides:
//! - The scoring core: emotion scoring, nod detection, nod fusion and
//!   transcript correlation ([`engagement`])
//! - Contracts for the emotion, landmark and speech models ([`collaborators`])
//! - A single-pass analysis pipeline over injected models ([`pipeline`])
//! - FFmpeg-backed frame sampling, probing and audio extraction
//! - Pipeline metrics and a plain-text report renderer

pub mod audio;
pub mod collaborators;
pub mod command;
pub mod config;
pub mod engagement;
pub mod error;
pub mod frames;
pub mod metrics;
pub mod pipeline;
pub mod probe;
pub mod report;

pub use audio::{extract_audio, is_video_path, prepare_audio, AudioInput, VIDEO_EXTENSIONS};
pub use collaborators::{
    CoordinateSpace, Detection, EmotionModel, LandmarkModel, LandmarkPoint, TranscriptOutcome,
    Transcriber,
};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use config::{AnalysisConfig, NodMatchPolicy};
pub use engagement::{EmotionScorer, EngagementCombiner, NodDetector, SegmentCorrelator};
pub use error::{MediaError, MediaResult};
pub use frames::{FfmpegFrameSource, FrameImage, FrameSource, SampledFrame, SampledVideo};
pub use pipeline::{EngagementAnalyzer, SignalAnalysis};
pub use probe::{probe_video, VideoInfo};
pub use report::render_text_report;
