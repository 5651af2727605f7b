//! Contracts for the external models the analysis depends on.
//!
//! Implementations are constructed by the caller and injected into
//! [`EngagementAnalyzer`](crate::pipeline::EngagementAnalyzer); nothing in
//! this crate loads a model itself.

use std::path::Path;

use async_trait::async_trait;
use engagelens_models::{EmotionDistribution, Transcription};

use crate::error::MediaResult;
use crate::frames::SampledFrame;

/// Outcome of running a per-frame model.
///
/// `NoFace` and `Failed` are both expected conditions: the frame simply
/// contributes nothing to that signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection<T> {
    Found(T),
    NoFace,
    Failed(String),
}

impl<T> Detection<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Detection::Found(value) => Some(value),
            Detection::NoFace | Detection::Failed(_) => None,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Detection::Found(_) => "found",
            Detection::NoFace => "no_face",
            Detection::Failed(_) => "failed",
        }
    }
}

impl<T> From<MediaResult<Detection<T>>> for Detection<T> {
    fn from(result: MediaResult<Detection<T>>) -> Self {
        result.unwrap_or_else(|e| Detection::Failed(e.to_string()))
    }
}

/// Unit of a landmark coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateSpace {
    /// Already in `[0, 1]` image space.
    Normalized,
    /// Pixel rows of an image `height` pixels tall.
    Pixels { height: u32 },
}

/// Vertical position of the nose tip of the primary face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkPoint {
    pub y: f64,
    pub space: CoordinateSpace,
}

impl LandmarkPoint {
    pub fn normalized(y: f64) -> Self {
        Self {
            y,
            space: CoordinateSpace::Normalized,
        }
    }

    pub fn pixels(y: f64, height: u32) -> Self {
        Self {
            y,
            space: CoordinateSpace::Pixels { height },
        }
    }

    /// `y` in normalized image units, or `None` for a zero-height image.
    pub fn normalized_y(&self) -> Option<f64> {
        match self.space {
            CoordinateSpace::Normalized => Some(self.y),
            CoordinateSpace::Pixels { height: 0 } => None,
            CoordinateSpace::Pixels { height } => Some(self.y / height as f64),
        }
    }
}

/// Face-emotion classifier.
#[async_trait]
pub trait EmotionModel: Send + Sync {
    /// One distribution per detected face. An empty list is reported as
    /// [`Detection::NoFace`].
    async fn detect_emotions(
        &self,
        frame: &SampledFrame,
    ) -> MediaResult<Detection<Vec<EmotionDistribution>>>;
}

/// Facial-landmark model.
#[async_trait]
pub trait LandmarkModel: Send + Sync {
    /// Nose tip of the primary face, if any.
    async fn locate_nose(&self, frame: &SampledFrame) -> MediaResult<Detection<LandmarkPoint>>;
}

/// Result of a transcription attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptOutcome {
    Transcribed(Transcription),
    Unavailable(String),
}

impl TranscriptOutcome {
    pub fn into_transcription(self) -> Option<Transcription> {
        match self {
            TranscriptOutcome::Transcribed(t) => Some(t),
            TranscriptOutcome::Unavailable(_) => None,
        }
    }
}

/// Speech-to-text service.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file (already extracted from its container).
    async fn transcribe(&self, audio_path: &Path) -> TranscriptOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediaError;

    #[test]
    fn test_pixel_landmarks_are_normalized() {
        let point = LandmarkPoint::pixels(360.0, 720);
        assert_eq!(point.normalized_y(), Some(0.5));
        assert_eq!(LandmarkPoint::normalized(0.42).normalized_y(), Some(0.42));
        assert_eq!(LandmarkPoint::pixels(10.0, 0).normalized_y(), None);
    }

    #[test]
    fn test_model_error_becomes_failed_detection() {
        let result: MediaResult<Detection<LandmarkPoint>> =
            Err(MediaError::detection_failed("timeout"));
        let detection = Detection::from(result);
        assert_eq!(detection.kind(), "failed");
        assert!(detection.found().is_none());
    }

    #[test]
    fn test_unavailable_transcript_has_no_content() {
        let outcome = TranscriptOutcome::Unavailable("model offline".into());
        assert!(outcome.into_transcription().is_none());
    }
}
