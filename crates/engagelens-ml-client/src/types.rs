//! ML service request/response types.

use engagelens_media::collaborators::LandmarkPoint;
use engagelens_models::{EmotionDistribution, TranscriptSegment, Transcription};
use serde::{Deserialize, Serialize};

/// One frame sent for emotion or landmark inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRequest {
    /// Base64-encoded JPEG
    pub image: String,
    /// Frame index in the source video
    pub frame_index: u64,
    /// Seconds from the start of the video
    pub timestamp: f64,
}

/// One detected face with its emotion percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceEmotion {
    pub emotion: EmotionDistribution,
    /// Face detector confidence, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Response from `/emotion`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmotionResponse {
    #[serde(default)]
    pub faces: Vec<FaceEmotion>,
}

/// Unit the landmark service reports coordinates in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkUnits {
    #[default]
    Normalized,
    Pixels,
}

/// Response from `/landmarks` for the primary face.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkResponse {
    /// Nose-tip vertical coordinate, absent when no face was found
    #[serde(default)]
    pub nose_y: Option<f64>,
    #[serde(default)]
    pub units: LandmarkUnits,
    /// Image height in pixels, required for `pixels` units
    #[serde(default)]
    pub image_height: Option<u32>,
}

impl LandmarkResponse {
    /// Landmark point for the primary face, if any.
    ///
    /// Pixel coordinates without an image height cannot be normalized and
    /// are treated as missing.
    pub fn nose(&self) -> Option<LandmarkPoint> {
        let y = self.nose_y?;
        match self.units {
            LandmarkUnits::Normalized => Some(LandmarkPoint::normalized(y)),
            LandmarkUnits::Pixels => self.image_height.map(|h| LandmarkPoint::pixels(y, h)),
        }
    }
}

/// Response from `/transcribe`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscribeResponse {
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

impl From<TranscribeResponse> for Transcription {
    fn from(response: TranscribeResponse) -> Self {
        Transcription {
            full_text: response.full_text,
            segments: response.segments,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}
