//! Per-face emotion distributions produced by the face-emotion model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Emotion labels that take part in scoring.
///
/// Producers may report additional labels (e.g. `disgust`); those are
/// dropped during deserialization of [`EmotionDistribution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmotionLabel {
    Happy,
    Sad,
    Angry,
    Fear,
    Surprise,
    Neutral,
}

impl EmotionLabel {
    /// All scored labels, in a stable order.
    pub const ALL: [EmotionLabel; 6] = [
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Fear,
        Self::Surprise,
        Self::Neutral,
    ];

    /// Returns the label as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Fear => "fear",
            Self::Surprise => "surprise",
            Self::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected face's emotion breakdown for one frame.
///
/// Intensities are percentages in `[0, 100]` and sum to roughly 100 across
/// all labels the producer knows about. Missing labels read as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EmotionDistribution {
    #[serde(default)]
    pub happy: f64,
    #[serde(default)]
    pub sad: f64,
    #[serde(default)]
    pub angry: f64,
    #[serde(default)]
    pub fear: f64,
    #[serde(default)]
    pub surprise: f64,
    #[serde(default)]
    pub neutral: f64,
}

impl EmotionDistribution {
    /// Intensity for a single label.
    pub fn intensity(&self, label: EmotionLabel) -> f64 {
        match label {
            EmotionLabel::Happy => self.happy,
            EmotionLabel::Sad => self.sad,
            EmotionLabel::Angry => self.angry,
            EmotionLabel::Fear => self.fear,
            EmotionLabel::Surprise => self.surprise,
            EmotionLabel::Neutral => self.neutral,
        }
    }

    /// Builder-style setter for a single label.
    pub fn with(mut self, label: EmotionLabel, value: f64) -> Self {
        let slot = match label {
            EmotionLabel::Happy => &mut self.happy,
            EmotionLabel::Sad => &mut self.sad,
            EmotionLabel::Angry => &mut self.angry,
            EmotionLabel::Fear => &mut self.fear,
            EmotionLabel::Surprise => &mut self.surprise,
            EmotionLabel::Neutral => &mut self.neutral,
        };
        *slot = value;
        self
    }
}
