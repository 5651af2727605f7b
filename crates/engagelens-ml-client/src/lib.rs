//! HTTP client for the model inference service.
//!
//! [`MlClient`] implements the emotion, landmark and transcription contracts
//! of `engagelens-media` by calling a separately deployed inference service
//! (`/emotion`, `/landmarks`, `/transcribe`, `/health`).

pub mod client;
pub mod error;
pub mod types;

pub use client::{MlClient, MlClientConfig};
pub use error::{MlError, MlResult};
pub use types::{EmotionResponse, FrameRequest, LandmarkResponse, TranscribeResponse};
