//! ML service HTTP client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use engagelens_media::collaborators::{
    Detection, EmotionModel, LandmarkModel, LandmarkPoint, TranscriptOutcome, Transcriber,
};
use engagelens_media::frames::SampledFrame;
use engagelens_media::MediaResult;
use engagelens_models::EmotionDistribution;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{MlError, MlResult};
use crate::types::{
    EmotionResponse, FrameRequest, HealthResponse, LandmarkResponse, TranscribeResponse,
};

/// Configuration for ML client.
#[derive(Debug, Clone)]
pub struct MlClientConfig {
    /// Base URL of ML service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further attempt
    pub retry_base_delay: Duration,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(300), // transcription of long recordings
            max_retries: 2,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl MlClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                std::env::var("ML_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            max_retries: std::env::var("ML_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

/// Client for the inference service.
pub struct MlClient {
    http: Client,
    config: MlClientConfig,
}

impl MlClient {
    /// Create a new ML client.
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    /// Check if ML service is healthy.
    pub async fn health_check(&self) -> MlResult<bool> {
        let url = self.url("health");

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("ML service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("ML service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// Emotion distributions for every face in a frame.
    pub async fn emotions(&self, frame: &FrameRequest) -> MlResult<Vec<EmotionDistribution>> {
        let response: EmotionResponse = self.post_json("emotion", frame).await?;
        Ok(response.faces.into_iter().map(|face| face.emotion).collect())
    }

    /// Nose landmark of the primary face in a frame.
    pub async fn landmarks(&self, frame: &FrameRequest) -> MlResult<Option<LandmarkPoint>> {
        let response: LandmarkResponse = self.post_json("landmarks", frame).await?;
        Ok(response.nose())
    }

    /// Transcribe an audio file.
    pub async fn transcribe_file(&self, audio_path: &Path) -> MlResult<TranscribeResponse> {
        let url = self.url("transcribe");
        let audio = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio.wav".to_string());

        debug!(bytes = audio.len(), %url, "Sending transcription request");

        let response = self
            .with_retry(|| async {
                let part = Part::bytes(audio.clone())
                    .file_name(file_name.clone())
                    .mime_str("audio/wav")?;
                let response = self
                    .http
                    .post(&url)
                    .multipart(Form::new().part("audio", part))
                    .send()
                    .await?;
                check_status(response).await
            })
            .await?;

        response
            .json()
            .await
            .map_err(|e| MlError::InvalidResponse(e.to_string()))
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        frame: &FrameRequest,
    ) -> MlResult<T> {
        let url = self.url(endpoint);

        let response = self
            .with_retry(|| async {
                let response = self.http.post(&url).json(frame).send().await?;
                check_status(response).await
            })
            .await?;

        response
            .json()
            .await
            .map_err(|e| MlError::InvalidResponse(e.to_string()))
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt);
                    warn!(
                        "ML request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(MlError::RequestFailed("Unknown error".to_string())))
    }
}

async fn check_status(response: reqwest::Response) -> MlResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MlError::from_status(status, body))
}

async fn frame_request(frame: &SampledFrame) -> MediaResult<FrameRequest> {
    Ok(FrameRequest {
        image: frame.base64_image().await?.to_string(),
        frame_index: frame.index,
        timestamp: frame.timestamp,
    })
}

#[async_trait]
impl EmotionModel for MlClient {
    async fn detect_emotions(
        &self,
        frame: &SampledFrame,
    ) -> MediaResult<Detection<Vec<EmotionDistribution>>> {
        let request = frame_request(frame).await?;

        Ok(match self.emotions(&request).await {
            Ok(faces) if faces.is_empty() => Detection::NoFace,
            Ok(faces) => Detection::Found(faces),
            Err(e) => Detection::Failed(e.to_string()),
        })
    }
}

#[async_trait]
impl LandmarkModel for MlClient {
    async fn locate_nose(&self, frame: &SampledFrame) -> MediaResult<Detection<LandmarkPoint>> {
        let request = frame_request(frame).await?;

        Ok(match self.landmarks(&request).await {
            Ok(Some(point)) => Detection::Found(point),
            Ok(None) => Detection::NoFace,
            Err(e) => Detection::Failed(e.to_string()),
        })
    }
}

#[async_trait]
impl Transcriber for MlClient {
    async fn transcribe(&self, audio_path: &Path) -> TranscriptOutcome {
        match self.transcribe_file(audio_path).await {
            Ok(response) => TranscriptOutcome::Transcribed(response.into()),
            Err(e) => TranscriptOutcome::Unavailable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engagelens_media::frames::FrameImage;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> MlClient {
        MlClient::new(
            MlClientConfig::default()
                .with_base_url(server.uri())
                .with_retry_base_delay(Duration::from_millis(1)),
        )
        .unwrap()
    }

    fn frame() -> SampledFrame {
        SampledFrame::new(60, 2.0, FrameImage::Encoded(b"jpeg".to_vec()))
    }

    #[test]
    fn test_config_defaults() {
        let config = MlClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8001");
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert_eq!(config.max_retries, 2);
    }

    #[tokio::test]
    async fn test_emotions_are_parsed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emotion"))
            .and(body_partial_json(json!({"frame_index": 60, "image": "anBlZw=="})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "faces": [
                    {"emotion": {"happy": 80.0, "neutral": 20.0}},
                    {"emotion": {"sad": 100.0}, "confidence": 0.93}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let detection = client(&server).detect_emotions(&frame()).await.unwrap();
        let faces = detection.found().unwrap();
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].happy, 80.0);
        assert_eq!(faces[1].sad, 100.0);
    }

    #[tokio::test]
    async fn test_empty_faces_is_no_face() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emotion"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"faces": []})))
            .mount(&server)
            .await;

        let detection = client(&server).detect_emotions(&frame()).await.unwrap();
        assert_eq!(detection, Detection::NoFace);
    }

    #[tokio::test]
    async fn test_landmarks() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/landmarks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "nose_y": 240.0, "units": "pixels", "image_height": 480
            })))
            .mount(&server)
            .await;

        let detection = client(&server).locate_nose(&frame()).await.unwrap();
        assert_eq!(detection, Detection::Found(LandmarkPoint::pixels(240.0, 480)));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_reported_as_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/landmarks"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let detection = client(&server).locate_nose(&frame()).await.unwrap();
        assert!(matches!(detection, Detection::Failed(_)));
    }

    #[tokio::test]
    async fn test_zero_retries_fails_on_first_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emotion"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = MlClient::new(
            MlClientConfig::default()
                .with_base_url(server.uri())
                .with_max_retries(0),
        )
        .unwrap();
        let detection = client.detect_emotions(&frame()).await.unwrap();
        assert!(matches!(detection, Detection::Failed(_)));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/emotion"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad image"))
            .expect(1)
            .mount(&server)
            .await;

        let detection = client(&server).detect_emotions(&frame()).await.unwrap();
        assert!(matches!(detection, Detection::Failed(reason) if reason.contains("bad image")));
    }

    #[tokio::test]
    async fn test_transcription() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "full_text": "hello there",
                "segments": [{"start": 0.0, "end": 10.0, "text": "hello there"}]
            })))
            .mount(&server)
            .await;

        let audio = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        std::fs::write(audio.path(), b"RIFF").unwrap();

        let outcome = client(&server).transcribe(audio.path()).await;
        let transcription = outcome.into_transcription().unwrap();
        assert_eq!(transcription.full_text, "hello there");
        assert_eq!(transcription.segments.len(), 1);
        assert_eq!(transcription.segments[0].end, 10.0);
    }

    #[tokio::test]
    async fn test_transcription_failure_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let outcome = client(&server)
            .transcribe(Path::new("/nonexistent/audio.wav"))
            .await;
        assert!(matches!(outcome, TranscriptOutcome::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;

        assert!(client(&server).health_check().await.unwrap());
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let client = MlClient::new(MlClientConfig::default().with_base_url("http://127.0.0.1:9")).unwrap();
        assert!(!client.health_check().await.unwrap());
    }
}
