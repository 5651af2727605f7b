//! Application state.

use std::sync::Arc;

use async_trait::async_trait;
use engagelens_media::{check_ffmpeg, check_ffprobe, AnalysisConfig, EngagementAnalyzer, FfmpegFrameSource};
use engagelens_ml_client::{MlClient, MlResult};

use crate::config::ApiConfig;

/// A dependency checked by `/ready`.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    fn name(&self) -> &'static str;

    async fn check(&self) -> Result<(), String>;
}

#[async_trait]
impl ReadinessProbe for MlClient {
    fn name(&self) -> &'static str {
        "ml_service"
    }

    async fn check(&self) -> Result<(), String> {
        match self.health_check().await {
            Ok(true) => Ok(()),
            Ok(false) => Err("ML service reported unhealthy".to_string()),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// FFmpeg and FFprobe on `PATH`.
pub struct FfmpegProbe;

#[async_trait]
impl ReadinessProbe for FfmpegProbe {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn check(&self) -> Result<(), String> {
        check_ffmpeg().map_err(|e| e.to_string())?;
        check_ffprobe().map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// Analyzer wired to the inference service and FFmpeg.
pub fn build_analyzer(ml: Arc<MlClient>, config: AnalysisConfig) -> EngagementAnalyzer {
    let frames = FfmpegFrameSource::from_config(&config);
    EngagementAnalyzer::new(Arc::new(frames), ml.clone(), ml.clone(), config).with_transcriber(ml)
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub analyzer: Arc<EngagementAnalyzer>,
    pub probes: Vec<Arc<dyn ReadinessProbe>>,
}

impl AppState {
    pub fn new(config: ApiConfig, analyzer: EngagementAnalyzer) -> Self {
        Self {
            config,
            analyzer: Arc::new(analyzer),
            probes: Vec::new(),
        }
    }

    pub fn with_probe(mut self, probe: Arc<dyn ReadinessProbe>) -> Self {
        self.probes.push(probe);
        self
    }

    /// Create state backed by the inference service from environment.
    pub fn from_env(config: ApiConfig) -> MlResult<Self> {
        let ml = Arc::new(MlClient::from_env()?);
        let analyzer = build_analyzer(ml.clone(), AnalysisConfig::from_env());

        Ok(Self::new(config, analyzer)
            .with_probe(ml)
            .with_probe(Arc::new(FfmpegProbe)))
    }
}
