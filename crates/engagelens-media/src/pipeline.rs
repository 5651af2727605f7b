//! End-to-end engagement analysis of one recording.
//!
//! The recording is decoded once. For each sampled frame the emotion and
//! landmark models run concurrently, but their results are folded into the
//! [`EmotionScorer`] and [`NodDetector`] strictly in sampled-frame order: the
//! nod detector compares each position with the previous one, so a backend
//! that analyses frames in parallel must re-serialise results by frame index
//! before they reach it.
//!
//! Transcription runs alongside the frame analysis and never fails the run.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use engagelens_models::{
    CombinedEngagement, EmotionSummary, EngagementReport, NodSummary, Transcription,
};
use tracing::{debug, info, warn};

use crate::audio::prepare_audio;
use crate::collaborators::{
    Detection, EmotionModel, LandmarkModel, TranscriptOutcome, Transcriber,
};
use crate::config::AnalysisConfig;
use crate::engagement::{EmotionScorer, EngagementCombiner, NodDetector, SegmentCorrelator};
use crate::error::{MediaError, MediaResult};
use crate::frames::{FrameSource, SampledVideo};
use crate::metrics;

/// Emotion, nod and fused results for one recording.
#[derive(Debug, Clone, Default)]
pub struct SignalAnalysis {
    pub engagement: CombinedEngagement,
    pub emotion: EmotionSummary,
    pub nods: NodSummary,
}

/// Runs the full analysis with caller-provided models.
///
/// Each call to [`analyze`](Self::analyze) builds fresh scorer and detector
/// state, so one analyzer can serve concurrent requests.
#[derive(Clone)]
pub struct EngagementAnalyzer {
    frames: Arc<dyn FrameSource>,
    emotions: Arc<dyn EmotionModel>,
    landmarks: Arc<dyn LandmarkModel>,
    transcriber: Option<Arc<dyn Transcriber>>,
    config: AnalysisConfig,
}

impl EngagementAnalyzer {
    pub fn new(
        frames: Arc<dyn FrameSource>,
        emotions: Arc<dyn EmotionModel>,
        landmarks: Arc<dyn LandmarkModel>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            frames,
            emotions,
            landmarks,
            transcriber: None,
            config,
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse a recording and correlate it with its transcript.
    ///
    /// Fails only if the recording cannot be opened or decoded.
    pub async fn analyze(&self, path: &Path) -> MediaResult<EngagementReport> {
        let start = Instant::now();

        // An unreadable recording fails the run at once and drops the
        // in-flight transcription.
        let (signals, transcription) = tokio::try_join!(self.analyze_signals(path), async {
            Ok::<_, MediaError>(self.transcribe(path).await)
        })?;

        let correlator = SegmentCorrelator::new(self.config.engagement_threshold);
        let low_engagement_segments = transcription
            .as_ref()
            .map(|t| {
                correlator.low_engagement_segments(&signals.engagement.combined_history, &t.segments)
            })
            .unwrap_or_default();
        metrics::record_low_engagement_segments(low_engagement_segments.len());

        let elapsed = start.elapsed().as_secs_f64();
        metrics::record_analysis_duration(elapsed);

        info!(
            path = %path.display(),
            entries = signals.engagement.combined_history.len(),
            nods = signals.nods.nod_count,
            average_score = signals.engagement.summary.average_score,
            low_segments = low_engagement_segments.len(),
            transcribed = transcription.is_some(),
            elapsed_secs = elapsed,
            "Engagement analysis complete"
        );

        Ok(EngagementReport {
            engagement: signals.engagement,
            emotion: signals.emotion,
            nods: signals.nods,
            transcription,
            low_engagement_segments,
        })
    }

    /// Emotion scoring, nod detection and their fusion, without transcript.
    pub async fn analyze_signals(&self, path: &Path) -> MediaResult<SignalAnalysis> {
        let video = self.frames.sample(path, self.config.frame_stride).await?;
        Ok(self.score_video(&video).await)
    }

    async fn score_video(&self, video: &SampledVideo) -> SignalAnalysis {
        let mut scorer = EmotionScorer::new();
        let mut detector = NodDetector::new(self.config.nod_threshold);

        metrics::record_frames_sampled(video.frames.len());

        for frame in &video.frames {
            let (emotions, nose) = tokio::join!(
                self.emotions.detect_emotions(frame),
                self.landmarks.locate_nose(frame)
            );

            let emotions = match Detection::from(emotions) {
                Detection::Found(faces) if faces.is_empty() => Detection::NoFace,
                other => other,
            };
            if let Detection::Failed(reason) = &emotions {
                debug!(frame = frame.index, %reason, "Emotion detection failed");
            }
            match emotions {
                Detection::Found(faces) => {
                    scorer.record(frame.timestamp, &faces);
                }
                miss => metrics::record_detection_miss("emotion", miss.kind()),
            }

            let nose = match Detection::from(nose) {
                Detection::Found(point) => match point.normalized_y() {
                    Some(y) => Detection::Found(y),
                    None => Detection::Failed("landmark in zero-height image".to_string()),
                },
                Detection::NoFace => Detection::NoFace,
                Detection::Failed(reason) => Detection::Failed(reason),
            };
            if let Detection::Failed(reason) = &nose {
                debug!(frame = frame.index, %reason, "Landmark detection failed");
            }
            match nose {
                Detection::Found(y) => {
                    if let Some(nod) = detector.observe(frame.timestamp, y) {
                        debug!(frame = frame.index, timestamp = nod.timestamp, "Nod detected");
                    }
                }
                miss => metrics::record_detection_miss("landmark", miss.kind()),
            }
        }

        metrics::record_nods_detected(detector.nod_count());

        let duration = video.duration();
        let emotion = scorer.summary(duration, video.fps);
        let nods = detector.summary(duration, video.fps);
        let engagement =
            EngagementCombiner::from_config(&self.config).combine(scorer.history(), detector.history());

        SignalAnalysis {
            engagement,
            emotion,
            nods,
        }
    }

    /// Transcribe the recording's speech, or `None` if that is not possible.
    pub async fn transcribe(&self, path: &Path) -> Option<Transcription> {
        let Some(transcriber) = self.transcriber.as_ref() else {
            debug!("No transcriber configured, skipping transcription");
            return None;
        };

        let audio = match prepare_audio(path).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Transcription unavailable: no audio");
                metrics::record_transcription_unavailable();
                return None;
            }
        };

        match transcriber.transcribe(audio.path()).await {
            TranscriptOutcome::Transcribed(transcription) => {
                debug!(segments = transcription.segments.len(), "Transcription complete");
                Some(transcription)
            }
            TranscriptOutcome::Unavailable(reason) => {
                warn!(path = %path.display(), %reason, "Transcription unavailable");
                metrics::record_transcription_unavailable();
                None
            }
        }
    }
}
