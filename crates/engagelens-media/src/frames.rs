//! Frame sampling.
//!
//! A [`FrameSource`] turns a recording into the ordered list of frames the
//! analysis looks at: every `stride`-th frame, each tagged with its frame
//! index and timestamp (`index / fps`). The FFmpeg implementation decodes the
//! video exactly once and reads the frame count from container metadata.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tempfile::TempDir;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::AnalysisConfig;
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// Frame rate assumed when the container reports none.
pub const DEFAULT_FALLBACK_FPS: f64 = 30.0;

/// Image payload of a sampled frame.
#[derive(Debug, Clone)]
pub enum FrameImage {
    /// JPEG on disk, owned by the [`SampledVideo`] work directory.
    File(PathBuf),
    /// Encoded image bytes held in memory.
    Encoded(Vec<u8>),
}

/// One sampled frame.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// 1-based ordinal of the frame in the decoded stream
    pub index: u64,
    /// Seconds from the start of the recording
    pub timestamp: f64,
    pub image: FrameImage,
    /// Base64 of the image, filled on first use and shared by every model
    /// that looks at this frame.
    base64: OnceCell<String>,
}

impl SampledFrame {
    pub fn new(index: u64, timestamp: f64, image: FrameImage) -> Self {
        Self {
            index,
            timestamp,
            image,
            base64: OnceCell::new(),
        }
    }

    /// Base64-encoded image. The image is read and encoded at most once.
    pub async fn base64_image(&self) -> MediaResult<&str> {
        let encoded = self
            .base64
            .get_or_try_init(move || async move {
                let image = self.read_image().await?;
                Ok::<_, MediaError>(BASE64.encode(image))
            })
            .await?;
        Ok(encoded.as_str())
    }

    /// Encoded image bytes.
    pub async fn read_image(&self) -> MediaResult<Vec<u8>> {
        match &self.image {
            FrameImage::File(path) => Ok(tokio::fs::read(path).await?),
            FrameImage::Encoded(bytes) => Ok(bytes.clone()),
        }
    }
}

/// The sampled frames of one recording.
#[derive(Debug)]
pub struct SampledVideo {
    /// Frame rate used for timestamps (never 0)
    pub fps: f64,
    /// Total frames in the recording
    pub total_frames: u64,
    pub stride: u32,
    /// Sampled frames in stream order
    pub frames: Vec<SampledFrame>,
    /// Keeps extracted JPEGs alive as long as the frames reference them.
    _workdir: Option<TempDir>,
}

impl SampledVideo {
    pub fn new(fps: f64, total_frames: u64, stride: u32, frames: Vec<SampledFrame>) -> Self {
        Self {
            fps,
            total_frames,
            stride,
            frames,
            _workdir: None,
        }
    }

    /// Attach the directory holding the frame files.
    pub fn with_workdir(mut self, workdir: TempDir) -> Self {
        self._workdir = Some(workdir);
        self
    }

    /// Recording length in seconds derived from the frame count.
    pub fn duration(&self) -> f64 {
        if self.fps > 0.0 {
            self.total_frames as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Timestamp in seconds of frame `index` at `fps`.
pub fn frame_timestamp(index: u64, fps: f64) -> f64 {
    if fps > 0.0 {
        index as f64 / fps
    } else {
        0.0
    }
}

/// Source of sampled frames.
///
/// An error from `sample` means the recording could not be opened or decoded
/// and aborts the analysis.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn sample(&self, path: &Path, stride: u32) -> MediaResult<SampledVideo>;
}

/// FFmpeg-backed frame source.
#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    fallback_fps: f64,
    timeout_secs: Option<u64>,
}

impl Default for FfmpegFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegFrameSource {
    pub fn new() -> Self {
        Self {
            fallback_fps: DEFAULT_FALLBACK_FPS,
            timeout_secs: None,
        }
    }

    pub fn with_fallback_fps(mut self, fps: f64) -> Self {
        self.fallback_fps = fps;
        self
    }

    /// Kill the decode if it runs longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Frame source using the fallback rate and decode timeout of `config`.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let source = Self::new().with_fallback_fps(config.fallback_fps);
        match config.decode_timeout_secs {
            Some(secs) => source.with_timeout(secs),
            None => source,
        }
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn sample(&self, path: &Path, stride: u32) -> MediaResult<SampledVideo> {
        let stride = stride.max(1);
        let info = probe_video(path).await?;
        let fps = info.effective_fps(self.fallback_fps);

        let workdir = tempfile::Builder::new().prefix("engagelens-frames-").tempdir()?;
        let pattern = workdir.path().join("frame_%08d.jpg");

        let cmd = FfmpegCommand::new(path, &pattern)
            .sample_every(stride)
            .output_args(["-q:v", "2"]);

        let mut runner = FfmpegRunner::new();
        if let Some(secs) = self.timeout_secs {
            runner = runner.with_timeout(secs);
        }
        runner.run(&cmd).await?;

        let files = list_frame_files(workdir.path()).await?;
        if files.is_empty() && info.frame_count > 0 {
            debug!(
                path = %path.display(),
                frame_count = info.frame_count,
                stride,
                "Recording shorter than one stride, no frames sampled"
            );
        }

        let frames = index_frames(files, stride, fps);
        let sampled_span = frames.last().map(|f| f.index).unwrap_or(0);
        let total_frames = info.frame_count.max(sampled_span);

        info!(
            path = %path.display(),
            fps,
            total_frames,
            sampled = frames.len(),
            stride,
            "Sampled video frames"
        );

        Ok(SampledVideo::new(fps, total_frames, stride, frames).with_workdir(workdir))
    }
}

/// Extracted JPEGs in stream order.
async fn list_frame_files(dir: &Path) -> MediaResult<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "jpg") {
            files.push(path);
        }
    }

    // Zero-padded names sort in decode order
    files.sort();
    Ok(files)
}

/// Tag the `j`-th extracted file (1-based) with frame index `j * stride`.
fn index_frames(files: Vec<PathBuf>, stride: u32, fps: f64) -> Vec<SampledFrame> {
    files
        .into_iter()
        .enumerate()
        .map(|(i, path)| {
            let index = (i as u64 + 1) * stride as u64;
            SampledFrame::new(index, frame_timestamp(index, fps), FrameImage::File(path))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_takes_timeout_from_config() {
        let config = AnalysisConfig::default()
            .with_fallback_fps(25.0)
            .with_decode_timeout(90);
        let source = FfmpegFrameSource::from_config(&config);
        assert_eq!(source.timeout_secs, Some(90));
        assert_eq!(source.fallback_fps, 25.0);

        let unbounded = FfmpegFrameSource::from_config(&config.with_decode_timeout(0));
        assert_eq!(unbounded.timeout_secs, None);
    }

    #[test]
    fn test_index_frames_uses_stride_multiples() {
        let files = vec![
            PathBuf::from("frame_00000001.jpg"),
            PathBuf::from("frame_00000002.jpg"),
            PathBuf::from("frame_00000003.jpg"),
        ];

        let frames = index_frames(files, 30, 30.0);
        let indices: Vec<u64> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![30, 60, 90]);
        assert_eq!(frames[0].timestamp, 1.0);
        assert_eq!(frames[2].timestamp, 3.0);
    }

    #[test]
    fn test_frame_timestamp() {
        assert_eq!(frame_timestamp(45, 30.0), 1.5);
        assert_eq!(frame_timestamp(45, 0.0), 0.0);
    }

    #[test]
    fn test_sampled_video_duration() {
        let video = SampledVideo::new(25.0, 250, 25, Vec::new());
        assert_eq!(video.duration(), 10.0);
    }

    #[tokio::test]
    async fn test_read_encoded_image() {
        let frame = SampledFrame::new(30, 1.0, FrameImage::Encoded(vec![0xFF, 0xD8]));
        assert_eq!(frame.read_image().await.unwrap(), vec![0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_base64_image_reads_the_file_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_00000001.jpg");
        tokio::fs::write(&path, b"jpeg").await.unwrap();
        let frame = SampledFrame::new(30, 1.0, FrameImage::File(path.clone()));

        assert_eq!(frame.base64_image().await.unwrap(), "anBlZw==");

        tokio::fs::remove_file(&path).await.unwrap();
        assert_eq!(frame.base64_image().await.unwrap(), "anBlZw==");
        assert!(frame.read_image().await.is_err());
    }

    #[tokio::test]
    async fn test_list_frame_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["frame_00000002.jpg", "frame_00000001.jpg", "notes.txt"] {
            tokio::fs::write(dir.path().join(name), b"x").await.unwrap();
        }

        let files = list_frame_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["frame_00000001.jpg", "frame_00000002.jpg"]);
    }
}
