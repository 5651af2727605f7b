//! Audio track extraction for transcription.

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Container extensions treated as video (audio gets extracted first).
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mov", "webm"];

/// Sample rate expected by the speech model.
pub const TRANSCRIPTION_SAMPLE_RATE: u32 = 16_000;

/// Whether `path` names a video container (case-insensitive extension match).
pub fn is_video_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Audio ready for the transcriber.
///
/// Extracted tracks live in a temp file removed on drop. Plain audio inputs
/// are passed through untouched.
#[derive(Debug)]
pub enum AudioInput {
    Extracted(TempPath),
    Original(PathBuf),
}

impl AudioInput {
    pub fn path(&self) -> &Path {
        match self {
            AudioInput::Extracted(temp) => &**temp,
            AudioInput::Original(path) => path.as_path(),
        }
    }
}

/// Prepare `path` for transcription.
///
/// Video containers get their audio extracted to 16 kHz mono WAV; anything
/// else is assumed to already be audio.
pub async fn prepare_audio(path: &Path) -> MediaResult<AudioInput> {
    if is_video_path(path) {
        extract_audio(path).await.map(AudioInput::Extracted)
    } else {
        debug!(path = %path.display(), "Input is not a video container, passing through");
        Ok(AudioInput::Original(path.to_path_buf()))
    }
}

/// Extract the audio track of `video` into a temporary WAV file.
pub async fn extract_audio(video: &Path) -> MediaResult<TempPath> {
    if !video.exists() {
        return Err(MediaError::FileNotFound(video.to_path_buf()));
    }

    let output = tempfile::Builder::new()
        .prefix("engagelens-audio-")
        .suffix(".wav")
        .tempfile()?
        .into_temp_path();

    let cmd = FfmpegCommand::new(video, &output).mono_audio(TRANSCRIPTION_SAMPLE_RATE);

    FfmpegRunner::new().run(&cmd).await.map_err(|e| {
        warn!(path = %video.display(), error = %e, "Audio extraction failed");
        MediaError::AudioExtractionFailed(e.to_string())
    })?;

    debug!(
        input = %video.display(),
        output = %output.display(),
        "Extracted audio track"
    );

    Ok(output)
}
