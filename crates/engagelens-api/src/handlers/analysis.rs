//! Engagement analysis upload handler.

use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use engagelens_media::VIDEO_EXTENSIONS;
use engagelens_models::EngagementReport;
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the recording.
pub const VIDEO_FIELD: &str = "video";

/// Lower-cased extension of `filename` if it is an accepted video type.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    VIDEO_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn invalid_type_message() -> String {
    format!(
        "Invalid file type. Allowed types: {}",
        VIDEO_EXTENSIONS.join(", ")
    )
}

/// A stored upload. The directory is removed on drop.
struct Upload {
    workdir: TempDir,
    path: PathBuf,
    filename: String,
}

/// Analyse an uploaded recording.
///
/// The upload is stored in a fresh directory under the configured upload
/// directory, which is removed when the request finishes, whatever the
/// outcome.
pub async fn analyze_engagement(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<EngagementReport>> {
    let start = Instant::now();

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        upload = Some(receive_upload(field, &state.config.upload_dir).await?);
        break;
    }
    let Upload {
        workdir,
        path,
        filename,
    } = upload.ok_or_else(|| {
        ApiError::Validation(format!("Missing multipart field '{}'", VIDEO_FIELD))
    })?;

    let result = state.analyzer.analyze(&path).await;

    if let Err(e) = workdir.close() {
        warn!(error = %e, "Failed to remove upload directory");
    }

    match result {
        Ok(report) => {
            metrics::record_upload("analyzed");
            metrics::record_upload_duration(start.elapsed().as_secs_f64());
            Ok(Json(report))
        }
        Err(e) => {
            metrics::record_upload("failed");
            warn!(filename = %filename, error = %e, "Engagement analysis failed");
            Err(e.into())
        }
    }
}

/// Validate the video field and stream it into a per-request directory.
async fn receive_upload(field: Field<'_>, upload_dir: &Path) -> ApiResult<Upload> {
    let filename = field.file_name().unwrap_or_default().to_string();
    if filename.is_empty() {
        metrics::record_upload("rejected");
        return Err(ApiError::bad_request("No selected file"));
    }
    let Some(ext) = allowed_extension(&filename) else {
        metrics::record_upload("rejected");
        return Err(ApiError::bad_request(invalid_type_message()));
    };

    tokio::fs::create_dir_all(upload_dir).await?;
    let workdir = tempfile::Builder::new()
        .prefix("upload-")
        .tempdir_in(upload_dir)?;
    let path = workdir.path().join(format!("upload.{}", ext));

    let bytes = save_field(field, &path).await?;
    info!(
        filename = %filename,
        bytes,
        path = %path.display(),
        "Received video upload"
    );

    Ok(Upload {
        workdir,
        path,
        filename,
    })
}

/// Stream a multipart field to `path`, returning the byte count.
async fn save_field(mut field: Field<'_>, path: &Path) -> ApiResult<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;

    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extension() {
        assert_eq!(allowed_extension("talk.mp4"), Some("mp4".to_string()));
        assert_eq!(allowed_extension("IMG_6908.MOV"), Some("mov".to_string()));
        assert_eq!(allowed_extension("clip.final.webm"), Some("webm".to_string()));
        assert_eq!(allowed_extension("notes.txt"), None);
        assert_eq!(allowed_extension("mp4"), None);
    }

    #[test]
    fn test_invalid_type_message() {
        assert_eq!(
            invalid_type_message(),
            "Invalid file type. Allowed types: mp4, mov, webm"
        );
    }
}
