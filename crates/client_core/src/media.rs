use std::path::Path;

use shared::{domain::VideoFile, error::ReelsApiError};

const FALLBACK_FILE_NAME: &str = "reel.mp4";

/// Reads a picked video from disk, guessing its MIME type from the extension.
pub async fn load_video_file(path: &Path) -> Result<VideoFile, ReelsApiError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ReelsApiError::File {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string());
    let mime_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());

    Ok(VideoFile::new(file_name, mime_type, bytes))
}
