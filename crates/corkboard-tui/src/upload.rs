use std::path::Path;

use corkboard_core::storage::upload_blob;
use tokio::sync::mpsc::Sender;

use crate::ui::App;

/// Result of a background blob upload.
pub(crate) enum UploadResult {
    Success(String),
    Error(String),
}

/// Treat pasted text that names a local image file as an attachment:
/// upload it in the background and let the event loop insert the URL.
/// Returns false when the paste is not an image path, so the caller
/// inserts it as plain text instead.
pub(crate) fn handle_image_file_paste(
    app: &mut App,
    text: &str,
    upload_tx: Sender<UploadResult>,
) -> bool {
    let candidate = text.trim();
    let Some(mime_type) = image_mime(candidate) else {
        return false;
    };
    let Ok(data) = std::fs::read(candidate) else {
        return false;
    };

    app.set_status("uploading image…");
    let server = app.blob_server.clone();
    tokio::spawn(async move {
        let result = match upload_blob(&server, &data, mime_type).await {
            Ok(url) => UploadResult::Success(url),
            Err(err) => UploadResult::Error(format!("upload failed: {err}")),
        };
        let _ = upload_tx.send(result).await;
    });
    true
}

/// Mime type for paths that look like image files.
pub(crate) fn image_mime(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
