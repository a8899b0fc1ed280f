//! Storage for uploaded files under the configured media root.

use std::path::Path;

use anyhow::Context;
use axum::body::Bytes;
use shelf_kernel::settings::MediaSettings;
use uuid::Uuid;

const THUMBNAIL_DIR: &str = "thumbnails";

/// A file received in a multipart submission.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Upload {
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.starts_with("image/"))
    }

    /// Short lowercase extension from the client file name, falling back
    /// to the image subtype.
    fn extension(&self) -> String {
        let from_name = self
            .file_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str());
        let from_type = self
            .content_type
            .as_deref()
            .and_then(|content_type| content_type.strip_prefix("image/"));

        from_name
            .into_iter()
            .chain(from_type)
            .map(str::to_ascii_lowercase)
            .find(|ext| {
                !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// Write a thumbnail under a fresh name and return its path relative to
/// the media root.
pub async fn store_thumbnail(media: &MediaSettings, upload: &Upload) -> anyhow::Result<String> {
    let dir = media.root.join(THUMBNAIL_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;

    let file_name = format!("{}.{}", Uuid::new_v4().simple(), upload.extension());
    let path = dir.join(&file_name);
    tokio::fs::write(&path, &upload.bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::debug!(path = %path.display(), size = upload.bytes.len(), "thumbnail stored");
    Ok(format!("{}/{}", THUMBNAIL_DIR, file_name))
}

/// Remove a stored file once nothing refers to it. Failures are logged,
/// never returned: the record change that orphaned the file already happened.
pub async fn discard(media: &MediaSettings, relative: &str) {
    if relative.split('/').any(|part| part.is_empty() || part == "..") {
        tracing::warn!(relative, "refusing to remove media path");
        return;
    }

    let path = media.root.join(relative);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "media file removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove media file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: Option<&str>, content_type: Option<&str>) -> Upload {
        Upload {
            file_name: file_name.map(str::to_string),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::from_static(b"\x89PNG"),
        }
    }

    #[test]
    fn extension_prefers_file_name() {
        assert_eq!(upload(Some("Cover.PNG"), Some("image/jpeg")).extension(), "png");
        assert_eq!(upload(Some("cover"), Some("image/jpeg")).extension(), "jpeg");
        assert_eq!(upload(Some("x.tar/../etc"), None).extension(), "bin");
    }

    #[test]
    fn only_images_qualify() {
        assert!(upload(None, Some("image/png")).is_image());
        assert!(!upload(None, Some("text/plain")).is_image());
        assert!(!upload(None, None).is_image());
    }

    #[tokio::test]
    async fn thumbnails_land_under_media_root() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaSettings {
            root: dir.path().to_path_buf(),
            url_prefix: "/media".to_string(),
        };

        let relative = store_thumbnail(&media, &upload(Some("a.png"), Some("image/png")))
            .await
            .unwrap();

        assert!(relative.starts_with("thumbnails/"));
        assert!(relative.ends_with(".png"));
        let written = std::fs::read(dir.path().join(&relative)).unwrap();
        assert_eq!(written, b"\x89PNG");
    }

    #[tokio::test]
    async fn discard_removes_stored_file_only() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaSettings {
            root: dir.path().to_path_buf(),
            url_prefix: "/media".to_string(),
        };
        let relative = store_thumbnail(&media, &upload(Some("a.png"), Some("image/png")))
            .await
            .unwrap();
        let outside = dir.path().join("keep.txt");
        std::fs::write(&outside, b"keep").unwrap();

        discard(&media, &relative).await;
        assert!(!dir.path().join(&relative).exists());

        // Already gone, and paths escaping the root, are both ignored
        discard(&media, &relative).await;
        discard(&media, "thumbnails/../keep.txt").await;
        assert!(outside.exists());
    }
}
