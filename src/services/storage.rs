//! Local asset storage.
//!
//! Uploads arrive as base64 data-URIs, are decoded and written under the
//! configured upload directory, and are addressed by a stable `/uploads/...`
//! URL afterwards. Cover art is additionally checked to be exactly
//! 3000x3000 before anything touches disk; client-side dimension checks are
//! not a trust boundary.

use std::path::PathBuf;

use base64::Engine;
use tokio::fs;
use uuid::Uuid;

use crate::error::{AppError, Result};

pub const COVER_SIZE_PX: usize = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Cover,
    Audio,
    Avatar,
    NewsImage,
    FinanceDoc,
    Attachment,
}

impl AssetKind {
    fn dir(&self) -> &'static str {
        match self {
            Self::Cover => "covers",
            Self::Audio => "audio",
            Self::Avatar => "avatars",
            Self::NewsImage => "news",
            Self::FinanceDoc => "finance",
            Self::Attachment => "attachments",
        }
    }

    fn expected_media_type(&self) -> &'static str {
        match self {
            Self::Cover | Self::Avatar | Self::NewsImage | Self::Attachment => "image",
            Self::Audio => "audio",
            Self::FinanceDoc => "application",
        }
    }
}

#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: &str) -> Self {
        Self { root: PathBuf::from(root) }
    }

    /// Decode a data-URI and persist it, returning the public URL.
    pub async fn store_data_uri(&self, kind: AssetKind, data_uri: &str) -> Result<String> {
        let (bytes, extension) = decode_data_uri(data_uri, kind.expected_media_type())?;
        self.write(kind, &bytes, &extension).await
    }

    /// Like [`store_data_uri`](Self::store_data_uri) for cover art, with the
    /// exact-dimension check applied before the write.
    pub async fn store_cover(&self, data_uri: &str) -> Result<String> {
        let (bytes, extension) = decode_data_uri(data_uri, "image")?;

        let size = imagesize::blob_size(&bytes).map_err(|e| {
            AppError::validation("cover", &format!("unreadable image data: {}", e))
        })?;
        if size.width != COVER_SIZE_PX || size.height != COVER_SIZE_PX {
            return Err(AppError::validation(
                "cover",
                &format!(
                    "cover must be exactly {}x{} px, got {}x{}",
                    COVER_SIZE_PX, COVER_SIZE_PX, size.width, size.height
                ),
            ));
        }

        self.write(AssetKind::Cover, &bytes, &extension).await
    }

    async fn write(&self, kind: AssetKind, bytes: &[u8], extension: &str) -> Result<String> {
        let dir = self.root.join(kind.dir());
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Storage(format!("create {}: {}", dir.display(), e)))?;

        let file_name = format!("{}.{}", Uuid::new_v4(), extension);
        let path = dir.join(&file_name);
        fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("write {}: {}", path.display(), e)))?;

        Ok(format!("/uploads/{}/{}", kind.dir(), file_name))
    }
}

/// Split `data:<media>/<subtype>;base64,<payload>` into raw bytes and a file
/// extension. Rejects URIs whose media type does not match the asset kind.
fn decode_data_uri(data_uri: &str, expected_media_type: &str) -> Result<(Vec<u8>, String)> {
    let rest = data_uri
        .strip_prefix("data:")
        .ok_or_else(|| AppError::validation("file", "expected a data URI"))?;
    let (mime, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| AppError::validation("file", "expected base64 data URI"))?;

    let (media_type, subtype) = mime
        .split_once('/')
        .ok_or_else(|| AppError::validation("file", "malformed media type"))?;
    if media_type != expected_media_type {
        return Err(AppError::validation(
            "file",
            &format!("expected {} data, got {}", expected_media_type, media_type),
        ));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AppError::validation("file", &format!("invalid base64 payload: {}", e)))?;

    let extension = match subtype {
        "jpeg" => "jpg".to_string(),
        "mpeg" => "mp3".to_string(),
        other => other.to_string(),
    };

    Ok((bytes, extension))
}
