//! Image intake
//!
//! Validates a candidate retina image and stages it in the session. Drag and
//! drop and the file browser are separate entry points that both end in
//! [`ImageIntake::select_file`], so neither can skip validation.

mod preview;

pub use preview::PreviewHandle;

use crate::error::{Result, ScreeningError};
use crate::notify::Notice;
use crate::session::{ImageMime, SessionStore, StagedImage};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

/// Largest accepted upload: 10 MiB
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// A file offered by the shell, before validation
#[derive(Clone)]
pub struct CandidateFile {
    pub name: String,
    /// MIME type as declared by the browser/OS
    pub declared_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for CandidateFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateFile")
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl CandidateFile {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, declaring its type from the extension
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let declared_type = mime_guess::from_path(path)
            .first()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        Ok(Self {
            name,
            declared_type,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Staged {
    pub preview: PreviewHandle,
    pub notice: Notice,
}

/// Holds the preview for whatever image the session has staged
#[derive(Debug, Default)]
pub struct ImageIntake {
    preview: Option<PreviewHandle>,
}

impl ImageIntake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    /// Validate and stage `file`, replacing any previous image
    ///
    /// On error nothing changes: a previously staged image stays staged.
    pub fn select_file(&mut self, store: &mut SessionStore, file: CandidateFile) -> Result<Staged> {
        let mime = check_type(&file.declared_type)?;

        let size = file.size();
        if size > MAX_IMAGE_BYTES {
            tracing::warn!("[Intake] Rejected {} ({} bytes): too large", file.name, size);
            return Err(ScreeningError::FileTooLarge { size_bytes: size });
        }

        let fingerprint = hex::encode(Sha256::digest(&file.bytes));
        let preview = PreviewHandle::build(&file.bytes, mime);
        let short_print = &fingerprint[..12];

        tracing::info!(
            file = %file.name,
            mime = %mime,
            size,
            fingerprint = %short_print,
            "[Intake] Staged image"
        );

        store.set_image(Some(StagedImage {
            file_name: file.name,
            mime_type: mime,
            bytes: Arc::from(file.bytes),
            fingerprint,
        }));
        self.preview = Some(preview.clone());

        Ok(Staged {
            preview,
            notice: Notice::success("Image uploaded successfully!"),
        })
    }

    /// Drag-and-drop entry point; only the first dropped file is considered
    pub fn drop_files(
        &mut self,
        store: &mut SessionStore,
        files: Vec<CandidateFile>,
    ) -> Result<Option<Staged>> {
        match files.into_iter().next() {
            Some(file) => self.select_file(store, file).map(Some),
            None => Ok(None),
        }
    }

    /// File-browser entry point
    pub fn browse(&mut self, store: &mut SessionStore, file: CandidateFile) -> Result<Staged> {
        self.select_file(store, file)
    }

    /// Read `path` from disk, then stage it through [`Self::select_file`]
    ///
    /// Callers sharing the store behind a lock should read with
    /// [`CandidateFile::from_path`] first and lock only for `select_file`.
    pub async fn select_path(&mut self, store: &mut SessionStore, path: &Path) -> Result<Staged> {
        let file = CandidateFile::from_path(path).await?;
        self.select_file(store, file)
    }

    /// Remove the staged image and its preview; other session fields are kept
    pub fn clear(&mut self, store: &mut SessionStore) {
        store.set_image(None);
        self.preview = None;
        tracing::debug!("[Intake] Cleared staged image");
    }
}

fn check_type(declared: &str) -> Result<ImageMime> {
    let invalid = || ScreeningError::InvalidFileType {
        declared: declared.to_string(),
    };

    if !declared.trim().to_ascii_lowercase().starts_with("image/") {
        tracing::warn!("[Intake] Rejected non-image type '{}'", declared);
        return Err(invalid());
    }

    // The inference service only takes PNG and JPEG
    ImageMime::from_declared(declared).ok_or_else(|| {
        tracing::warn!("[Intake] Rejected unsupported image type '{}'", declared);
        invalid()
    })
}
