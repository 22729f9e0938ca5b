//! Display-only previews for staged images

use crate::session::ImageMime;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{imageops::FilterType, ImageFormat};
use serde::Serialize;
use std::io::Cursor;
use uuid::Uuid;

/// Longest edge of a generated preview, in pixels
const PREVIEW_SIZE: u32 = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewHandle {
    pub id: Uuid,
    /// `data:` URL the shell can drop straight into an `<img>`
    pub data_url: String,
    /// Pixel size of the source image, when it could be decoded
    pub dimensions: Option<(u32, u32)>,
}

impl PreviewHandle {
    pub fn build(bytes: &[u8], mime: ImageMime) -> Self {
        match thumbnail(bytes) {
            Ok((png, dimensions)) => Self {
                id: Uuid::new_v4(),
                data_url: format!("data:image/png;base64,{}", STANDARD.encode(png)),
                dimensions: Some(dimensions),
            },
            Err(e) => {
                // Undecodable bytes still get a preview; the service decides validity
                tracing::debug!("[Intake] Thumbnail unavailable, using original bytes: {}", e);
                Self {
                    id: Uuid::new_v4(),
                    data_url: format!("data:{};base64,{}", mime, STANDARD.encode(bytes)),
                    dimensions: None,
                }
            }
        }
    }
}

fn thumbnail(bytes: &[u8]) -> Result<(Vec<u8>, (u32, u32)), String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("Failed to load image: {}", e))?;
    let dimensions = (img.width(), img.height());

    let thumb = if img.width() > PREVIEW_SIZE || img.height() > PREVIEW_SIZE {
        img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle)
    } else {
        img
    };

    let mut buffer = Cursor::new(Vec::new());
    thumb
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| format!("Failed to encode preview: {}", e))?;

    Ok((buffer.into_inner(), dimensions))
}
