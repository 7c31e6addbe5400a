//! Image card. Holds a path only; decoding and drawing belong to the host.

use super::{CardBase, CardChange, CardField, CardId, CardKind, CardTrait};
use kurbo::Rect;
use std::path::Path;

/// Supported image formats, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
    Bmp,
}

impl ImageFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Image {
    base: CardBase,
    path: String,
    /// Multiplier on the image's natural size, independent of board scale.
    scale: f64,
}

impl Image {
    pub fn new(id: CardId, rect: Rect) -> Self {
        Self {
            base: CardBase::new(id, rect),
            path: String::new(),
            scale: 1.0,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
        self.base.notify(CardField::Path, CardChange::Path(self.path.clone()));
    }

    /// Format guessed from the path, if recognised.
    pub fn format(&self) -> Option<ImageFormat> {
        Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the image scale. Non-positive or non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if !(scale.is_finite() && scale > 0.0) {
            log::warn!("ignoring image scale {scale} on {}", self.topic());
            return;
        }
        self.scale = scale;
        self.base.notify(CardField::Scale, CardChange::Scale(scale));
    }
}

impl CardTrait for Image {
    fn base(&self) -> &CardBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CardBase {
        &mut self.base
    }

    fn kind(&self) -> CardKind {
        CardKind::Image
    }
}
