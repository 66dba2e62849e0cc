use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use image::ImageFormat;

use crate::error::DecodeError;
use crate::files::{RasterEntry, extension_of};

// ---------------------------------------------------------------------------
// Decoded image data (CPU side)
// ---------------------------------------------------------------------------

pub struct RasterImage {
    pub rgba_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format_name: String,
}

impl RasterImage {
    #[cfg(test)]
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            rgba_bytes: vec![0; width as usize * height as usize * 4],
            width,
            height,
            format_name: "TEST".to_string(),
        }
    }
}

impl std::fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RasterImage({}x{} {})", self.width, self.height, self.format_name)
    }
}

// ---------------------------------------------------------------------------
// Decoder capability
// ---------------------------------------------------------------------------

pub trait Decoder {
    fn decode(&self, path: &Path) -> Result<RasterImage, DecodeError>;
}

/// Codec for a file, chosen from its extension alone. No content sniffing.
pub fn format_for(path: &Path) -> Option<ImageFormat> {
    match extension_of(path)? {
        "jpeg" | "jpg" => Some(ImageFormat::Jpeg),
        "tiff" | "tif" => Some(ImageFormat::Tiff),
        "png" => Some(ImageFormat::Png),
        "bmp" => Some(ImageFormat::Bmp),
        "webp" => Some(ImageFormat::WebP),
        _ => None,
    }
}

/// Decoder backed by the `image` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

impl Decoder for ImageDecoder {
    fn decode(&self, path: &Path) -> Result<RasterImage, DecodeError> {
        let format = format_for(path).ok_or_else(|| DecodeError::Unsupported(path.to_path_buf()))?;
        let file = File::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let img = image::load(BufReader::new(file), format).map_err(|source| DecodeError::Image {
            path: path.to_path_buf(),
            source,
        })?;

        let (width, height) = (img.width(), img.height());
        Ok(RasterImage {
            rgba_bytes: img.to_rgba8().into_raw(),
            width,
            height,
            format_name: format!("{format:?}").to_uppercase(),
        })
    }
}

// ---------------------------------------------------------------------------
// Decode-and-cache on a single entry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Loaded {
    /// Handle was already in the entry.
    Cached(Arc<RasterImage>),
    /// Decoded just now and stored in the entry.
    Decoded(Arc<RasterImage>),
}

impl Loaded {
    pub fn image(&self) -> &Arc<RasterImage> {
        match self {
            Loaded::Cached(img) | Loaded::Decoded(img) => img,
        }
    }

    pub fn is_first_load(&self) -> bool {
        matches!(self, Loaded::Decoded(_))
    }
}

impl RasterEntry {
    /// Return the cached handle, or decode and cache it. A failed decode marks
    /// the entry unloadable and leaves it without a handle.
    pub fn load(&mut self, decoder: &dyn Decoder) -> Result<Loaded, DecodeError> {
        if let Some(handle) = &self.handle {
            return Ok(Loaded::Cached(Arc::clone(handle)));
        }
        self.decode_into(decoder).map(Loaded::Decoded)
    }

    /// Drop the cached handle and decode the file again.
    pub fn reload(&mut self, decoder: &dyn Decoder) -> Result<Arc<RasterImage>, DecodeError> {
        self.handle = None;
        if let Ok(modified) = fs::metadata(&self.path).and_then(|m| m.modified()) {
            self.mod_time = modified;
        }
        self.decode_into(decoder)
    }

    fn decode_into(&mut self, decoder: &dyn Decoder) -> Result<Arc<RasterImage>, DecodeError> {
        match decoder.decode(&self.path) {
            Ok(img) => {
                let handle = Arc::new(img);
                self.handle = Some(Arc::clone(&handle));
                self.unloadable = false;
                Ok(handle)
            }
            Err(e) => {
                log::warn!("{e}; skipping this file from now on");
                self.unloadable = true;
                self.handle = None;
                Err(e)
            }
        }
    }
}
