//! Raster image decoding for backgrounds.

use std::sync::Arc;

use canvas::background::ImageDecoder;
use canvas::camera::Size;
use tracing::debug;

/// A decoded background in straight RGBA8, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Arc<[u8]>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba", &format_args!("{} bytes", self.rgba.len()))
            .finish()
    }
}

/// Decodes PNG, JPEG and GIF (first frame) with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    type Image = Arc<DecodedImage>;

    fn decode(&self, bytes: &[u8]) -> Option<Self::Image> {
        match image::load_from_memory(bytes) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (width, height) = rgba.dimensions();
                Some(Arc::new(DecodedImage { width, height, rgba: rgba.into_raw().into() }))
            }
            Err(e) => {
                debug!(error = %e, len = bytes.len(), "background decode failed");
                None
            }
        }
    }

    fn natural_size(&self, image: &Self::Image) -> Size {
        Size::new(f64::from(image.width), f64::from(image.height))
    }
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod tests;
