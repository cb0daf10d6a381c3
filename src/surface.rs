//! The drawing surface: one RGBA backing store plus a layout size.

use crate::geometry::RenderGeometry;
use crate::pdf::PdfError;
use image::{Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

/// Pixel target for page renders.
///
/// Resizing discards previous content, the same way resizing a canvas
/// clears it.
#[derive(Debug, Clone)]
pub struct Surface {
    pixels: RgbaImage,
    display_width: u32,
    display_height: u32,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface {
    pub fn new() -> Self {
        Self {
            pixels: RgbaImage::new(0, 0),
            display_width: 0,
            display_height: 0,
        }
    }

    /// Apply the backing and layout sizes of a render.
    pub fn resize(&mut self, geometry: &RenderGeometry) {
        self.pixels = RgbaImage::from_pixel(
            geometry.backing_width,
            geometry.backing_height,
            Rgba([0, 0, 0, 0]),
        );
        self.display_width = geometry.display_width;
        self.display_height = geometry.display_height;
    }

    /// Backing store size in device pixels.
    pub fn backing_size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Layout size in CSS pixels.
    pub fn display_size(&self) -> (u32, u32) {
        (self.display_width, self.display_height)
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Copy a rendered bitmap onto the backing store at the origin,
    /// clipped to the store's bounds.
    pub fn blit(&mut self, image: &RgbaImage) {
        image::imageops::replace(&mut self.pixels, image, 0, 0);
    }

    /// Encode the backing store as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, PdfError> {
        let mut png_bytes = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut png_bytes), image::ImageFormat::Png)
            .map_err(|e| PdfError::ImageError(e.to_string()))?;
        Ok(png_bytes)
    }

    /// Write the backing store to a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<(), PdfError> {
        let bytes = self.encode_png()?;
        std::fs::write(path, bytes).map_err(|e| PdfError::ImageError(e.to_string()))
    }
}
