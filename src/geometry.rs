//! High-density surface geometry.
//!
//! The backing store of the drawing surface and its layout size are
//! independent: pixels are rendered at `nominal × density` while the page
//! keeps its CSS-pixel footprint.

use crate::pdf::Viewport;

/// Affine matrix `[a, b, c, d, e, f]` applied before the library's own
/// viewport transform.
pub type PaintTransform = [f32; 6];

/// Resolved geometry for one render.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderGeometry {
    /// Backing store width in device pixels
    pub backing_width: u32,
    /// Backing store height in device pixels
    pub backing_height: u32,
    /// Layout width in CSS pixels
    pub display_width: u32,
    /// Layout height in CSS pixels
    pub display_height: u32,
    /// `None` means identity
    pub transform: Option<PaintTransform>,
}

impl RenderGeometry {
    /// Compute geometry for a viewport at the given pixel density.
    pub fn compute(viewport: Viewport, pixel_density: f32) -> Self {
        let density = normalize_density(Some(pixel_density));
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        let scale = f64::from(density);

        Self {
            backing_width: floor_px(width * scale),
            backing_height: floor_px(height * scale),
            display_width: floor_px(width),
            display_height: floor_px(height),
            transform: density_transform(density),
        }
    }
}

/// Scaling matrix for a density, or `None` at exactly 1x.
pub fn density_transform(density: f32) -> Option<PaintTransform> {
    if density == 1.0 {
        None
    } else {
        Some([density, 0.0, 0.0, density, 0.0, 0.0])
    }
}

/// Fall back to 1x when the density is unavailable or nonsensical.
pub fn normalize_density(density: Option<f32>) -> f32 {
    match density {
        Some(d) if d.is_finite() && d > 0.0 => d,
        _ => 1.0,
    }
}

fn floor_px(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
