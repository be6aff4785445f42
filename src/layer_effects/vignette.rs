//! Vignette: radial black multiply from the center.
//!
//! The gradient is centered at `(W/2, H/2)` with radius equal to half the
//! diagonal. Alpha stops are 0 at the center, `0.003·v` halfway and
//! `0.01·v` at the rim. Distance is measured from integer pixel
//! coordinates, so on even-sized canvases the pixel at `(W/2, H/2)` is left
//! exactly as it was.

use ndarray::{Array3, ArrayView3};

use crate::filters::core::{composite_fill, interpolate_gradient, BlendMode, Composite, GradientStop};

/// Darken toward the corners.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `amount` - Vignette strength 0-100
pub fn vignette(input: ArrayView3<u8>, amount: f32) -> Array3<u8> {
    let (height, width, _) = input.dim();
    if amount <= 0.0 || width == 0 || height == 0 {
        return input.to_owned();
    }

    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let radius = (cx * cx + cy * cy).sqrt();
    let black = [0.0; 3];
    let stops = [
        GradientStop::new(0.0, black, 0.0),
        GradientStop::new(0.5, black, amount * 0.003),
        GradientStop::new(1.0, black, (amount * 0.01).min(1.0)),
    ];

    composite_fill(input, Composite::SourceOver(BlendMode::Multiply), |x, y| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        let t = if radius > 0.0 { (dx * dx + dy * dy).sqrt() / radius } else { 0.0 };
        interpolate_gradient(&stops, t)
    })
}
