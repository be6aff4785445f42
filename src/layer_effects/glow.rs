//! Soft glow.
//!
//! A copy of the canvas is blurred and brightened, screen-blended onto the
//! unblurred copy, and the result is added back onto the canvas with the
//! `lighter` operator at alpha `glow / 100`.

use ndarray::{Array3, ArrayView3};

use crate::filters::color_adjust::{color_filter, ColorFilter};
use crate::filters::core::{composite_layer, gaussian_blur, BlendMode, Composite};

/// Glow settings in slider units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlowOptions {
    /// Strength 0-100.
    pub glow: f32,
    /// Blur radius in pixels; 0 means `glow * 5`.
    pub radius: f32,
    /// Brightness boost in percent; 0 means 50.
    pub intensity: f32,
}

impl GlowOptions {
    pub fn blur_radius(&self) -> f32 {
        if self.radius > 0.0 {
            self.radius
        } else {
            self.glow * 5.0
        }
    }

    /// Brightness multiplier for the blurred copy.
    pub fn brightness(&self) -> f32 {
        let boost = if self.intensity > 0.0 { self.intensity } else { 50.0 };
        (100.0 + boost) / 100.0
    }
}

/// Apply the glow effect.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `options` - Glow settings
///
/// # Returns
/// Brighter image with a soft halo around light areas
pub fn glow(input: ArrayView3<u8>, options: &GlowOptions) -> Array3<u8> {
    if options.glow <= 0.0 {
        return input.to_owned();
    }

    let blurred = gaussian_blur(input, options.blur_radius());
    let brightened = color_filter(
        blurred.view(),
        &ColorFilter { brightness: options.brightness(), ..Default::default() },
    );
    let halo = composite_layer(input, brightened.view(), 1.0, Composite::SourceOver(BlendMode::Screen));

    composite_layer(input, halo.view(), options.glow / 100.0, Composite::Lighter)
}
