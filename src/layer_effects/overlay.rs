//! Solid fill overlays that reinforce exposure, temperature and tint.
//!
//! These run after the bulk color chain, so the adjustments are applied
//! twice: once as channel gains and once as a composited fill.
//!
//! - **Exposure**: white drawn `source-atop` with alpha `exposure / 100 - 1`.
//!   Values at or below 100 give a non-positive alpha and change nothing.
//! - **Temperature/Tint**: a soft-light fill whose color leans warm or cool
//!   and green or magenta.

use ndarray::{Array3, ArrayView3};

use crate::filters::core::{composite_fill, BlendMode, Composite};
use crate::params::Rgb;

/// Brighten by drawing white on top of existing pixels.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `exposure` - Exposure 0-200, 100 is neutral
pub fn exposure_overlay(input: ArrayView3<u8>, exposure: f32) -> Array3<u8> {
    let alpha = (exposure / 100.0 - 1.0).clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return input.to_owned();
    }
    composite_fill(input, Composite::SourceAtop, |_, _| ([1.0, 1.0, 1.0], alpha))
}

/// Fill color for a temperature/tint pair.
///
/// - red: 255 when warm, else `255 - |2 * temperature|`
/// - green: 255 when tint is positive, else `255 - |2 * tint|`
/// - blue: 255 when cool, else `255 - |2 * temperature|`
pub fn temperature_tint_color(temperature: f32, tint: f32) -> Rgb {
    let channel = |full: bool, amount: f32| -> u8 {
        if full {
            255
        } else {
            (255.0 - (amount * 2.0).abs()).clamp(0.0, 255.0).round() as u8
        }
    };
    Rgb::new(
        channel(temperature > 0.0, temperature),
        channel(tint > 0.0, tint),
        channel(temperature < 0.0, temperature),
    )
}

/// Soft-light an opaque temperature/tint color over the image.
pub fn temperature_tint_overlay(input: ArrayView3<u8>, temperature: f32, tint: f32) -> Array3<u8> {
    if temperature == 0.0 && tint == 0.0 {
        return input.to_owned();
    }
    let color = temperature_tint_color(temperature, tint).to_unit();
    composite_fill(input, Composite::SourceOver(BlendMode::SoftLight), move |_, _| (color, 1.0))
}
