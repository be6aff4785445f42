//! Geometric distortions by inverse mapping.
//!
//! For every destination pixel a source coordinate is computed from the
//! selected [`DistortionType`]. The source is clamped to the canvas,
//! floored to a pixel, and all four channels are copied.
//!
//! With `s = amount / 100`, `d` the distance to the center `(W/2, H/2)`,
//! `n = d / (min(W, H) / 2)` and `θ` the angle to the center:
//!
//! | Type | Mapping |
//! |------|---------|
//! | swirl | θ += 2π·s·(1 − n) |
//! | squeeze | radius × (1 + sin(π·n)·s) |
//! | wave | x += 20s·sin(0.1y), y += 20s·sin(0.1x) |
//! | ripple | radius += 20s·sin(0.4π·d) |
//! | vortex | radius × (1 + s·sin 3θ) |
//! | pixelate | snap to a grid of max(1, ⌊20s⌋) |
//! | twist | θ += 4π·s·(1 − n) |
//! | zigzag | offset 20s·sin(d / 50s) along θ |
//! | spiral | radius += 20s·θ |
//! | bulge | radius × (1 − 2s·n) |

use std::f32::consts::PI;

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};

use crate::params::DistortionType;

/// Source coordinate for destination `(x, y)`.
///
/// `center` is the canvas center and `max_distance` half the shorter side.
pub fn source_coordinate(
    kind: DistortionType,
    strength: f32,
    x: f32,
    y: f32,
    center: (f32, f32),
    max_distance: f32,
) -> (f32, f32) {
    let (cx, cy) = center;
    let (dx, dy) = (x - cx, y - cy);
    let distance = (dx * dx + dy * dy).sqrt();
    let normalized = if max_distance > 0.0 { distance / max_distance } else { 0.0 };
    let angle = dy.atan2(dx);

    let polar = |theta: f32, radius: f32| (cx + theta.cos() * radius, cy + theta.sin() * radius);

    match kind {
        DistortionType::Wave => (
            x + (y * 0.1).sin() * 20.0 * strength,
            y + (x * 0.1).sin() * 20.0 * strength,
        ),
        DistortionType::Pixelate => {
            let block = ((20.0 * strength).floor()).max(1.0);
            ((x / block).floor() * block, (y / block).floor() * block)
        }
        // Every remaining mapping is radial; the center maps to itself.
        _ if distance == 0.0 => (x, y),
        DistortionType::Swirl => polar(angle + strength * (1.0 - normalized) * PI * 2.0, distance),
        DistortionType::Twist => polar(angle + strength * (1.0 - normalized) * PI * 4.0, distance),
        DistortionType::Squeeze => {
            let factor = 1.0 + (normalized * PI).sin() * strength;
            (cx + dx * factor, cy + dy * factor)
        }
        DistortionType::Bulge => {
            let factor = 1.0 - normalized * 2.0 * strength;
            (cx + dx * factor, cy + dy * factor)
        }
        DistortionType::Ripple => {
            let offset = (distance * 0.1 * PI * 4.0).sin() * 20.0 * strength;
            let radius = distance + offset;
            (cx + dx / distance * radius, cy + dy / distance * radius)
        }
        DistortionType::Vortex => polar(angle, distance * (1.0 + strength * (angle * 3.0).sin())),
        DistortionType::Zigzag => {
            let frequency = 50.0 * strength;
            if frequency <= 0.0 {
                return (x, y);
            }
            let offset = (distance / frequency).sin() * 20.0 * strength;
            (x + angle.cos() * offset, y + angle.sin() * offset)
        }
        DistortionType::Spiral => polar(angle, distance + angle * strength * 20.0),
    }
}

/// Distort an RGBA image.
///
/// # Arguments
/// * `input` - RGBA image (H, W, 4)
/// * `kind` - Mapping to apply
/// * `amount` - Distortion amount 0-100; 0 returns a copy
///
/// # Returns
/// Remapped image with the input's dimensions
pub fn distort(input: ArrayView3<u8>, kind: DistortionType, amount: f32) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    if amount <= 0.0 || height == 0 || width == 0 {
        return input.to_owned();
    }

    let strength = amount / 100.0;
    let center = (width as f32 / 2.0, height as f32 / 2.0);
    let max_distance = width.min(height) as f32 / 2.0;
    let (max_x, max_y) = ((width - 1) as f32, (height - 1) as f32);

    let mut output = Array3::<u8>::zeros((height, width, channels));
    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let (sx, sy) = source_coordinate(kind, strength, x as f32, y as f32, center, max_distance);
                let sx = if sx.is_nan() { x as f32 } else { sx.clamp(0.0, max_x) };
                let sy = if sy.is_nan() { y as f32 } else { sy.clamp(0.0, max_y) };
                let (sx, sy) = (sx.floor() as usize, sy.floor() as usize);
                for c in 0..channels {
                    row[[x, c]] = input[[sy, sx, c]];
                }
            }
        });

    output
}
