//! Stylize filters: RGB shift and old film.
//!
//! ## Supported Formats
//!
//! Both filters take RGBA (height, width, 4) and preserve alpha.

use std::f32::consts::PI;

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};

use super::core::clamp_round;

// ============================================================================
// RGB Shift
// ============================================================================

/// Radial chromatic split.
///
/// Each of R, G, B is sampled from a point offset along the pixel's angle to
/// the center, rotated by `(c - 1) * 2π/3` per channel. The offset grows
/// linearly with distance from the center, reaching `amount / 100 * 40`
/// pixels at the corners.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `amount` - Shift amount 0-100
pub fn rgb_shift(input: ArrayView3<u8>, amount: f32) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    if amount <= 0.0 || height == 0 || width == 0 {
        return input.to_owned();
    }

    let strength = amount / 100.0 * 40.0;
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let max_distance = ((width * width + height * height) as f32).sqrt() / 2.0;
    let (max_x, max_y) = ((width - 1) as f32, (height - 1) as f32);

    let mut output = Array3::<u8>::zeros((height, width, channels));
    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                let distance = (dx * dx + dy * dy).sqrt();
                let offset = strength * (distance / max_distance).min(1.0);
                let angle = dy.atan2(dx);

                for c in 0..3 {
                    let channel_angle = angle + (c as f32 - 1.0) * (2.0 * PI / 3.0);
                    let sx = (x as f32 + channel_angle.cos() * offset).clamp(0.0, max_x).floor() as usize;
                    let sy = (y as f32 + channel_angle.sin() * offset).clamp(0.0, max_y).floor() as usize;
                    row[[x, c]] = input[[sy, sx, c]];
                }
                row[[x, 3]] = input[[y, x, 3]];
            }
        });

    output
}

// ============================================================================
// Old Film
// ============================================================================

/// Faded sepia mix.
///
/// With `k = amount / 100`:
/// - `r' = r(1 - 0.607k) + (g + b)·0.469k`
/// - `g' = g(1 - 0.283k) + (r + b)·0.349k`
/// - `b' = b(1 - 0.111k) + (r + g)·0.189k`
pub fn old_film(input: ArrayView3<u8>, amount: f32) -> Array3<u8> {
    let (_, width, _) = input.dim();
    let mut output = input.to_owned();
    if amount <= 0.0 {
        return output;
    }

    let k = amount / 100.0;
    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(|mut row| {
            for x in 0..width {
                let r = row[[x, 0]] as f32;
                let g = row[[x, 1]] as f32;
                let b = row[[x, 2]] as f32;
                row[[x, 0]] = clamp_round(r * (1.0 - 0.607 * k) + (g + b) * 0.469 * k);
                row[[x, 1]] = clamp_round(g * (1.0 - 0.283 * k) + (r + b) * 0.349 * k);
                row[[x, 2]] = clamp_round(b * (1.0 - 0.111 * k) + (r + g) * 0.189 * k);
            }
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_shift_keeps_alpha_and_size() {
        let img = Array3::from_shape_fn((9, 9, 4), |(y, x, c)| ((x * 20 + y * 3 + c * 50) % 256) as u8);
        let out = rgb_shift(img.view(), 100.0);
        assert_eq!(out.dim(), img.dim());
        for y in 0..9 {
            for x in 0..9 {
                assert_eq!(out[[y, x, 3]], img[[y, x, 3]]);
            }
        }
    }

    #[test]
    fn test_rgb_shift_splits_channels_at_corners() {
        let img = Array3::from_shape_fn((40, 40, 4), |(_, x, c)| if c == 3 { 255 } else { (x * 6) as u8 });
        let out = rgb_shift(img.view(), 100.0);
        let px = [out[[20, 38, 0]], out[[20, 38, 1]], out[[20, 38, 2]]];
        assert!(px[0] != px[1] || px[1] != px[2]);
    }

    #[test]
    fn test_old_film_full_strength() {
        let img = Array3::from_shape_fn((1, 1, 4), |(_, _, c)| [100, 50, 0, 77][c]);
        let out = old_film(img.view(), 100.0);
        // r = 100 * 0.393 + 50 * 0.469
        assert_eq!(out[[0, 0, 0]], 63);
        assert_eq!(out[[0, 0, 1]], 71);
        assert_eq!(out[[0, 0, 2]], 28);
        assert_eq!(out[[0, 0, 3]], 77);
    }

    #[test]
    fn test_old_film_zero_is_copy() {
        let img = Array3::from_shape_fn((2, 2, 4), |(y, x, c)| (y * 9 + x * 3 + c) as u8);
        assert_eq!(old_film(img.view(), 0.0), img);
    }
}
