//! Analog tape look: VHS tracking errors and CRT scanlines.
//!
//! ## VHS
//!
//! Row by row, with `s = vhs / 100` and a random time phase `t` per render:
//! - vertical tracking shift `floor(sin(0.1y + 2t)·12s + U(-12.5s, 12.5s))`,
//!   plus a rare (`0.1%·s`) sync jump of -10..9 rows
//! - static noise on a row with probability `0.5s`, each pixel with 0.4
//! - channel separation: R, G, B sampled `sin(0.03y + 2t + φ)·(12, 8, 12)·s`
//!   pixels to the right, with φ = 0, π/3, 2π/3
//! - brightness flicker and `U(-30s, 30s)` noise
//! - a horizontal jitter line with probability `3%·s`
//!
//! The pass finishes with a `0.8s` pixel Gaussian blur.
//!
//! ## Scanlines
//!
//! Row factor `1 - k·(0.9·sin(2y) + 0.1)·1.2`, 30% of rows also scaled by
//! `U(0.8, 1.2)`.
//!
//! Channel offsets address the buffer as one flat run of pixels, so an
//! offset past the end of a row reads from the neighbouring row.

use ndarray::{Array3, ArrayView3};

use super::core::{clamp_round, gaussian_blur};
use crate::random::RandomSource;

/// Map a flat pixel index back to `(y, x)`.
#[inline]
fn unflatten(index: i64, width: usize, total: i64) -> Option<(usize, usize)> {
    (index >= 0 && index < total).then(|| ((index as usize) / width, (index as usize) % width))
}

/// VHS tracking distortion, noise and colour bleed (no final blur).
pub fn vhs_tracking(input: ArrayView3<u8>, amount: f32, rng: &mut dyn RandomSource) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut data = input.to_owned();
    if amount <= 0.0 || height == 0 || width == 0 {
        return data;
    }

    let s = amount / 100.0;
    let time = rng.uniform(0.0, 100.0);
    let total = (width * height) as i64;
    let flicker = 1.0 + (time * 10.0).sin() * 0.1 * s;

    for y in 0..height {
        let yf = y as f32;

        let tracking = (yf * 0.1 + time * 2.0).sin() * 12.0 * s;
        let jitter = (rng.next_f32() - 0.5) * 25.0 * s;
        let vertical_shift = (tracking + jitter).floor() as i64;
        let sync_jump = if rng.chance(0.001 * s) {
            (rng.next_f32() * 20.0).floor() as i64 - 10
        } else {
            0
        };

        let shift = vertical_shift + sync_jump;
        if shift != 0 {
            let sy = (y as i64 + shift).clamp(0, height as i64 - 1) as usize;
            for x in 0..width {
                for c in 0..3 {
                    data[[y, x, c]] = input[[sy, x, c]];
                }
            }
        }

        if rng.chance(0.5 * s) {
            for x in 0..width {
                if rng.chance(0.4) {
                    let noise = rng.next_f32() * 80.0 * s;
                    for c in 0..3 {
                        data[[y, x, c]] = clamp_round(data[[y, x, c]] as f32 + noise);
                    }
                }
            }
        }

        let phase = yf * 0.03 + time * 2.0;
        let offsets = [
            phase.sin() * 12.0 * s,
            (phase + std::f32::consts::PI / 3.0).sin() * 8.0 * s,
            (phase + std::f32::consts::PI * 2.0 / 3.0).sin() * 12.0 * s,
        ];
        let brightness = flicker * (1.0 + (yf * 0.02 + time).sin() * 0.2 * s);

        for x in 0..width {
            for (c, offset) in offsets.iter().enumerate() {
                let index = (y * width) as i64 + (x as f32 + offset).floor() as i64;
                if let Some((sy, sx)) = unflatten(index, width, total) {
                    data[[y, x, c]] = input[[sy, sx, c]];
                }
            }

            let noise = (rng.next_f32() - 0.5) * 60.0 * s;
            for c in 0..3 {
                data[[y, x, c]] = clamp_round(data[[y, x, c]] as f32 * brightness + noise);
            }
        }

        if rng.chance(0.03 * s) {
            let offset = (rng.next_f32() - 0.5) * 60.0 * s;
            let intensity = 0.7 + rng.next_f32() * 0.5;
            for x in 0..width {
                let sx = (x as f32 + offset).floor() as i64;
                if sx >= 0 && (sx as usize) < width {
                    for c in 0..3 {
                        data[[y, x, c]] = clamp_round(input[[y, sx as usize, c]] as f32 * intensity);
                    }
                }
            }
        }
    }

    data
}

/// Darken rows with a sinusoidal scanline mask.
pub fn scanlines(input: ArrayView3<u8>, amount: f32, rng: &mut dyn RandomSource) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut data = input.to_owned();
    if amount <= 0.0 {
        return data;
    }

    let k = amount / 100.0;
    for y in 0..height {
        let intensity = (y as f32 * 2.0).sin() * 0.9 + 0.1;
        let darkness = 1.0 - k * intensity * 1.2;
        let row_noise = if rng.chance(0.3) { 0.8 + rng.next_f32() * 0.4 } else { 1.0 };
        let factor = darkness * row_noise;

        for x in 0..width {
            for c in 0..3 {
                data[[y, x, c]] = clamp_round(data[[y, x, c]] as f32 * factor);
            }
        }
    }

    data
}

/// The combined VHS stage: tracking, scanlines, then the softening blur.
pub fn vhs(input: ArrayView3<u8>, vhs: f32, scanline_amount: f32, rng: &mut dyn RandomSource) -> Array3<u8> {
    let mut output = if vhs > 0.0 {
        vhs_tracking(input, vhs, rng)
    } else {
        input.to_owned()
    };

    if scanline_amount > 0.0 {
        output = scanlines(output.view(), scanline_amount, rng);
    }

    if vhs > 0.0 {
        output = gaussian_blur(output.view(), vhs / 100.0 * 0.8);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_source;

    fn gray(h: usize, w: usize) -> Array3<u8> {
        Array3::from_shape_fn((h, w, 4), |(y, x, c)| if c == 3 { 255 } else { (60 + (x + y) % 100) as u8 })
    }

    #[test]
    fn test_vhs_changes_pixels_and_keeps_alpha() {
        let img = gray(40, 40);
        let out = vhs(img.view(), 80.0, 0.0, &mut seeded_source(5));
        assert_eq!(out.dim(), img.dim());
        assert_ne!(out, img);
        assert!(out.indexed_iter().filter(|((_, _, c), _)| *c == 3).all(|(_, &a)| a == 255));
    }

    #[test]
    fn test_vhs_is_reproducible_with_seed() {
        let img = gray(16, 16);
        let a = vhs(img.view(), 50.0, 50.0, &mut seeded_source(9));
        let b = vhs(img.view(), 50.0, 50.0, &mut seeded_source(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_scanline_row_zero_darkened() {
        // sin(0) = 0, so row 0 gets darkness 1 - k * 0.12 (times row noise).
        let img = Array3::from_shape_fn((1, 4, 4), |(_, _, c)| if c == 3 { 255 } else { 200 });
        let out = scanlines(img.view(), 100.0, &mut seeded_source(1));
        let v = out[[0, 0, 0]];
        assert!(v <= 212 && v >= 140, "v = {v}");
    }

    #[test]
    fn test_unflatten_wraps_rows() {
        assert_eq!(unflatten(7, 5, 20), Some((1, 2)));
        assert_eq!(unflatten(-1, 5, 20), None);
        assert_eq!(unflatten(20, 5, 20), None);
    }
}
