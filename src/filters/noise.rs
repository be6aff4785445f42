//! Additive grain.
//!
//! Each pixel is perturbed with probability 0.5. A perturbed pixel gets one
//! uniform offset in `[-amount, amount)` added to R, G and B alike, so the
//! grain is monochrome.
//!
//! ## Supported Formats
//!
//! - **RGBA8**: (height, width, 4), alpha preserved.
//!
//! Draws come from a [`RandomSource`] in row-major order, so a seeded source
//! reproduces the same grain.

use ndarray::{Array3, ArrayView3};

use super::core::clamp_round;
use crate::random::RandomSource;

/// Probability that a pixel receives noise.
const NOISE_PROBABILITY: f32 = 0.5;

/// Add grain to an RGBA image.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `amount` - Noise amount 0-100, the maximum per-channel offset
/// * `rng` - Random source
///
/// # Returns
/// Noisy image with alpha unchanged
pub fn add_noise(input: ArrayView3<u8>, amount: f32, rng: &mut dyn RandomSource) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = input.to_owned();
    if amount <= 0.0 {
        return output;
    }

    for y in 0..height {
        for x in 0..width {
            if !rng.chance(NOISE_PROBABILITY) {
                continue;
            }
            let offset = (rng.next_f32() - 0.5) * amount * 2.0;
            for c in 0..3 {
                output[[y, x, c]] = clamp_round(output[[y, x, c]] as f32 + offset);
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_source;

    fn gray(h: usize, w: usize) -> Array3<u8> {
        Array3::from_shape_fn((h, w, 4), |(_, _, c)| if c == 3 { 255 } else { 128 })
    }

    #[test]
    fn test_noise_is_bounded_and_monochrome() {
        let img = gray(20, 20);
        let out = add_noise(img.view(), 30.0, &mut seeded_source(3));

        let mut changed = 0;
        for y in 0..20 {
            for x in 0..20 {
                let r = out[[y, x, 0]];
                assert_eq!(r, out[[y, x, 1]]);
                assert_eq!(r, out[[y, x, 2]]);
                assert!((r as i32 - 128).abs() <= 30);
                assert_eq!(out[[y, x, 3]], 255);
                if r != 128 {
                    changed += 1;
                }
            }
        }
        // Roughly half the pixels are touched.
        assert!(changed > 100 && changed < 300, "changed = {changed}");
    }

    #[test]
    fn test_same_seed_same_grain() {
        let img = gray(10, 10);
        let a = add_noise(img.view(), 50.0, &mut seeded_source(11));
        let b = add_noise(img.view(), 50.0, &mut seeded_source(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_amount_is_copy() {
        let img = gray(4, 4);
        assert_eq!(add_noise(img.view(), 0.0, &mut seeded_source(1)), img);
    }
}
