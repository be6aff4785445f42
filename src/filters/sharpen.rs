//! Sharpen filter.
//!
//! Convolves RGB with a fixed 3x3 cross kernel and blends the result with
//! the original:
//!
//! ```text
//!  0   -1.5   0
//! -1.5  7   -1.5
//!  0   -1.5   0
//! ```
//!
//! ## Supported Formats
//!
//! - **RGBA8**: (height, width, 4). Alpha is preserved and the one pixel
//!   border is left untouched.

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};

use super::core::clamp_round;

const CENTER_WEIGHT: f32 = 7.0;
const NEIGHBOR_WEIGHT: f32 = -1.5;

/// Sharpen an RGBA image.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `amount` - Sharpen amount 0-100; the blend factor is `1 + amount / 50`
///
/// # Returns
/// `original + (convolved - original) * (factor - 1)` for interior pixels
pub fn sharpen(input: ArrayView3<u8>, amount: f32) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut output = input.to_owned();
    if amount <= 0.0 || height < 3 || width < 3 {
        return output;
    }

    let strength = amount / 50.0;

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            if y == 0 || y == height - 1 {
                return;
            }
            for x in 1..width - 1 {
                for c in 0..3 {
                    let center = input[[y, x, c]] as f32;
                    let sum = center * CENTER_WEIGHT
                        + NEIGHBOR_WEIGHT
                            * (input[[y - 1, x, c]] as f32
                                + input[[y + 1, x, c]] as f32
                                + input[[y, x - 1, c]] as f32
                                + input[[y, x + 1, c]] as f32);
                    row[[x, c]] = clamp_round(center + (sum - center) * strength);
                }
            }
        });

    output
}
