//! Digital glitch effect.
//!
//! With `s = amount / 100`:
//! 1. `floor(30s)` blocks, each starting at a random row with height
//!    `U(0, 100s)`. A block is, with probabilities 0.4 / 0.3 / 0.3:
//!    - shifted horizontally by `U(0, 50s)` pixels left or right,
//!    - split, R read `U(0, 30s)` pixels right and B the same distance left,
//!    - corrupted, each pixel with probability `0.4s` set to a random color
//!      or to pure black/white.
//! 2. With probability `s`, `floor(10s)` bands of 1-20 rows filled white,
//!    black or with random colors.
//! 3. With probability `0.8s`, `floor(15s)` full-height streaks 1-10 pixels
//!    wide in one random color each.
//!
//! Shift and split read from the frame as it was before the effect. Alpha is
//! never touched.

use ndarray::{Array3, ArrayView3};

use crate::random::RandomSource;

/// Block transformation chosen per glitch block.
#[derive(Debug, Clone, Copy, PartialEq)]
enum BlockKind {
    Shift(f32),
    Split(f32),
    Corrupt,
}

use BlockKind::{Corrupt, Shift, Split};

#[inline]
fn random_color(rng: &mut dyn RandomSource) -> [u8; 3] {
    [
        (rng.next_f32() * 255.0) as u8,
        (rng.next_f32() * 255.0) as u8,
        (rng.next_f32() * 255.0) as u8,
    ]
}

#[inline]
fn set_rgb(data: &mut Array3<u8>, y: usize, x: usize, rgb: [u8; 3]) {
    for (c, v) in rgb.into_iter().enumerate() {
        data[[y, x, c]] = v;
    }
}

/// Apply the glitch effect.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `amount` - Glitch amount 0-100
/// * `rng` - Random source
pub fn glitch(input: ArrayView3<u8>, amount: f32, rng: &mut dyn RandomSource) -> Array3<u8> {
    let (height, width, _) = input.dim();
    let mut data = input.to_owned();
    if amount <= 0.0 || height == 0 || width == 0 {
        return data;
    }

    let s = amount / 100.0;
    let total = (width * height) as i64;

    let blocks = (s * 30.0).floor() as usize;
    for _ in 0..blocks {
        let block_height = rng.next_f32() * 100.0 * s;
        let top = rng.below(height);
        // Rows top..top + block_height, partial last row included.
        let bottom = ((top as f32 + block_height).ceil() as usize).min(height);

        let roll = rng.next_f32();
        let kind = if roll < 0.4 {
            let distance = rng.next_f32() * 50.0 * s;
            Shift(if rng.chance(0.5) { -distance } else { distance })
        } else if roll < 0.7 {
            Split(rng.next_f32() * 30.0 * s)
        } else {
            Corrupt
        };

        for y in top..bottom {
            match kind {
                Shift(offset) => {
                    for x in 0..width {
                        let sx = (x as f32 + offset).floor() as i64;
                        if sx >= 0 && (sx as usize) < width {
                            for c in 0..3 {
                                data[[y, x, c]] = input[[y, sx as usize, c]];
                            }
                        }
                    }
                }
                Split(offset) => {
                    // Red and blue sample along the flat pixel run.
                    for x in 0..width {
                        let row_start = (y * width) as i64;
                        let red = row_start + (x as f32 + offset).floor() as i64;
                        let blue = row_start + (x as f32 - offset).floor() as i64;
                        if red < total && blue >= 0 {
                            let (ry, rx) = ((red as usize) / width, (red as usize) % width);
                            let (by, bx) = ((blue as usize) / width, (blue as usize) % width);
                            data[[y, x, 0]] = input[[ry, rx, 0]];
                            data[[y, x, 2]] = input[[by, bx, 2]];
                        }
                    }
                }
                Corrupt => {
                    for x in 0..width {
                        if !rng.chance(s * 0.4) {
                            continue;
                        }
                        let rgb = if rng.chance(0.5) {
                            random_color(rng)
                        } else if rng.chance(0.5) {
                            [0, 0, 0]
                        } else {
                            [255, 255, 255]
                        };
                        set_rgb(&mut data, y, x, rgb);
                    }
                }
            }
        }
    }

    if rng.chance(s) {
        let bands = (s * 10.0).floor() as usize;
        for _ in 0..bands {
            let top = rng.below(height);
            let band_height = (rng.next_f32() * 20.0 + 1.0).floor() as usize;
            let style = rng.next_f32();
            for y in top..(top + band_height).min(height) {
                for x in 0..width {
                    let rgb = if style < 0.3 {
                        [255, 255, 255]
                    } else if style < 0.6 {
                        [0, 0, 0]
                    } else {
                        random_color(rng)
                    };
                    set_rgb(&mut data, y, x, rgb);
                }
            }
        }
    }

    if rng.chance(s * 0.8) {
        let streaks = (s * 15.0).floor() as usize;
        for _ in 0..streaks {
            let left = rng.below(width);
            let streak_width = (rng.next_f32() * 10.0 + 1.0).floor() as usize;
            let rgb = random_color(rng);
            for y in 0..height {
                for x in left..(left + streak_width).min(width) {
                    set_rgb(&mut data, y, x, rgb);
                }
            }
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_source;

    fn gradient(h: usize, w: usize) -> Array3<u8> {
        Array3::from_shape_fn((h, w, 4), |(y, x, c)| if c == 3 { 200 } else { ((x * 2 + y) % 256) as u8 })
    }

    #[test]
    fn test_glitch_changes_a_pixel() {
        let img = gradient(100, 100);
        let out = glitch(img.view(), 80.0, &mut seeded_source(42));
        assert_ne!(out, img);
    }

    #[test]
    fn test_glitch_never_touches_alpha() {
        let img = gradient(50, 60);
        let out = glitch(img.view(), 100.0, &mut seeded_source(7));
        assert!(out.indexed_iter().filter(|((_, _, c), _)| *c == 3).all(|(_, &a)| a == 200));
    }

    #[test]
    fn test_glitch_seeded_repeatable() {
        let img = gradient(30, 30);
        let a = glitch(img.view(), 60.0, &mut seeded_source(2));
        let b = glitch(img.view(), 60.0, &mut seeded_source(2));
        assert_eq!(a, b);
    }

    #[test]
    fn test_tiny_amount_has_no_blocks() {
        // floor(30 * 0.03) = 0 blocks, floor(10 * 0.03) = 0 bands, floor(15 * 0.03) = 0 streaks.
        let img = gradient(10, 10);
        assert_eq!(glitch(img.view(), 3.0, &mut seeded_source(1)), img);
    }
}
