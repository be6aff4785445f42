//! Canvas-preserving geometric operations: pixelate and flip.
//!
//! ## Supported Formats
//!
//! All functions work on RGBA (H, W, 4) and return an image of the same
//! dimensions.
//!
//! ## Flip Mapping
//!
//! - Horizontal: (x, y) -> (W - 1 - x, y)
//! - Vertical: (x, y) -> (x, H - 1 - y)

use ndarray::{s, Array3, ArrayView3};

use super::core::resize_nearest;

/// Mosaic block size for a pixelate amount: `max(2, ceil(amount / 100 * 20))`.
pub fn pixelate_block_size(amount: f32) -> usize {
    ((amount / 100.0 * 20.0).ceil() as usize).max(2)
}

/// Pixelate by nearest-neighbor downsampling and upsampling.
///
/// # Arguments
/// * `input` - RGBA image (H, W, 4)
/// * `amount` - Pixelate amount 0-100; 0 returns a copy
///
/// # Returns
/// Blocky image with the input's dimensions
pub fn pixelate(input: ArrayView3<u8>, amount: f32) -> Array3<u8> {
    let (h, w, _) = input.dim();
    if amount <= 0.0 || h == 0 || w == 0 {
        return input.to_owned();
    }

    let block = pixelate_block_size(amount);
    let small_w = w.div_ceil(block);
    let small_h = h.div_ceil(block);

    let small = resize_nearest(input, small_w, small_h);
    resize_nearest(small.view(), w, h)
}

/// Mirror the image around its center.
///
/// # Arguments
/// * `input` - RGBA image (H, W, 4)
/// * `horizontal` - Mirror left/right
/// * `vertical` - Mirror top/bottom
pub fn flip(input: ArrayView3<u8>, horizontal: bool, vertical: bool) -> Array3<u8> {
    let mirrored = match (horizontal, vertical) {
        (false, false) => return input.to_owned(),
        (true, false) => input.slice(s![.., ..;-1, ..]),
        (false, true) => input.slice(s![..;-1, .., ..]),
        (true, true) => input.slice(s![..;-1, ..;-1, ..]),
    };
    // Copy into a standard-layout array rather than keeping negative strides.
    let mut output = Array3::<u8>::zeros(input.dim());
    output.assign(&mirrored);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(h: usize, w: usize) -> Array3<u8> {
        Array3::from_shape_fn((h, w, 4), |(y, x, c)| if c == 3 { 255 } else { (y * 16 + x) as u8 })
    }

    #[test]
    fn test_block_size() {
        assert_eq!(pixelate_block_size(1.0), 2);
        assert_eq!(pixelate_block_size(50.0), 10);
        assert_eq!(pixelate_block_size(100.0), 20);
    }

    #[test]
    fn test_pixelate_makes_uniform_blocks() {
        let img = gradient(8, 8);
        let out = pixelate(img.view(), 10.0);
        assert_eq!(out.dim(), (8, 8, 4));
        // Block size 2: each 2x2 block is a single color.
        for by in 0..4 {
            for bx in 0..4 {
                let v = out[[by * 2, bx * 2, 0]];
                assert_eq!(out[[by * 2 + 1, bx * 2 + 1, 0]], v);
                assert_eq!(out[[by * 2, bx * 2 + 1, 0]], v);
            }
        }
    }

    #[test]
    fn test_pixelate_odd_size_keeps_dimensions() {
        let img = gradient(7, 11);
        assert_eq!(pixelate(img.view(), 75.0).dim(), (7, 11, 4));
    }

    #[test]
    fn test_flip_horizontal_mirrors_columns() {
        let img = gradient(2, 3);
        let out = flip(img.view(), true, false);
        assert_eq!(out[[0, 0, 0]], img[[0, 2, 0]]);
        assert_eq!(out[[1, 2, 0]], img[[1, 0, 0]]);
    }

    #[test]
    fn test_flip_vertical_mirrors_rows() {
        let img = gradient(3, 2);
        let out = flip(img.view(), false, true);
        assert_eq!(out[[0, 1, 0]], img[[2, 1, 0]]);
    }

    #[test]
    fn test_double_flip_restores() {
        let img = gradient(5, 4);
        let once = flip(img.view(), true, true);
        assert_eq!(flip(once.view(), true, true), img);
    }
}
