//! Blur stage for RGBA images.
//!
//! The blur slider drives a scale-then-blur-then-upscale pipeline: the image
//! is drawn at a reduced size, blurred with a separable Gaussian, and scaled
//! back with bilinear interpolation. Downscaling keeps the cost bounded
//! independent of the blur amount. Alpha is blurred along with RGB.

use ndarray::{Array3, ArrayView3};

use super::core::{gaussian_kernel, resize_bilinear, separable_convolve};

/// Downscale factor for a blur amount: `clamp(1 - blur / 200, 0.25, 1)`.
pub fn blur_scale(blur: f32) -> f32 {
    (1.0 - blur / 200.0).clamp(0.25, 1.0)
}

/// Kernel radius and sigma for a blur amount.
///
/// `scaled = blur / 100 * 25`, radius `ceil(scaled)`, sigma `scaled / 2`.
pub fn blur_kernel_params(blur: f32) -> (usize, f32) {
    let scaled = blur / 100.0 * 25.0;
    (scaled.ceil().max(0.0) as usize, scaled * 0.5)
}

/// Apply the blur stage.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `blur` - Blur amount, 0-100; 0 returns a copy
///
/// # Returns
/// Blurred image with the input's dimensions
pub fn blur(input: ArrayView3<u8>, blur: f32) -> Array3<u8> {
    let (height, width, _) = input.dim();
    if blur <= 0.0 || height == 0 || width == 0 {
        return input.to_owned();
    }

    let scale = blur_scale(blur);
    let scaled_w = ((width as f32 * scale).floor() as usize).max(1);
    let scaled_h = ((height as f32 * scale).floor() as usize).max(1);

    let small = if scaled_w == width && scaled_h == height {
        input.to_owned()
    } else {
        resize_bilinear(input, scaled_w, scaled_h)
    };

    let (radius, sigma) = blur_kernel_params(blur);
    let kernel = gaussian_kernel(sigma, radius);
    let blurred = separable_convolve(small.view(), &kernel);

    if scaled_w == width && scaled_h == height {
        blurred
    } else {
        resize_bilinear(blurred.view(), width, height)
    }
}
