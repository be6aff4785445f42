//! Core utilities for image processing filters.
//!
//! This module provides shared functionality used by multiple filters:
//! - Gaussian kernel generation and separable convolution
//! - Rounding/clamping back to 8-bit channels
//! - Bilinear and nearest-neighbor resampling
//! - Blend modes and Porter-Duff compositing in straight alpha
//!
//! All buffers are RGBA `(height, width, 4)` arrays.

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};

/// Sigma above which [`gaussian_blur`] works on a downscaled copy.
const MAX_DIRECT_SIGMA: f32 = 8.0;

// ============================================================================
// Rounding
// ============================================================================

/// Round to the nearest integer and clamp into a u8 channel.
///
/// NaN maps to 0.
#[inline]
pub fn clamp_round(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert a 0.0-1.0 value to a u8 channel.
#[inline]
pub fn unit_to_u8(v: f32) -> u8 {
    clamp_round(v * 255.0)
}

#[inline]
pub fn read_unit(image: &ArrayView3<u8>, y: usize, x: usize) -> [f32; 4] {
    [
        image[[y, x, 0]] as f32 / 255.0,
        image[[y, x, 1]] as f32 / 255.0,
        image[[y, x, 2]] as f32 / 255.0,
        image[[y, x, 3]] as f32 / 255.0,
    ]
}

// ============================================================================
// Gaussian Kernel
// ============================================================================

/// Generate a normalized 1D Gaussian kernel of `2 * radius + 1` taps.
///
/// `weight[i] = exp(-(i - radius)^2 / (2 sigma^2)) / (sigma * sqrt(2 pi))`,
/// then divided by the sum so the weights add up to 1.0. A non-positive
/// sigma yields a unit impulse.
pub fn gaussian_kernel(sigma: f32, radius: usize) -> Vec<f32> {
    let size = radius * 2 + 1;
    if sigma <= 0.0 || !sigma.is_finite() {
        let mut impulse = vec![0.0; size];
        impulse[radius] = 1.0;
        return impulse;
    }

    let two_sigma_sq = 2.0 * sigma * sigma;
    let sigma_root_two_pi = sigma * (2.0 * std::f32::consts::PI).sqrt();

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-(x * x) / two_sigma_sq).exp() / sigma_root_two_pi
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    if sum > 0.0 {
        for v in kernel.iter_mut() {
            *v /= sum;
        }
    } else {
        kernel.iter_mut().for_each(|v| *v = 0.0);
        kernel[radius] = 1.0;
    }

    kernel
}

// ============================================================================
// Separable Convolution
// ============================================================================

/// Direction of a 1D convolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvolveAxis {
    /// Along each row (x varies).
    Horizontal,
    /// Along each column (y varies).
    Vertical,
}

/// Convolve all four channels along one axis.
///
/// Out-of-range taps clamp to the nearest edge pixel. Each weighted sum is
/// rounded and clamped back to 0-255.
pub fn convolve_axis(input: ArrayView3<u8>, kernel: &[f32], axis: ConvolveAxis) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((height, width, channels));
    if height == 0 || width == 0 || kernel.is_empty() {
        return output;
    }
    let half = (kernel.len() / 2) as isize;

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let mut sum = [0.0f32; 4];
                for (ki, &kv) in kernel.iter().enumerate() {
                    let offset = ki as isize - half;
                    let (sy, sx) = match axis {
                        ConvolveAxis::Horizontal => {
                            (y, (x as isize + offset).clamp(0, width as isize - 1) as usize)
                        }
                        ConvolveAxis::Vertical => {
                            ((y as isize + offset).clamp(0, height as isize - 1) as usize, x)
                        }
                    };
                    for (c, acc) in sum.iter_mut().enumerate().take(channels) {
                        *acc += input[[sy, sx, c]] as f32 * kv;
                    }
                }
                for (c, acc) in sum.iter().enumerate().take(channels) {
                    row[[x, c]] = clamp_round(*acc);
                }
            }
        });

    output
}

/// Horizontal pass followed by a vertical pass with the same kernel.
pub fn separable_convolve(input: ArrayView3<u8>, kernel: &[f32]) -> Array3<u8> {
    let horizontal = convolve_axis(input, kernel, ConvolveAxis::Horizontal);
    convolve_axis(horizontal.view(), kernel, ConvolveAxis::Vertical)
}

/// Gaussian blur with a CSS-style pixel radius (the standard deviation).
///
/// Kernel radius is `ceil(3 sigma)`. Large sigmas are applied to a copy
/// downscaled by `8 / sigma` and scaled back up, which bounds the cost.
pub fn gaussian_blur(input: ArrayView3<u8>, sigma: f32) -> Array3<u8> {
    let (height, width, _) = input.dim();
    if sigma <= 0.0 || !sigma.is_finite() || height == 0 || width == 0 {
        return input.to_owned();
    }

    if sigma > MAX_DIRECT_SIGMA {
        let scale = MAX_DIRECT_SIGMA / sigma;
        let small_w = ((width as f32 * scale).ceil() as usize).max(1);
        let small_h = ((height as f32 * scale).ceil() as usize).max(1);
        let small = resize_bilinear(input, small_w, small_h);
        let blurred = gaussian_blur(small.view(), MAX_DIRECT_SIGMA);
        return resize_bilinear(blurred.view(), width, height);
    }

    let radius = (sigma * 3.0).ceil() as usize;
    let kernel = gaussian_kernel(sigma, radius);
    separable_convolve(input, &kernel)
}

// ============================================================================
// Resampling
// ============================================================================

/// Resize with bilinear filtering, sampling at pixel centers.
pub fn resize_bilinear(input: ArrayView3<u8>, new_width: usize, new_height: usize) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((new_height, new_width, channels));
    if height == 0 || width == 0 || new_width == 0 || new_height == 0 {
        return output;
    }

    let scale_x = width as f32 / new_width as f32;
    let scale_y = height as f32 / new_height as f32;

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            let fy = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, (height - 1) as f32);
            let y0 = fy.floor() as usize;
            let y1 = (y0 + 1).min(height - 1);
            let ty = fy - y0 as f32;

            for x in 0..new_width {
                let fx = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, (width - 1) as f32);
                let x0 = fx.floor() as usize;
                let x1 = (x0 + 1).min(width - 1);
                let tx = fx - x0 as f32;

                for c in 0..channels {
                    let top = input[[y0, x0, c]] as f32 * (1.0 - tx) + input[[y0, x1, c]] as f32 * tx;
                    let bottom = input[[y1, x0, c]] as f32 * (1.0 - tx) + input[[y1, x1, c]] as f32 * tx;
                    row[[x, c]] = clamp_round(top * (1.0 - ty) + bottom * ty);
                }
            }
        });

    output
}

/// Resize with nearest-neighbor sampling (image smoothing disabled).
pub fn resize_nearest(input: ArrayView3<u8>, new_width: usize, new_height: usize) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    let mut output = Array3::<u8>::zeros((new_height, new_width, channels));
    if height == 0 || width == 0 {
        return output;
    }

    let scale_x = width as f32 / new_width.max(1) as f32;
    let scale_y = height as f32 / new_height.max(1) as f32;

    for y in 0..new_height {
        let sy = (((y as f32 + 0.5) * scale_y) as usize).min(height - 1);
        for x in 0..new_width {
            let sx = (((x as f32 + 0.5) * scale_x) as usize).min(width - 1);
            for c in 0..channels {
                output[[y, x, c]] = input[[sy, sx, c]];
            }
        }
    }

    output
}

// ============================================================================
// Blending
// ============================================================================

/// Separable blend modes (W3C Compositing and Blending).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    Normal,
    Multiply,
    Screen,
    SoftLight,
}

impl BlendMode {
    /// Blend backdrop `cb` with source `cs`, both 0.0-1.0.
    #[inline]
    pub fn apply(self, cb: f32, cs: f32) -> f32 {
        match self {
            BlendMode::Normal => cs,
            BlendMode::Multiply => cb * cs,
            BlendMode::Screen => cb + cs - cb * cs,
            BlendMode::SoftLight => {
                if cs <= 0.5 {
                    cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
                } else {
                    let d = if cb <= 0.25 {
                        ((16.0 * cb - 12.0) * cb + 4.0) * cb
                    } else {
                        cb.sqrt()
                    };
                    cb + (2.0 * cs - 1.0) * (d - cb)
                }
            }
        }
    }
}

/// Porter-Duff operator used to put a source onto the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Source over backdrop, colors mixed with the given blend mode.
    SourceOver(BlendMode),
    /// Source drawn only where the backdrop is, backdrop alpha kept.
    SourceAtop,
    /// Additive ("lighter").
    Lighter,
}

/// Composite a straight-alpha source color onto a straight-alpha backdrop.
///
/// Both pixels are RGBA in 0.0-1.0; the result is straight alpha as well.
#[inline]
pub fn composite_pixel(dst: [f32; 4], src: [f32; 3], src_a: f32, op: Composite) -> [f32; 4] {
    let ab = dst[3];
    let a_s = src_a.clamp(0.0, 1.0);
    if a_s <= 0.0 {
        return dst;
    }

    match op {
        Composite::SourceOver(mode) => {
            let ao = a_s + ab * (1.0 - a_s);
            if ao <= 0.0 {
                return [0.0; 4];
            }
            let mut out = [0.0f32; 4];
            for c in 0..3 {
                let mixed = (1.0 - ab) * src[c] + ab * mode.apply(dst[c], src[c]);
                let premul = a_s * mixed + (1.0 - a_s) * ab * dst[c];
                out[c] = premul / ao;
            }
            out[3] = ao;
            out
        }
        Composite::SourceAtop => {
            let mut out = dst;
            for c in 0..3 {
                out[c] = src[c] * a_s + dst[c] * (1.0 - a_s);
            }
            out
        }
        Composite::Lighter => {
            let ao = (a_s + ab).min(1.0);
            if ao <= 0.0 {
                return [0.0; 4];
            }
            let mut out = [0.0f32; 4];
            for c in 0..3 {
                out[c] = ((src[c] * a_s + dst[c] * ab) / ao).min(1.0);
            }
            out[3] = ao;
            out
        }
    }
}

/// Composite a per-pixel fill onto the image.
///
/// `fill(x, y)` returns the source color and alpha for that pixel. Rows are
/// processed in parallel.
pub fn composite_fill<F>(input: ArrayView3<u8>, op: Composite, fill: F) -> Array3<u8>
where
    F: Fn(usize, usize) -> ([f32; 3], f32) + Sync,
{
    let (_, width, channels) = input.dim();
    let mut output = input.to_owned();

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let (color, alpha) = fill(x, y);
                if alpha <= 0.0 {
                    continue;
                }
                let dst = read_unit(&input, y, x);
                let out = composite_pixel(dst, color, alpha, op);
                for c in 0..channels.min(4) {
                    row[[x, c]] = unit_to_u8(out[c]);
                }
            }
        });

    output
}

/// Composite a whole layer (same size as `input`) onto `input`.
///
/// The layer's own alpha is multiplied by `opacity`.
pub fn composite_layer(input: ArrayView3<u8>, layer: ArrayView3<u8>, opacity: f32, op: Composite) -> Array3<u8> {
    composite_fill(input, op, |x, y| {
        let px = read_unit(&layer, y, x);
        ([px[0], px[1], px[2]], px[3] * opacity)
    })
}

// ============================================================================
// Gradients
// ============================================================================

/// Gradient stop: position (0.0-1.0), color (0.0-1.0) and alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub position: f32,
    pub color: [f32; 3],
    pub alpha: f32,
}

impl GradientStop {
    pub fn new(position: f32, color: [f32; 3], alpha: f32) -> Self {
        GradientStop { position, color, alpha }
    }
}

/// Interpolate color and alpha at `t` from stops sorted by position.
///
/// Interpolation happens in premultiplied space, matching canvas gradients.
pub fn interpolate_gradient(stops: &[GradientStop], t: f32) -> ([f32; 3], f32) {
    let Some(first) = stops.first() else {
        return ([0.0; 3], 0.0);
    };
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if t <= first.position {
        return (first.color, first.alpha);
    }

    for pair in stops.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if t > next.position {
            continue;
        }
        let span = next.position - prev.position;
        if span.abs() < 1e-4 {
            return (next.color, next.alpha);
        }
        let local = ((t - prev.position) / span).clamp(0.0, 1.0);
        let alpha = prev.alpha + (next.alpha - prev.alpha) * local;
        if alpha <= 0.0 {
            return (next.color, 0.0);
        }
        let mut color = [0.0f32; 3];
        for c in 0..3 {
            let premul = prev.color[c] * prev.alpha + (next.color[c] * next.alpha - prev.color[c] * prev.alpha) * local;
            color[c] = premul / alpha;
        }
        return (color, alpha);
    }

    let last = stops[stops.len() - 1];
    (last.color, last.alpha)
}

/// Position of `(x, y)` along the linear gradient from `start` to `end`.
///
/// Returns 0.0 for a zero-length gradient line.
#[inline]
pub fn linear_gradient_t(x: f32, y: f32, start: (f32, f32), end: (f32, f32)) -> f32 {
    let (vx, vy) = (end.0 - start.0, end.1 - start.1);
    let len_sq = vx * vx + vy * vy;
    if len_sq < 1e-9 {
        return 0.0;
    }
    ((x - start.0) * vx + (y - start.1) * vy) / len_sq
}
