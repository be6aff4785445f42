//! Whole-image color adjustments composed like a CSS `filter` chain.
//!
//! The chain runs, per pixel, in this order:
//! brightness, exposure gain, contrast, saturate, hue-rotate, invert, sepia,
//! grayscale, temperature/tint gains, opacity.
//!
//! Each function works on straight (unpremultiplied) color in 0.0-1.0 and
//! clamps its result before the next one runs, the way chained filter
//! primitives do. The final value is rounded back to u8 once.
//!
//! ## Supported Formats
//!
//! - **RGBA8**: (height, width, 4), alpha only touched by opacity.

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};

use crate::filters::core::unit_to_u8;
use crate::params::FilterParameters;

type Matrix3 = [[f32; 3]; 3];

// ============================================================================
// Parameters
// ============================================================================

/// Amounts for the CSS-style chain, as multipliers (1.0 = neutral).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorFilter {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    /// Degrees.
    pub hue_rotate: f32,
    pub invert: f32,
    pub sepia: f32,
    pub grayscale: f32,
    pub opacity: f32,
    /// Bulk exposure gain applied with brightness.
    pub exposure: f32,
    /// -1.0 (cool) to 1.0 (warm).
    pub temperature: f32,
    /// -1.0 (magenta) to 1.0 (green).
    pub tint: f32,
}

impl Default for ColorFilter {
    fn default() -> Self {
        ColorFilter {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            hue_rotate: 0.0,
            invert: 0.0,
            sepia: 0.0,
            grayscale: 0.0,
            opacity: 1.0,
            exposure: 1.0,
            temperature: 0.0,
            tint: 0.0,
        }
    }
}

impl ColorFilter {
    pub fn from_params(params: &FilterParameters) -> Self {
        ColorFilter {
            brightness: params.brightness / 100.0,
            contrast: params.contrast / 100.0,
            saturation: params.saturation / 100.0,
            hue_rotate: params.hue_rotate,
            invert: params.invert / 100.0,
            sepia: params.sepia / 100.0,
            grayscale: params.grayscale / 100.0,
            opacity: params.opacity / 100.0,
            exposure: params.exposure / 100.0,
            temperature: params.temperature / 100.0,
            tint: params.tint / 100.0,
        }
    }

    /// True when every amount is neutral, so the chain would not change a pixel.
    pub fn is_identity(&self) -> bool {
        let neutral_hue = self.hue_rotate.rem_euclid(360.0) == 0.0;
        neutral_hue && ColorFilter { hue_rotate: 0.0, ..*self } == ColorFilter::default()
    }

    fn color_matrix(&self) -> Option<Matrix3> {
        let mut combined: Option<Matrix3> = None;
        let mut push = |m: Matrix3| {
            combined = Some(match combined {
                Some(prev) => multiply(&m, &prev),
                None => m,
            });
        };
        if self.saturation != 1.0 {
            push(saturate_matrix(self.saturation));
        }
        if self.hue_rotate.rem_euclid(360.0) != 0.0 {
            push(hue_rotate_matrix(self.hue_rotate));
        }
        combined
    }
}

// ============================================================================
// Color Matrices
// ============================================================================

fn multiply(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0f32; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

#[inline]
fn apply_matrix(m: &Matrix3, rgb: [f32; 3]) -> [f32; 3] {
    let mut out = [0.0f32; 3];
    for (i, row) in m.iter().enumerate() {
        out[i] = (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]).clamp(0.0, 1.0);
    }
    out
}

/// `saturate(s)` color matrix.
pub fn saturate_matrix(s: f32) -> Matrix3 {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

/// `hue-rotate(deg)` color matrix.
pub fn hue_rotate_matrix(degrees: f32) -> Matrix3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// `sepia(amount)` color matrix.
pub fn sepia_matrix(amount: f32) -> Matrix3 {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
    ]
}

/// `grayscale(amount)` color matrix (BT.709 weights).
pub fn grayscale_matrix(amount: f32) -> Matrix3 {
    let k = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
    ]
}

// ============================================================================
// Filter Chain
// ============================================================================

/// Run the color chain on one straight-alpha pixel.
#[inline]
fn filter_pixel(f: &ColorFilter, matrix: Option<&Matrix3>, sepia: Option<&Matrix3>, gray: Option<&Matrix3>, px: [f32; 4]) -> [f32; 4] {
    let mut rgb = [px[0], px[1], px[2]];

    let gain = f.brightness * f.exposure;
    if gain != 1.0 {
        rgb = rgb.map(|c| (c * gain).clamp(0.0, 1.0));
    }
    if f.contrast != 1.0 {
        rgb = rgb.map(|c| ((c - 0.5) * f.contrast + 0.5).clamp(0.0, 1.0));
    }
    if let Some(m) = matrix {
        rgb = apply_matrix(m, rgb);
    }
    if f.invert > 0.0 {
        let a = f.invert.min(1.0);
        rgb = rgb.map(|c| c * (1.0 - a) + (1.0 - c) * a);
    }
    if let Some(m) = sepia {
        rgb = apply_matrix(m, rgb);
    }
    if let Some(m) = gray {
        rgb = apply_matrix(m, rgb);
    }
    if f.temperature != 0.0 {
        rgb[0] = (rgb[0] * (1.0 + 0.1 * f.temperature)).clamp(0.0, 1.0);
        rgb[2] = (rgb[2] * (1.0 - 0.1 * f.temperature)).clamp(0.0, 1.0);
    }
    if f.tint != 0.0 {
        rgb[1] = (rgb[1] * (1.0 + 0.1 * f.tint)).clamp(0.0, 1.0);
    }

    [rgb[0], rgb[1], rgb[2], (px[3] * f.opacity.clamp(0.0, 1.0)).clamp(0.0, 1.0)]
}

/// Apply the CSS-style color chain.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `filter` - Amounts for each function of the chain
///
/// # Returns
/// Adjusted image; an identity filter returns an exact copy
pub fn color_filter(input: ArrayView3<u8>, filter: &ColorFilter) -> Array3<u8> {
    if filter.is_identity() {
        return input.to_owned();
    }

    let (_, width, _) = input.dim();
    let mut output = input.to_owned();

    let matrix = filter.color_matrix();
    let sepia = (filter.sepia > 0.0).then(|| sepia_matrix(filter.sepia));
    let gray = (filter.grayscale > 0.0).then(|| grayscale_matrix(filter.grayscale));

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(|mut row| {
            for x in 0..width {
                let px = [
                    row[[x, 0]] as f32 / 255.0,
                    row[[x, 1]] as f32 / 255.0,
                    row[[x, 2]] as f32 / 255.0,
                    row[[x, 3]] as f32 / 255.0,
                ];
                let out = filter_pixel(filter, matrix.as_ref(), sepia.as_ref(), gray.as_ref(), px);
                for (c, v) in out.into_iter().enumerate() {
                    row[[x, c]] = unit_to_u8(v);
                }
            }
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(rgba: [u8; 4]) -> Array3<u8> {
        Array3::from_shape_fn((1, 1, 4), |(_, _, c)| rgba[c])
    }

    fn run(rgba: [u8; 4], filter: ColorFilter) -> [u8; 4] {
        let out = color_filter(pixel(rgba).view(), &filter);
        [out[[0, 0, 0]], out[[0, 0, 1]], out[[0, 0, 2]], out[[0, 0, 3]]]
    }

    #[test]
    fn test_default_params_are_identity() {
        let filter = ColorFilter::from_params(&FilterParameters::default());
        assert!(filter.is_identity());
        assert_eq!(run([12, 200, 99, 180], filter), [12, 200, 99, 180]);
    }

    #[test]
    fn test_full_turn_hue_is_identity() {
        let filter = ColorFilter { hue_rotate: 360.0, ..Default::default() };
        assert!(filter.is_identity());
    }

    #[test]
    fn test_brightness_doubles() {
        let filter = ColorFilter { brightness: 2.0, ..Default::default() };
        assert_eq!(run([50, 100, 200, 255], filter), [100, 200, 255, 255]);
    }

    #[test]
    fn test_exposure_gain_multiplies_with_brightness() {
        let filter = ColorFilter { brightness: 0.5, exposure: 0.5, ..Default::default() };
        assert_eq!(run([200, 100, 40, 255], filter), [50, 25, 10, 255]);
    }

    #[test]
    fn test_zero_contrast_is_mid_gray() {
        let filter = ColorFilter { contrast: 0.0, ..Default::default() };
        assert_eq!(run([0, 255, 30, 255], filter), [128, 128, 128, 255]);
    }

    #[test]
    fn test_full_invert() {
        let filter = ColorFilter { invert: 1.0, ..Default::default() };
        assert_eq!(run([0, 255, 55, 255], filter), [255, 0, 200, 255]);
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let filter = ColorFilter { grayscale: 1.0, ..Default::default() };
        let out = run([255, 0, 0, 255], filter);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
        assert_eq!(out[0], 54);
    }

    #[test]
    fn test_zero_saturation_equalizes_channels() {
        let filter = ColorFilter { saturation: 0.0, ..Default::default() };
        let out = run([10, 200, 60, 255], filter);
        assert!((out[0] as i32 - out[1] as i32).abs() <= 1);
        assert!((out[1] as i32 - out[2] as i32).abs() <= 1);
    }

    #[test]
    fn test_opacity_scales_alpha_only() {
        let filter = ColorFilter { opacity: 0.5, ..Default::default() };
        assert_eq!(run([10, 20, 30, 200], filter), [10, 20, 30, 100]);
    }

    #[test]
    fn test_warm_temperature_raises_red_lowers_blue() {
        let filter = ColorFilter { temperature: 1.0, ..Default::default() };
        let out = run([100, 100, 100, 255], filter);
        assert_eq!(out, [110, 100, 90, 255]);
    }

    #[test]
    fn test_sepia_matrix_full_amount() {
        let m = sepia_matrix(1.0);
        assert!((m[0][0] - 0.393).abs() < 1e-6);
        assert!((m[2][2] - 0.131).abs() < 1e-6);
    }
}
