//! Per-pixel tonal pass: gamma, posterize, highlights, shadows, vibrance,
//! plus the duotone remap.
//!
//! These run late in the pipeline, after the compositing effects. Work is
//! done on integer channel values with rounding after every step so that
//! each step is exactly reproducible from the one before.
//!
//! ## Supported Formats
//!
//! - **RGBA8**: (height, width, 4), alpha preserved.

use ndarray::parallel::prelude::*;
use ndarray::{Array3, ArrayView3, Axis};

use crate::filters::core::clamp_round;
use crate::params::{FilterParameters, Rgb};

// ============================================================================
// Lookup Tables
// ============================================================================

/// Gamma lookup table: `round(255 * (i / 255) ^ (1 / gamma))`.
///
/// A gamma of 1.0 (or anything non-positive) gives the identity table.
pub fn gamma_lut(gamma: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = if gamma == 1.0 || gamma <= 0.0 {
            i as u8
        } else {
            clamp_round(255.0 * (i as f32 / 255.0).powf(1.0 / gamma))
        };
    }
    lut
}

/// Duotone lookup table from `dark` (index 0) to `light` (index 255).
pub fn duotone_lut(dark: Rgb, light: Rgb) -> [[u8; 3]; 256] {
    let mut lut = [[0u8; 3]; 256];
    let (a, b) = ([dark.r, dark.g, dark.b], [light.r, light.g, light.b]);
    for (i, entry) in lut.iter_mut().enumerate() {
        let t = i as f32 / 255.0;
        for c in 0..3 {
            entry[c] = clamp_round(a[c] as f32 * (1.0 - t) + b[c] as f32 * t);
        }
    }
    lut
}

// ============================================================================
// Tone Curve
// ============================================================================

/// Settings for the fused tonal pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneCurve {
    pub gamma: f32,
    /// 0 disables; otherwise `max(2, round(20 - posterize))` levels.
    pub posterize: f32,
    /// -100 to 100.
    pub highlights: f32,
    /// -100 to 100.
    pub shadows: f32,
    /// 100 is neutral.
    pub vibrance: f32,
}

impl ToneCurve {
    pub fn from_params(params: &FilterParameters) -> Self {
        ToneCurve {
            gamma: params.gamma,
            posterize: params.posterize,
            highlights: params.highlights,
            shadows: params.shadows,
            vibrance: params.vibrance,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.gamma == 1.0
            && self.posterize <= 0.0
            && self.highlights == 0.0
            && self.shadows == 0.0
            && self.vibrance == 100.0
    }

    /// Number of posterize levels, or `None` when posterize is off.
    pub fn posterize_levels(&self) -> Option<u32> {
        (self.posterize > 0.0).then(|| ((20.0 - self.posterize).round() as i32).max(2) as u32)
    }
}

/// Quantize one channel to `levels` evenly spaced values.
#[inline]
pub fn posterize_channel(v: u8, levels: u32) -> u8 {
    let step = 255.0 / (levels.max(2) - 1) as f32;
    clamp_round((v as f32 / step).round() * step)
}

#[inline]
fn scale_rgb(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    rgb.map(|c| clamp_round(c as f32 * factor))
}

/// Vibrance: push channels away from their mean, less so for already
/// saturated pixels.
#[inline]
fn vibrance_rgb(rgb: [u8; 3], vibrance: f32) -> [u8; 3] {
    let [r, g, b] = rgb.map(|c| c as f32);
    let avg = (r + g + b) / 3.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let saturation = (max - min) / (max + 0.001);
    let amount = (vibrance - 100.0) / 100.0 * 2.0;
    let factor = 1.0 + amount * (1.0 - saturation);
    [r, g, b].map(|c| clamp_round(avg + (c - avg) * factor))
}

/// Apply the fused tonal pass.
///
/// Per pixel: gamma LUT, posterize, then luminance-gated highlights and
/// shadows (luminance computed once after posterize), then vibrance.
pub fn tone_curve(input: ArrayView3<u8>, curve: &ToneCurve) -> Array3<u8> {
    if curve.is_identity() {
        return input.to_owned();
    }

    let (_, width, _) = input.dim();
    let mut output = input.to_owned();
    let lut = gamma_lut(curve.gamma);
    let levels = curve.posterize_levels();

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(|mut row| {
            for x in 0..width {
                let mut rgb = [row[[x, 0]], row[[x, 1]], row[[x, 2]]];

                if curve.gamma != 1.0 {
                    rgb = rgb.map(|c| lut[c as usize]);
                }
                if let Some(levels) = levels {
                    rgb = rgb.map(|c| posterize_channel(c, levels));
                }

                let luminance =
                    (0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32) / 255.0;

                if curve.highlights != 0.0 && luminance > 0.5 {
                    rgb = scale_rgb(rgb, 1.0 + curve.highlights / 100.0 * (luminance - 0.5) * 2.0);
                }
                if curve.shadows != 0.0 && luminance < 0.5 {
                    rgb = scale_rgb(rgb, 1.0 + curve.shadows / 100.0 * (0.5 - luminance) * 2.0);
                }
                if curve.vibrance != 100.0 {
                    rgb = vibrance_rgb(rgb, curve.vibrance);
                }

                for (c, v) in rgb.into_iter().enumerate() {
                    row[[x, c]] = v;
                }
            }
        });

    output
}

// ============================================================================
// Duotone
// ============================================================================

/// Remap each pixel's channel average through a two-color ramp.
///
/// The average is `round((r + g + b) / 3)`; alpha is preserved.
pub fn duotone(input: ArrayView3<u8>, dark: Rgb, light: Rgb) -> Array3<u8> {
    let (_, width, _) = input.dim();
    let mut output = input.to_owned();
    let lut = duotone_lut(dark, light);

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .for_each(|mut row| {
            for x in 0..width {
                let sum = row[[x, 0]] as u32 + row[[x, 1]] as u32 + row[[x, 2]] as u32;
                let avg = clamp_round(sum as f32 / 3.0) as usize;
                for (c, v) in lut[avg].into_iter().enumerate() {
                    row[[x, c]] = v;
                }
            }
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> ToneCurve {
        ToneCurve::from_params(&FilterParameters::default())
    }

    #[test]
    fn test_gamma_one_is_identity() {
        let lut = gamma_lut(1.0);
        assert!(lut.iter().enumerate().all(|(i, &v)| v as usize == i));
    }

    #[test]
    fn test_gamma_brightens_midtones() {
        let lut = gamma_lut(2.2);
        assert_eq!(lut[0], 0);
        assert_eq!(lut[255], 255);
        assert!(lut[128] > 128);
    }

    #[test]
    fn test_posterize_levels() {
        let curve = ToneCurve { posterize: 19.0, ..neutral() };
        assert_eq!(curve.posterize_levels(), Some(2));
        let curve = ToneCurve { posterize: 15.0, ..neutral() };
        assert_eq!(curve.posterize_levels(), Some(5));
        assert_eq!(neutral().posterize_levels(), None);
    }

    #[test]
    fn test_posterize_two_levels() {
        assert_eq!(posterize_channel(127, 2), 0);
        assert_eq!(posterize_channel(128, 2), 255);
    }

    #[test]
    fn test_highlights_only_touch_bright_pixels() {
        let img = Array3::from_shape_fn((1, 2, 4), |(_, x, c)| if c == 3 { 255 } else if x == 0 { 40 } else { 200 });
        let curve = ToneCurve { highlights: 100.0, ..neutral() };
        let out = tone_curve(img.view(), &curve);
        assert_eq!(out[[0, 0, 0]], 40);
        assert!(out[[0, 1, 0]] > 200);
    }

    #[test]
    fn test_shadows_lift_dark_pixels() {
        let img = Array3::from_shape_fn((1, 1, 4), |(_, _, c)| if c == 3 { 255 } else { 50 });
        let curve = ToneCurve { shadows: 100.0, ..neutral() };
        let out = tone_curve(img.view(), &curve);
        // luminance ~0.196, factor ~1.608
        assert_eq!(out[[0, 0, 0]], 80);
    }

    #[test]
    fn test_vibrance_leaves_gray_untouched() {
        assert_eq!(vibrance_rgb([90, 90, 90], 200.0), [90, 90, 90]);
        let boosted = vibrance_rgb([120, 100, 100], 150.0);
        assert!(boosted[0] > 120);
        assert!(boosted[1] < 100);
    }

    #[test]
    fn test_duotone_red_is_one_third_gray() {
        let img = Array3::from_shape_fn((2, 2, 4), |(_, _, c)| [255, 0, 0, 255][c]);
        let out = duotone(img.view(), Rgb::BLACK, Rgb::WHITE);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!([out[[y, x, 0]], out[[y, x, 1]], out[[y, x, 2]], out[[y, x, 3]]], [85, 85, 85, 255]);
            }
        }
    }

    #[test]
    fn test_duotone_lut_endpoints() {
        let lut = duotone_lut(Rgb::new(34, 34, 34), Rgb::WHITE);
        assert_eq!(lut[0], [34, 34, 34]);
        assert_eq!(lut[255], [255, 255, 255]);
    }
}
