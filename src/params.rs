//! The parameter snapshot consumed by a single render.
//!
//! Field names serialize in camelCase so the snapshot matches the JSON
//! the editor's parameter store produces. Files may omit fields; the
//! missing ones take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An RGB color triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Channels normalized to 0.0-1.0.
    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// Particle outline used by the glitter effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlitterShape {
    #[default]
    Circle,
    Star,
    Diamond,
    Square,
    Heart,
}

/// Coordinate remapping applied by the distortion effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistortionType {
    #[default]
    Swirl,
    Squeeze,
    Wave,
    Ripple,
    Vortex,
    Pixelate,
    Twist,
    Zigzag,
    Spiral,
    Bulge,
}

/// Complete set of filter controls for one render.
///
/// Slider values use the editor's native units (mostly percentages).
/// See [`FilterParameters::sanitized`] for the accepted domain of each field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterParameters {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub exposure: f32,
    pub blur: f32,
    pub hue_rotate: f32,
    pub invert: f32,
    pub sepia: f32,
    pub grayscale: f32,
    pub opacity: f32,
    pub temperature: f32,
    pub tint: f32,
    pub vibrance: f32,
    pub highlights: f32,
    pub shadows: f32,
    pub sharpen: f32,
    pub noise: f32,
    pub pixelate: f32,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    pub vignette: f32,
    pub gamma: f32,
    pub posterize: f32,
    pub duotone: bool,
    pub duotone_colors: [Rgb; 2],
    pub glow: f32,
    pub glow_radius: f32,
    pub glow_intensity: f32,
    pub glitter: f32,
    pub glitter_shape: GlitterShape,
    pub glitter_color: Rgb,
    pub glitter_size: f32,
    pub glitter_blur: f32,
    pub vhs: f32,
    pub scanlines: f32,
    pub rgb_shift: f32,
    pub old_film: f32,
    pub light_leak: f32,
    pub light_leak_color: Rgb,
    pub light_leak_direction: f32,
    pub light_leak_intensity: f32,
    pub prism_light: f32,
    pub prism_light_angle: f32,
    pub prism_light_spread: f32,
    pub distortion: f32,
    pub distortion_type: DistortionType,
    pub distortion_intensity: f32,
    pub glitch: f32,
    pub glitch_intensity: f32,
    pub glitch_speed: f32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        FilterParameters {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            exposure: 100.0,
            blur: 0.0,
            hue_rotate: 0.0,
            invert: 0.0,
            sepia: 0.0,
            grayscale: 0.0,
            opacity: 100.0,
            temperature: 0.0,
            tint: 0.0,
            vibrance: 100.0,
            highlights: 0.0,
            shadows: 0.0,
            sharpen: 0.0,
            noise: 0.0,
            pixelate: 0.0,
            flip_horizontal: false,
            flip_vertical: false,
            vignette: 0.0,
            gamma: 1.0,
            posterize: 0.0,
            duotone: false,
            duotone_colors: [Rgb::new(34, 34, 34), Rgb::WHITE],
            glow: 0.0,
            glow_radius: 0.0,
            glow_intensity: 0.0,
            glitter: 0.0,
            glitter_shape: GlitterShape::Circle,
            glitter_color: Rgb::WHITE,
            glitter_size: 3.0,
            glitter_blur: 0.5,
            vhs: 0.0,
            scanlines: 0.0,
            rgb_shift: 0.0,
            old_film: 0.0,
            light_leak: 0.0,
            light_leak_color: Rgb::new(255, 150, 50),
            light_leak_direction: 45.0,
            light_leak_intensity: 0.0,
            prism_light: 0.0,
            prism_light_angle: 0.0,
            prism_light_spread: 0.0,
            distortion: 0.0,
            distortion_type: DistortionType::Swirl,
            distortion_intensity: 50.0,
            glitch: 0.0,
            glitch_intensity: 50.0,
            glitch_speed: 50.0,
        }
    }
}

/// Clamp into `[min, max]`, replacing NaN with `fallback`.
#[inline]
fn bounded(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

impl FilterParameters {
    /// Parse a YAML snapshot.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse a JSON snapshot.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load a snapshot file. `.json` files are parsed as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Copy with every numeric field clamped into its documented domain.
    ///
    /// Out-of-range values snap to the nearest bound and NaN falls back to
    /// the field default, so the pipeline never divides by a degenerate
    /// sigma or block size.
    pub fn sanitized(&self) -> Self {
        let d = FilterParameters::default();
        FilterParameters {
            brightness: bounded(self.brightness, 0.0, 200.0, d.brightness),
            contrast: bounded(self.contrast, 0.0, 200.0, d.contrast),
            saturation: bounded(self.saturation, 0.0, 200.0, d.saturation),
            exposure: bounded(self.exposure, 0.0, 200.0, d.exposure),
            blur: bounded(self.blur, 0.0, 100.0, d.blur),
            hue_rotate: bounded(self.hue_rotate, 0.0, 360.0, d.hue_rotate),
            invert: bounded(self.invert, 0.0, 100.0, d.invert),
            sepia: bounded(self.sepia, 0.0, 100.0, d.sepia),
            grayscale: bounded(self.grayscale, 0.0, 100.0, d.grayscale),
            opacity: bounded(self.opacity, 0.0, 100.0, d.opacity),
            temperature: bounded(self.temperature, -100.0, 100.0, d.temperature),
            tint: bounded(self.tint, -100.0, 100.0, d.tint),
            vibrance: bounded(self.vibrance, 0.0, 200.0, d.vibrance),
            highlights: bounded(self.highlights, -100.0, 100.0, d.highlights),
            shadows: bounded(self.shadows, -100.0, 100.0, d.shadows),
            sharpen: bounded(self.sharpen, 0.0, 100.0, d.sharpen),
            noise: bounded(self.noise, 0.0, 100.0, d.noise),
            pixelate: bounded(self.pixelate, 0.0, 100.0, d.pixelate),
            flip_horizontal: self.flip_horizontal,
            flip_vertical: self.flip_vertical,
            vignette: bounded(self.vignette, 0.0, 100.0, d.vignette),
            gamma: bounded(self.gamma, 0.1, 2.2, d.gamma),
            posterize: bounded(self.posterize, 0.0, 20.0, d.posterize),
            duotone: self.duotone,
            duotone_colors: self.duotone_colors,
            glow: bounded(self.glow, 0.0, 100.0, d.glow),
            glow_radius: bounded(self.glow_radius, 0.0, 50.0, d.glow_radius),
            glow_intensity: bounded(self.glow_intensity, 0.0, 100.0, d.glow_intensity),
            glitter: bounded(self.glitter, 0.0, 100.0, d.glitter),
            glitter_shape: self.glitter_shape,
            glitter_color: self.glitter_color,
            glitter_size: bounded(self.glitter_size, 1.0, 20.0, d.glitter_size),
            glitter_blur: bounded(self.glitter_blur, 0.0, 10.0, d.glitter_blur),
            vhs: bounded(self.vhs, 0.0, 100.0, d.vhs),
            scanlines: bounded(self.scanlines, 0.0, 100.0, d.scanlines),
            rgb_shift: bounded(self.rgb_shift, 0.0, 100.0, d.rgb_shift),
            old_film: bounded(self.old_film, 0.0, 100.0, d.old_film),
            light_leak: bounded(self.light_leak, 0.0, 100.0, d.light_leak),
            light_leak_color: self.light_leak_color,
            light_leak_direction: bounded(self.light_leak_direction, 0.0, 360.0, d.light_leak_direction),
            light_leak_intensity: bounded(self.light_leak_intensity, 0.0, 100.0, d.light_leak_intensity),
            prism_light: bounded(self.prism_light, 0.0, 100.0, d.prism_light),
            prism_light_angle: bounded(self.prism_light_angle, 0.0, 360.0, d.prism_light_angle),
            prism_light_spread: bounded(self.prism_light_spread, 0.0, 100.0, d.prism_light_spread),
            distortion: bounded(self.distortion, 0.0, 100.0, d.distortion),
            distortion_type: self.distortion_type,
            distortion_intensity: bounded(self.distortion_intensity, 0.0, 100.0, d.distortion_intensity),
            glitch: bounded(self.glitch, 0.0, 100.0, d.glitch),
            glitch_intensity: bounded(self.glitch_intensity, 0.0, 100.0, d.glitch_intensity),
            glitch_speed: bounded(self.glitch_speed, 0.0, 100.0, d.glitch_speed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps_out_of_range() {
        let params = FilterParameters {
            blur: -20.0,
            gamma: 0.0,
            temperature: 500.0,
            posterize: f32::NAN,
            ..Default::default()
        };

        let clean = params.sanitized();

        assert_eq!(clean.blur, 0.0);
        assert!((clean.gamma - 0.1).abs() < 1e-6);
        assert_eq!(clean.temperature, 100.0);
        assert_eq!(clean.posterize, 0.0);
    }

    #[test]
    fn test_defaults_are_already_sanitized() {
        let d = FilterParameters::default();
        assert_eq!(d.sanitized(), d);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
blur: 12
glitterShape: heart
distortionType: zigzag
duotoneColors:
  - { r: 0, g: 0, b: 0 }
  - { r: 255, g: 0, b: 0 }
"#;
        let params = FilterParameters::from_yaml_str(yaml).unwrap();

        assert_eq!(params.blur, 12.0);
        assert_eq!(params.glitter_shape, GlitterShape::Heart);
        assert_eq!(params.distortion_type, DistortionType::Zigzag);
        assert_eq!(params.duotone_colors[1], Rgb::new(255, 0, 0));
        assert_eq!(params.brightness, 100.0);
    }

    #[test]
    fn test_json_uses_camel_case() {
        let params = FilterParameters::from_json_str(r#"{"hueRotate": 90, "flipHorizontal": true}"#).unwrap();
        assert_eq!(params.hue_rotate, 90.0);
        assert!(params.flip_horizontal);
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        assert!(FilterParameters::from_json_str(r#"{"glitterShape": "hexagon"}"#).is_err());
    }
}
