//! Render orchestration.
//!
//! [`RENDER_ORDER`] lists every [`Stage`] in the order it runs. A render
//! takes a source [`Bitmap`] and a [`FilterParameters`] snapshot, clamps the
//! snapshot into its domain, and threads one working buffer through each
//! enabled stage. Stages sample the cumulative result of everything before
//! them, never the original source.
//!
//! ## Supersession
//!
//! [`RenderTarget`] holds the displayed result. Each render into it takes a
//! ticket; a render abandons between stages as soon as a newer ticket
//! exists and only commits while it is still the newest.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ndarray::{Array3, ArrayView3};
use parking_lot::Mutex;
use tracing::{debug, debug_span, info, trace, warn};

use crate::bitmap::{Bitmap, MAX_DIMENSION};
use crate::error::{Error, Result};
use crate::export::{encode, ExportFormat};
use crate::filters::color_adjust::{color_filter, ColorFilter};
use crate::filters::core::{composite_layer, BlendMode, Composite};
use crate::filters::tone::{duotone, tone_curve, ToneCurve};
use crate::filters::{blur, distortion, geometry, glitch, noise, sharpen, stylize, vhs};
use crate::layer_effects::glitter::{glitter, GlitterOptions};
use crate::layer_effects::glow::{glow, GlowOptions};
use crate::layer_effects::{gradient, overlay, vignette};
use crate::params::FilterParameters;
use crate::random::{entropy_source, seeded_source, RandomSource};

// ============================================================================
// Stages
// ============================================================================

/// One step of the render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ColorFilter,
    Blur,
    Sharpen,
    Pixelate,
    Flip,
    ExposureOverlay,
    TemperatureTint,
    Glow,
    Glitter,
    Vhs,
    RgbShift,
    OldFilm,
    Glitch,
    Distortion,
    LightLeak,
    PrismLight,
    ToneCurve,
    Noise,
    Duotone,
    Vignette,
}

/// Every stage, in application order.
pub const RENDER_ORDER: [Stage; 20] = [
    Stage::ColorFilter,
    Stage::Blur,
    Stage::Sharpen,
    Stage::Pixelate,
    Stage::Flip,
    Stage::ExposureOverlay,
    Stage::TemperatureTint,
    Stage::Glow,
    Stage::Glitter,
    Stage::Vhs,
    Stage::RgbShift,
    Stage::OldFilm,
    Stage::Glitch,
    Stage::Distortion,
    Stage::LightLeak,
    Stage::PrismLight,
    Stage::ToneCurve,
    Stage::Noise,
    Stage::Duotone,
    Stage::Vignette,
];

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::ColorFilter => "color-filter",
            Stage::Blur => "blur",
            Stage::Sharpen => "sharpen",
            Stage::Pixelate => "pixelate",
            Stage::Flip => "flip",
            Stage::ExposureOverlay => "exposure-overlay",
            Stage::TemperatureTint => "temperature-tint",
            Stage::Glow => "glow",
            Stage::Glitter => "glitter",
            Stage::Vhs => "vhs",
            Stage::RgbShift => "rgb-shift",
            Stage::OldFilm => "old-film",
            Stage::Glitch => "glitch",
            Stage::Distortion => "distortion",
            Stage::LightLeak => "light-leak",
            Stage::PrismLight => "prism-light",
            Stage::ToneCurve => "tone-curve",
            Stage::Noise => "noise",
            Stage::Duotone => "duotone",
            Stage::Vignette => "vignette",
        }
    }

    /// Whether the stage changes anything for these parameters.
    pub fn is_enabled(self, p: &FilterParameters) -> bool {
        match self {
            Stage::ColorFilter => !ColorFilter::from_params(p).is_identity(),
            Stage::Blur => p.blur > 0.0,
            Stage::Sharpen => p.sharpen > 0.0,
            Stage::Pixelate => p.pixelate > 0.0,
            Stage::Flip => p.flip_horizontal || p.flip_vertical,
            Stage::ExposureOverlay => p.exposure > 100.0,
            Stage::TemperatureTint => p.temperature != 0.0 || p.tint != 0.0,
            Stage::Glow => p.glow > 0.0,
            Stage::Glitter => p.glitter > 0.0,
            Stage::Vhs => p.vhs > 0.0 || p.scanlines > 0.0,
            Stage::RgbShift => p.rgb_shift > 0.0,
            Stage::OldFilm => p.old_film > 0.0,
            Stage::Glitch => p.glitch > 0.0,
            Stage::Distortion => p.distortion > 0.0,
            Stage::LightLeak => p.light_leak > 0.0,
            Stage::PrismLight => p.prism_light > 0.0,
            Stage::ToneCurve => !ToneCurve::from_params(p).is_identity(),
            Stage::Noise => p.noise > 0.0,
            Stage::Duotone => p.duotone,
            Stage::Vignette => p.vignette > 0.0,
        }
    }

    /// Run the stage on `input`, returning a new buffer.
    ///
    /// Without blur the color-filtered image is drawn over the unfiltered
    /// one, so opacity blends toward the source instead of exposing
    /// transparency. With blur the filtered layer replaces the canvas.
    pub fn apply(self, input: ArrayView3<u8>, p: &FilterParameters, rng: &mut dyn RandomSource) -> Array3<u8> {
        match self {
            Stage::ColorFilter => {
                let filtered = color_filter(input, &ColorFilter::from_params(p));
                if p.blur > 0.0 {
                    // The blur stage works on the filtered layer alone.
                    filtered
                } else {
                    composite_layer(input, filtered.view(), 1.0, Composite::SourceOver(BlendMode::Normal))
                }
            }
            Stage::Blur => blur::blur(input, p.blur),
            Stage::Sharpen => sharpen::sharpen(input, p.sharpen),
            Stage::Pixelate => geometry::pixelate(input, p.pixelate),
            Stage::Flip => geometry::flip(input, p.flip_horizontal, p.flip_vertical),
            Stage::ExposureOverlay => overlay::exposure_overlay(input, p.exposure),
            Stage::TemperatureTint => overlay::temperature_tint_overlay(input, p.temperature, p.tint),
            Stage::Glow => glow(
                input,
                &GlowOptions {
                    glow: p.glow,
                    radius: p.glow_radius,
                    intensity: p.glow_intensity,
                },
            ),
            Stage::Glitter => glitter(
                input,
                &GlitterOptions {
                    amount: p.glitter,
                    shape: p.glitter_shape,
                    color: p.glitter_color,
                    size: p.glitter_size,
                    blur: p.glitter_blur,
                },
                rng,
            ),
            Stage::Vhs => vhs::vhs(input, p.vhs, p.scanlines, rng),
            Stage::RgbShift => stylize::rgb_shift(input, p.rgb_shift),
            Stage::OldFilm => stylize::old_film(input, p.old_film),
            Stage::Glitch => glitch::glitch(input, p.glitch, rng),
            Stage::Distortion => distortion::distort(input, p.distortion_type, p.distortion),
            Stage::LightLeak => gradient::light_leak(input, p.light_leak, p.light_leak_color, p.light_leak_direction),
            Stage::PrismLight => gradient::prism_light(input, p.prism_light, p.prism_light_angle, p.prism_light_spread),
            Stage::ToneCurve => tone_curve(input, &ToneCurve::from_params(p)),
            Stage::Noise => noise::add_noise(input, p.noise, rng),
            Stage::Duotone => {
                let [dark, light] = p.duotone_colors;
                duotone(input, dark, light)
            }
            Stage::Vignette => vignette::vignette(input, p.vignette),
        }
    }
}

/// Names of the stages that would run for `params`, in order.
pub fn enabled_stages(params: &FilterParameters) -> Vec<Stage> {
    let params = params.sanitized();
    RENDER_ORDER.into_iter().filter(|s| s.is_enabled(&params)).collect()
}

// ============================================================================
// Render Target
// ============================================================================

#[derive(Debug)]
struct Committed {
    ticket: u64,
    bitmap: Bitmap,
}

/// Shared output slot that only ever shows the newest render.
#[derive(Debug, Default)]
pub struct RenderTarget {
    latest: AtomicU64,
    committed: Mutex<Option<Committed>>,
}

impl RenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new render. Older tickets become stale.
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// True while no newer render has been requested.
    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::Acquire) == ticket
    }

    /// Store `bitmap` if `ticket` is still the newest.
    fn commit(&self, ticket: u64, bitmap: Bitmap) -> bool {
        let mut slot = self.committed.lock();
        if !self.is_current(ticket) || slot.as_ref().is_some_and(|c| c.ticket > ticket) {
            return false;
        }
        *slot = Some(Committed { ticket, bitmap });
        true
    }

    /// Copy of the displayed bitmap, if any render has committed.
    pub fn snapshot(&self) -> Option<Bitmap> {
        self.committed.lock().as_ref().map(|c| c.bitmap.clone())
    }

    /// Ticket of the displayed bitmap.
    pub fn committed_ticket(&self) -> Option<u64> {
        self.committed.lock().as_ref().map(|c| c.ticket)
    }
}

// ============================================================================
// Renderer
// ============================================================================

/// Runs the pipeline with an owned random source.
pub struct Renderer {
    rng: Box<dyn RandomSource + Send>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer").finish_non_exhaustive()
    }
}

impl Renderer {
    /// Renderer with an OS-seeded generator.
    pub fn new() -> Self {
        Self::with_random_source(Box::new(entropy_source()))
    }

    /// Renderer whose random effects repeat for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::with_random_source(Box::new(seeded_source(seed)))
    }

    pub fn with_random_source(rng: Box<dyn RandomSource + Send>) -> Self {
        Renderer { rng }
    }

    /// Render `source` with `params`.
    ///
    /// Returns an empty bitmap for an empty source and
    /// [`Error::ImageTooLarge`] for sources beyond the canvas limit.
    pub fn render(&mut self, source: &Bitmap, params: &FilterParameters) -> Result<Bitmap> {
        match self.run(source, params, || false)? {
            Some(bitmap) => Ok(bitmap),
            None => Ok(source.clone()),
        }
    }

    /// Render and encode in one call.
    pub fn render_and_encode(
        &mut self,
        source: &Bitmap,
        params: &FilterParameters,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        let rendered = self.render(source, params)?;
        encode(&rendered, format)
    }

    /// Render, encode, and write `edited-image.<ext>` into `dir`.
    pub fn export(
        &mut self,
        source: &Bitmap,
        params: &FilterParameters,
        format: ExportFormat,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let bytes = self.render_and_encode(source, params, format)?;
        let path = dir.as_ref().join(format.file_name());
        std::fs::write(&path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), %format, "exported image");
        Ok(path)
    }

    /// Render into a shared target, giving way to newer requests.
    ///
    /// Returns `true` if this render's result was committed.
    pub fn render_into(&mut self, source: &Bitmap, params: &FilterParameters, target: &RenderTarget) -> Result<bool> {
        let ticket = target.begin();
        let Some(bitmap) = self.run(source, params, || !target.is_current(ticket))? else {
            warn!(ticket, "render superseded before completion");
            return Ok(false);
        };

        let committed = target.commit(ticket, bitmap);
        if !committed {
            warn!(ticket, "render superseded, result discarded");
        }
        Ok(committed)
    }

    /// Run every enabled stage. `None` means `cancelled` fired between stages.
    fn run<F>(&mut self, source: &Bitmap, params: &FilterParameters, cancelled: F) -> Result<Option<Bitmap>>
    where
        F: Fn() -> bool,
    {
        let (width, height) = (source.width(), source.height());
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Error::ImageTooLarge { width, height, max: MAX_DIMENSION });
        }

        let span = debug_span!("render", width, height);
        let _enter = span.enter();

        if source.is_empty() {
            debug!("empty source, nothing to render");
            return Ok(Some(source.clone()));
        }

        let params = params.sanitized();
        let started = Instant::now();
        let mut canvas = source.pixels().clone();

        for stage in RENDER_ORDER {
            if cancelled() {
                return Ok(None);
            }
            if !stage.is_enabled(&params) {
                trace!(stage = stage.name(), "skipped");
                continue;
            }
            let stage_started = Instant::now();
            canvas = stage.apply(canvas.view(), &params, self.rng.as_mut());
            debug!(
                stage = stage.name(),
                elapsed_ms = stage_started.elapsed().as_secs_f64() * 1000.0,
                "applied"
            );
        }

        debug!(elapsed_ms = started.elapsed().as_secs_f64() * 1000.0, "render complete");
        Bitmap::from_array(canvas).map(Some)
    }
}

/// Render with a fresh OS-seeded renderer.
pub fn render(source: &Bitmap, params: &FilterParameters) -> Result<Bitmap> {
    Renderer::new().render(source, params)
}

/// Render and encode with a fresh OS-seeded renderer.
pub fn render_and_encode(source: &Bitmap, params: &FilterParameters, format: ExportFormat) -> Result<Vec<u8>> {
    Renderer::new().render_and_encode(source, params, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_order_is_complete_and_unique() {
        let mut names: Vec<&str> = RENDER_ORDER.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RENDER_ORDER.len());
        assert_eq!(RENDER_ORDER[0], Stage::ColorFilter);
        assert_eq!(RENDER_ORDER[RENDER_ORDER.len() - 1], Stage::Vignette);
    }

    #[test]
    fn test_defaults_enable_nothing() {
        assert!(enabled_stages(&FilterParameters::default()).is_empty());
    }

    #[test]
    fn test_enabled_stages_follow_order() {
        let params = FilterParameters {
            vignette: 10.0,
            blur: 5.0,
            glitch: 20.0,
            brightness: 120.0,
            ..Default::default()
        };
        assert_eq!(
            enabled_stages(&params),
            vec![Stage::ColorFilter, Stage::Blur, Stage::Glitch, Stage::Vignette]
        );
    }

    #[test]
    fn test_out_of_domain_values_are_clamped_not_rejected() {
        let params = FilterParameters { blur: -50.0, gamma: 0.0, ..Default::default() };
        let src = Bitmap::filled(6, 6, [100, 100, 100, 255]);
        let out = Renderer::seeded(1).render(&src, &params).unwrap();
        assert_eq!((out.width(), out.height()), (6, 6));
    }

    #[test]
    fn test_opacity_without_blur_blends_over_source() {
        let src = Bitmap::filled(4, 4, [200, 100, 50, 255]);
        let mut renderer = Renderer::seeded(0);

        let faded = FilterParameters { opacity: 50.0, ..Default::default() };
        assert_eq!(renderer.render(&src, &faded).unwrap().pixel(1, 1), [200, 100, 50, 255]);

        let sepia_only = FilterParameters { sepia: 100.0, ..Default::default() };
        let full = renderer.render(&src, &sepia_only).unwrap().pixel(1, 1);
        let half = FilterParameters { sepia: 100.0, opacity: 50.0, ..Default::default() };
        let mixed = renderer.render(&src, &half).unwrap().pixel(1, 1);

        assert_eq!(mixed[3], 255);
        for c in 0..3 {
            let expected = (full[c] as f32 + src.pixel(1, 1)[c] as f32) / 2.0;
            assert!((mixed[c] as f32 - expected).abs() <= 1.5, "channel {c}: {mixed:?}");
        }
    }

    #[test]
    fn test_opacity_with_blur_exposes_transparency() {
        let src = Bitmap::filled(8, 8, [200, 100, 50, 255]);
        let params = FilterParameters { opacity: 50.0, blur: 10.0, ..Default::default() };
        let out = Renderer::seeded(0).render(&src, &params).unwrap();
        let alpha = out.pixel(4, 4)[3];
        assert!((127..=129).contains(&alpha), "alpha {alpha}");
    }

    #[test]
    fn test_too_large_source_fails_whole_render() {
        let src = Bitmap::new(MAX_DIMENSION + 1, 1);
        let err = Renderer::seeded(1).render(&src, &FilterParameters::default()).unwrap_err();
        assert!(matches!(err, Error::ImageTooLarge { .. }));
    }

    #[test]
    fn test_stale_ticket_cannot_commit() {
        let target = RenderTarget::new();
        let old = target.begin();
        let new = target.begin();
        assert!(!target.is_current(old));
        assert!(target.commit(new, Bitmap::filled(1, 1, [1, 2, 3, 4])));
        assert!(!target.commit(old, Bitmap::filled(1, 1, [9, 9, 9, 9])));
        assert_eq!(target.snapshot().unwrap().pixel(0, 0), [1, 2, 3, 4]);
        assert_eq!(target.committed_ticket(), Some(new));
    }
}
