//! Glitter particles.
//!
//! Particles are drawn onto a transparent overlay, the overlay is blurred,
//! and the result is screen-blended onto the canvas.
//!
//! ## Particles
//!
//! Count: `floor(W·H / 10000) · glitter / 100`, rounded up. Each particle
//! draws, in order: x, y, size `glitterSize·U(0.75, 1.25)`, opacity
//! `U(0.5, 1.0)` and rotation `U(0, 2π)`; its fill alpha is
//! `opacity · glitter / 100`.
//!
//! ## Shapes
//!
//! - **circle**: radius = size
//! - **star**: 5 spikes, inner radius 0.4·size
//! - **diamond**: corners at ±size on each axis
//! - **square**: side 2·size
//! - **heart**: two cubic Béziers at scale 1.5·size
//!
//! Paths are filled anti-aliased with tiny-skia, then the coverage becomes
//! the overlay's alpha.

use std::f32::consts::PI;

use ndarray::{Array3, ArrayView3};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Transform};

use crate::filters::core::{composite_layer, gaussian_blur, BlendMode, Composite};
use crate::params::{GlitterShape, Rgb};
use crate::random::RandomSource;

/// Glitter settings in slider units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitterOptions {
    /// Density and opacity 0-100.
    pub amount: f32,
    pub shape: GlitterShape,
    pub color: Rgb,
    /// Base particle size in pixels.
    pub size: f32,
    /// Overlay blur in pixels.
    pub blur: f32,
}

/// Number of particles for a canvas.
pub fn particle_count(width: usize, height: usize, amount: f32) -> usize {
    let base = ((width * height) / 10_000) as f32;
    (base * amount / 100.0).ceil().max(0.0) as usize
}

// ============================================================================
// Shape Paths
// ============================================================================

/// Path of one particle of the given size, centered on the origin.
///
/// Returns `None` for degenerate sizes.
pub fn particle_path(shape: GlitterShape, size: f32) -> Option<Path> {
    match shape {
        GlitterShape::Circle => PathBuilder::from_circle(0.0, 0.0, size),
        GlitterShape::Square => Some(PathBuilder::from_rect(Rect::from_xywh(-size, -size, size * 2.0, size * 2.0)?)),
        GlitterShape::Star => {
            let mut pb = PathBuilder::new();
            for i in 0..10 {
                let radius = if i % 2 == 0 { size } else { size * 0.4 };
                let a = i as f32 * PI / 5.0;
                let (x, y) = (a.cos() * radius, a.sin() * radius);
                if i == 0 {
                    pb.move_to(x, y);
                } else {
                    pb.line_to(x, y);
                }
            }
            pb.close();
            pb.finish()
        }
        GlitterShape::Diamond => {
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, -size);
            pb.line_to(size, 0.0);
            pb.line_to(0.0, size);
            pb.line_to(-size, 0.0);
            pb.close();
            pb.finish()
        }
        GlitterShape::Heart => {
            let h = size * 1.5;
            let mut pb = PathBuilder::new();
            pb.move_to(0.0, h);
            pb.cubic_to(-h, h * 0.4, -h, -h * 0.4, 0.0, -h * 0.4);
            pb.cubic_to(h, -h * 0.4, h, h * 0.4, 0.0, h);
            pb.close();
            pb.finish()
        }
    }
}

// ============================================================================
// Glitter
// ============================================================================

/// Scatter glitter over an RGBA image.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `options` - Glitter settings
/// * `rng` - Random source for placement
pub fn glitter(input: ArrayView3<u8>, options: &GlitterOptions, rng: &mut dyn RandomSource) -> Array3<u8> {
    let (height, width, _) = input.dim();
    if options.amount <= 0.0 || width == 0 || height == 0 {
        return input.to_owned();
    }
    let Some(mut pixmap) = Pixmap::new(width as u32, height as u32) else {
        return input.to_owned();
    };

    let Rgb { r, g, b } = options.color;
    let mut paint = Paint::default();
    paint.anti_alias = true;

    for _ in 0..particle_count(width, height, options.amount) {
        let x = rng.next_f32() * width as f32;
        let y = rng.next_f32() * height as f32;
        let size = options.size * rng.uniform(0.75, 1.25);
        let opacity = rng.uniform(0.5, 1.0);
        let rotation = rng.next_f32() * PI * 2.0;

        let Some(path) = particle_path(options.shape, size) else {
            continue;
        };
        let alpha = (opacity * options.amount / 100.0 * 255.0).round().clamp(0.0, 255.0) as u8;
        paint.set_color_rgba8(r, g, b, alpha);
        let transform = Transform::from_rotate(rotation.to_degrees()).post_translate(x, y);
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }

    // Every particle shares one color, so the pixmap's alpha is the
    // coverage. Transparent pixels carry the glitter color too, so blurring
    // straight alpha does not pull in black.
    let coverage = pixmap.data();
    let color = [r, g, b];
    let overlay = Array3::from_shape_fn((height, width, 4), |(y, x, c)| {
        if c == 3 {
            coverage[(y * width + x) * 4 + 3]
        } else {
            color[c]
        }
    });
    let overlay = gaussian_blur(overlay.view(), options.blur);

    composite_layer(input, overlay.view(), 1.0, Composite::SourceOver(BlendMode::Screen))
}
