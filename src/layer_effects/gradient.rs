//! Linear gradient light effects: light leak and prism light.
//!
//! Both fill the canvas with a linear gradient and screen-blend it. Pixels
//! are sampled at their centers; positions beyond either end of the gradient
//! line take the color of the nearest end stop.

use ndarray::{Array3, ArrayView3};

use crate::filters::core::{composite_fill, interpolate_gradient, linear_gradient_t, BlendMode, Composite, GradientStop};
use crate::params::Rgb;

/// Prism rainbow: red, orange, yellow, green, blue, violet.
pub const PRISM_COLORS: [Rgb; 6] = [
    Rgb::new(255, 0, 0),
    Rgb::new(255, 165, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(0, 0, 255),
    Rgb::new(238, 130, 238),
];

/// Screen a linear gradient from `start` to `end` over the image.
pub fn screen_linear_gradient(
    input: ArrayView3<u8>,
    start: (f32, f32),
    end: (f32, f32),
    stops: &[GradientStop],
) -> Array3<u8> {
    composite_fill(input, Composite::SourceOver(BlendMode::Screen), |x, y| {
        let t = linear_gradient_t(x as f32 + 0.5, y as f32 + 0.5, start, end);
        interpolate_gradient(stops, t)
    })
}

/// Light leak.
///
/// The gradient runs from the top-left corner to `(W·cos θ, H·sin θ)` with
/// alpha `leak/200`, `leak/400`, `leak/200` at 0, 0.5 and 1.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `amount` - Leak strength 0-100
/// * `color` - Leak color
/// * `direction` - Angle in degrees
pub fn light_leak(input: ArrayView3<u8>, amount: f32, color: Rgb, direction: f32) -> Array3<u8> {
    let (height, width, _) = input.dim();
    if amount <= 0.0 {
        return input.to_owned();
    }

    let (sin, cos) = direction.to_radians().sin_cos();
    let end = (width as f32 * cos, height as f32 * sin);
    let rgb = color.to_unit();
    let stops = [
        GradientStop::new(0.0, rgb, amount / 200.0),
        GradientStop::new(0.5, rgb, amount / 400.0),
        GradientStop::new(1.0, rgb, amount / 200.0),
    ];

    screen_linear_gradient(input, (0.0, 0.0), end, &stops)
}

/// Prism light.
///
/// A six-stop rainbow along a line through the center spanning
/// `±(W·cos θ, H·sin θ)`. Every stop has alpha
/// `amount/100 · (0.5 + spread/200)`.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `amount` - Strength 0-100
/// * `angle` - Angle in degrees
/// * `spread` - Spread 0-100
pub fn prism_light(input: ArrayView3<u8>, amount: f32, angle: f32, spread: f32) -> Array3<u8> {
    let (height, width, _) = input.dim();
    if amount <= 0.0 {
        return input.to_owned();
    }

    let (w, h) = (width as f32, height as f32);
    let (sin, cos) = angle.to_radians().sin_cos();
    let start = (w / 2.0 - cos * w, h / 2.0 - sin * h);
    let end = (w / 2.0 + cos * w, h / 2.0 + sin * h);

    let alpha = amount / 100.0 * (0.5 + spread / 100.0 * 0.5);
    let stops: Vec<GradientStop> = PRISM_COLORS
        .iter()
        .enumerate()
        .map(|(i, color)| GradientStop::new(i as f32 * 0.2, color.to_unit(), alpha))
        .collect();

    screen_linear_gradient(input, start, end, &stops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(h: usize, w: usize, v: u8) -> Array3<u8> {
        Array3::from_shape_fn((h, w, 4), |(_, _, c)| if c == 3 { 255 } else { v })
    }

    #[test]
    fn test_light_leak_strongest_at_ends() {
        let img = solid(1, 101, 0);
        // Direction 0: gradient runs left to right across the full width.
        let out = light_leak(img.view(), 100.0, Rgb::WHITE, 0.0);
        let left = out[[0, 0, 0]];
        let middle = out[[0, 50, 0]];
        let right = out[[0, 100, 0]];
        assert!(left > middle);
        assert!(right > middle);
        assert!((left as i32 - 127).abs() <= 2);
        assert!((middle as i32 - 64).abs() <= 2);
    }

    #[test]
    fn test_light_leak_never_darkens() {
        let img = Array3::from_shape_fn((10, 10, 4), |(y, x, c)| if c == 3 { 255 } else { (x * 20 + y) as u8 });
        let out = light_leak(img.view(), 70.0, Rgb::new(255, 150, 50), 45.0);
        assert!(out.iter().zip(img.iter()).all(|(a, b)| a >= b));
    }

    #[test]
    fn test_prism_starts_red_and_ends_violet() {
        let img = solid(1, 200, 0);
        let out = prism_light(img.view(), 100.0, 0.0, 100.0);
        // Line spans x = -100..300; x = 0 is t = 0.25 (orange-yellow), x = 199 near t = 0.75.
        assert!(out[[0, 0, 0]] > 200);
        assert!(out[[0, 199, 2]] > out[[0, 199, 0]]);
    }

    #[test]
    fn test_zero_amount_is_copy() {
        let img = solid(3, 3, 90);
        assert_eq!(prism_light(img.view(), 0.0, 30.0, 50.0), img);
        assert_eq!(light_leak(img.view(), 0.0, Rgb::WHITE, 30.0), img);
    }
}
