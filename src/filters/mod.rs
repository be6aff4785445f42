//! Filter modules for the render pipeline.
//!
//! ## Supported Formats
//!
//! | Format | Shape | Type | Description |
//! |--------|-------|------|-------------|
//! | RGBA8 | (H, W, 4) | u8 | Straight-alpha red, green, blue, alpha, 0-255 |
//!
//! Every filter takes an `ArrayView3<u8>` and returns a new `Array3<u8>` of
//! the same dimensions.
//!
//! ## Architecture
//!
//! - **Pure** - Inputs are never mutated; neutral amounts return a copy
//! - **Rounded per pass** - Results are rounded and clamped to 0-255 after
//!   every weighted sum
//! - **Parallel rows** - Deterministic passes split rows across rayon;
//!   passes that draw random numbers run sequentially so a seeded source
//!   reproduces them
//!
//! ## Filter Categories
//!
//! - **Kernels**: gaussian_kernel, separable_convolve, resampling, compositing (`core.rs`)
//! - **Color**: CSS-style chain with exposure/temperature/tint gains (`color_adjust.rs`)
//! - **Tonal**: gamma, posterize, highlights, shadows, vibrance, duotone (`tone.rs`)
//! - **Spatial**: blur, sharpen, pixelate, flip, distortion
//! - **Retro**: VHS, scanlines, RGB shift, old film, glitch, noise

pub mod core;
pub mod color_adjust;
pub mod tone;
pub mod blur;
pub mod sharpen;
pub mod geometry;
pub mod distortion;
pub mod noise;
pub mod vhs;
pub mod stylize;
pub mod glitch;
