//! Compositing effects layered over the working canvas.
//!
//! ## Fill Overlays
//! - **Exposure** - White drawn `source-atop` (`overlay.rs`)
//! - **Temperature/Tint** - Soft-light color fill (`overlay.rs`)
//!
//! ## Light Effects
//! - **Glow** - Blurred, brightened copy added back (`glow.rs`)
//! - **Light Leak** - Three-stop linear gradient, screen (`gradient.rs`)
//! - **Prism Light** - Six-stop rainbow gradient, screen (`gradient.rs`)
//!
//! ## Particles
//! - **Glitter** - Scattered shapes on a blurred overlay, screen (`glitter.rs`)
//!
//! ## Finishing
//! - **Vignette** - Radial black multiply (`vignette.rs`)
//!
//! ## Layer Effects vs Filters
//!
//! Filters rewrite pixels from their neighbourhood. Layer effects build a
//! source (a fill, a gradient, an overlay buffer) and composite it onto the
//! canvas with a blend mode and opacity, never changing the canvas size.

pub mod overlay;
pub mod glow;
pub mod glitter;
pub mod gradient;
pub mod vignette;
