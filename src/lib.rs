//! ImageStag FX
//!
//! Raster filter pipeline for a photo editor: a fixed sequence of color,
//! tonal, spatial, retro and light effects applied to an RGBA bitmap, with
//! export to PNG, JPEG or WebP. Python bindings via PyO3 and WASM bindings
//! for JavaScript are available behind the `python` and `wasm` features.
//!
//! ## Image Format
//! - **RGBA**: (height, width, 4) - straight alpha, `u8` per channel
//!
//! ## Pipeline
//! A render clamps the [`FilterParameters`] snapshot, then runs every
//! enabled [`Stage`] of [`RENDER_ORDER`] on a working copy of the source.
//! Stochastic stages draw from the renderer's [`RandomSource`], so a seeded
//! [`Renderer`] reproduces its output exactly.
//!
//! ```no_run
//! use imagestag_fx::{Bitmap, ExportFormat, FilterParameters, Renderer};
//!
//! let source = Bitmap::open("photo.png")?;
//! let params = FilterParameters { sepia: 60.0, vignette: 40.0, ..Default::default() };
//! let png = Renderer::seeded(7).render_and_encode(&source, &params, ExportFormat::Png)?;
//! # Ok::<(), imagestag_fx::Error>(())
//! ```

pub mod bitmap;
pub mod error;
pub mod export;
pub mod filters;
pub mod layer_effects;
pub mod params;
pub mod pipeline;
pub mod random;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use bitmap::Bitmap;
pub use error::{Error, Result};
pub use export::{encode, ExportFormat};
pub use params::{DistortionType, FilterParameters, GlitterShape, Rgb};
pub use pipeline::{enabled_stages, render, render_and_encode, RenderTarget, Renderer, Stage, RENDER_ORDER};
pub use random::RandomSource;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::PyValueError;
    use pyo3::prelude::*;

    use crate::bitmap::Bitmap;
    use crate::export::ExportFormat;
    use crate::params::FilterParameters;
    use crate::pipeline::Renderer;

    fn to_py_err(err: crate::Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }

    fn parse_params(params_json: Option<&str>) -> PyResult<FilterParameters> {
        match params_json {
            Some(text) => FilterParameters::from_json_str(text).map_err(to_py_err),
            None => Ok(FilterParameters::default()),
        }
    }

    fn renderer(seed: Option<u64>) -> Renderer {
        seed.map_or_else(Renderer::new, Renderer::seeded)
    }

    // ========================================================================
    // Render
    // ========================================================================

    /// Render an RGBA u8 image with the given parameters.
    ///
    /// # Arguments
    /// * `image` - RGBA array (height, width, 4)
    /// * `params_json` - Parameter snapshot as camelCase JSON; defaults when omitted
    /// * `seed` - Seed for the stochastic effects; OS entropy when omitted
    ///
    /// # Returns
    /// Rendered RGBA array of the same shape
    #[pyfunction]
    #[pyo3(signature = (image, params_json=None, seed=None))]
    pub fn render<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        params_json: Option<&str>,
        seed: Option<u64>,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let params = parse_params(params_json)?;
        let source = Bitmap::from_array(image.as_array().to_owned()).map_err(to_py_err)?;
        let result = py
            .allow_threads(|| renderer(seed).render(&source, &params))
            .map_err(to_py_err)?;
        Ok(result.into_array().into_pyarray(py))
    }

    /// Render and encode to PNG, JPEG or WebP bytes.
    #[pyfunction]
    #[pyo3(signature = (image, format="png", params_json=None, seed=None))]
    pub fn render_encoded<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        format: &str,
        params_json: Option<&str>,
        seed: Option<u64>,
    ) -> PyResult<Vec<u8>> {
        let params = parse_params(params_json)?;
        let format: ExportFormat = format.parse().map_err(to_py_err)?;
        let source = Bitmap::from_array(image.as_array().to_owned()).map_err(to_py_err)?;
        py.allow_threads(|| renderer(seed).render_and_encode(&source, &params, format))
            .map_err(to_py_err)
    }

    /// Python module definition
    #[pymodule]
    pub fn imagestag_fx(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(render, m)?)?;
        m.add_function(wrap_pyfunction!(render_encoded, m)?)?;
        Ok(())
    }
}
