//! WebAssembly exports for the ImageStag FX pipeline.
//!
//! These functions are exposed to JavaScript via wasm-bindgen. Images cross
//! the boundary as flat RGBA byte arrays (length = width * height * 4) and
//! parameter snapshots as camelCase JSON. Random effects are seeded from
//! the browser's entropy source.

use wasm_bindgen::prelude::*;

use crate::bitmap::Bitmap;
use crate::export::ExportFormat;
use crate::params::FilterParameters;
use crate::pipeline::Renderer;

fn to_js(err: crate::Error) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn prepare(data: &[u8], width: usize, height: usize, params_json: &str) -> Result<(Bitmap, FilterParameters), JsValue> {
    let source = Bitmap::from_rgba(width, height, data.to_vec()).map_err(to_js)?;
    let params = if params_json.trim().is_empty() {
        FilterParameters::default()
    } else {
        FilterParameters::from_json_str(params_json).map_err(to_js)?
    };
    Ok((source, params))
}

// ============================================================================
// Render
// ============================================================================

/// Render an RGBA image.
///
/// # Arguments
/// * `data` - Flat array of RGBA bytes (length = width * height * 4)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
/// * `params_json` - Parameter snapshot; empty string for defaults
///
/// # Returns
/// Flat array of rendered RGBA bytes
#[wasm_bindgen]
pub fn render_rgba_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    params_json: &str,
) -> Result<Vec<u8>, JsValue> {
    let (source, params) = prepare(data, width, height, params_json)?;
    let rendered = Renderer::new().render(&source, &params).map_err(to_js)?;
    Ok(rendered.into_raw())
}

// ============================================================================
// Export
// ============================================================================

/// Render an RGBA image and encode it.
///
/// # Arguments
/// * `format` - `png`, `jpeg` or `webp`
///
/// # Returns
/// Encoded file bytes
#[wasm_bindgen]
pub fn render_encoded_wasm(
    data: &[u8],
    width: usize,
    height: usize,
    params_json: &str,
    format: &str,
) -> Result<Vec<u8>, JsValue> {
    let (source, params) = prepare(data, width, height, params_json)?;
    let format: ExportFormat = format.parse().map_err(to_js)?;
    Renderer::new()
        .render_and_encode(&source, &params, format)
        .map_err(to_js)
}
