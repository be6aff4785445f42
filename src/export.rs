//! Encoding rendered bitmaps for export.
//!
//! ## Supported Formats
//!
//! | Format | Extension | Encoding |
//! |--------|-----------|----------|
//! | png | `.png` | Lossless RGBA |
//! | jpeg | `.jpeg` | Quality 92, alpha flattened onto black |
//! | webp | `.webp` | Lossless RGBA |

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::error::{Error, Result};

/// JPEG quality used for export.
pub const JPEG_QUALITY: u8 = 92;

/// Base name of exported files.
pub const EXPORT_STEM: &str = "edited-image";

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Webp => "image/webp",
        }
    }

    /// `edited-image.<ext>`
    pub fn file_name(self) -> String {
        format!("{EXPORT_STEM}.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::Webp),
            other => Err(Error::UnknownFormat(other.to_string())),
        }
    }
}

/// Drop alpha by compositing over black.
fn flatten_on_black(bitmap: &Bitmap) -> RgbImage {
    let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
    let pixels = bitmap.pixels();
    RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let a = pixels[[y, x, 3]] as u32;
        let channel = |c: usize| ((pixels[[y, x, c]] as u32 * a + 127) / 255) as u8;
        image::Rgb([channel(0), channel(1), channel(2)])
    })
}

/// Encode a bitmap. An empty bitmap encodes to no bytes.
pub fn encode(bitmap: &Bitmap, format: ExportFormat) -> Result<Vec<u8>> {
    if bitmap.is_empty() {
        return Ok(Vec::new());
    }
    let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
    let mut out = Cursor::new(Vec::new());
    let wrap = |source| Error::Encode { format: format.extension(), source };

    match format {
        ExportFormat::Png => {
            let rgba = bitmap.to_image();
            PngEncoder::new(&mut out)
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(wrap)?;
        }
        ExportFormat::Jpeg => {
            let rgb = flatten_on_black(bitmap);
            JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(wrap)?;
        }
        ExportFormat::Webp => {
            let rgba = bitmap.to_image();
            WebPEncoder::new_lossless(&mut out)
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(wrap)?;
        }
    }

    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Bitmap {
        let mut bmp = Bitmap::filled(5, 4, [10, 120, 240, 255]);
        bmp.set_pixel(1, 2, [255, 0, 0, 128]);
        bmp
    }

    #[test]
    fn test_parse_formats() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("webp".parse::<ExportFormat>().unwrap(), ExportFormat::Webp);
        assert!(matches!("tiff".parse::<ExportFormat>(), Err(Error::UnknownFormat(_))));
    }

    #[test]
    fn test_file_name_and_mime() {
        assert_eq!(ExportFormat::Jpeg.file_name(), "edited-image.jpeg");
        assert_eq!(ExportFormat::Webp.mime_type(), "image/webp");
    }

    #[test]
    fn test_png_round_trip_is_lossless() {
        let bmp = sample();
        let bytes = encode(&bmp, ExportFormat::Png).unwrap();
        assert_eq!(Bitmap::decode(&bytes).unwrap(), bmp);
    }

    #[test]
    fn test_webp_round_trip_is_lossless() {
        let bmp = sample();
        let bytes = encode(&bmp, ExportFormat::Webp).unwrap();
        assert_eq!(Bitmap::decode(&bytes).unwrap(), bmp);
    }

    #[test]
    fn test_empty_bitmap_encodes_to_nothing() {
        for format in [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::Webp] {
            assert!(encode(&Bitmap::new(0, 0), format).unwrap().is_empty(), "{format}");
            assert!(encode(&Bitmap::new(3, 0), format).unwrap().is_empty(), "{format}");
        }
    }

    #[test]
    fn test_jpeg_decodes_opaque() {
        let bytes = encode(&sample(), ExportFormat::Jpeg).unwrap();
        let back = Bitmap::decode(&bytes).unwrap();
        assert_eq!((back.width(), back.height()), (5, 4));
        assert_eq!(back.pixel(0, 0)[3], 255);
    }
}
