//! Image encoding: `DynamicImage` → PNG bytes for the calibration preview.
//!
//! PNG is lossless; the preview exists so a person can read the name on
//! the certificate, and JPEG artefacts around small glyphs get in the way.

use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// File extension of calibration previews.
pub const PREVIEW_EXTENSION: &str = "png";

/// Encode a rasterised page as PNG.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!("Encoded {}x{} preview → {} bytes", img.width(), img.height(), buf.len());
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn encode_small_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([255, 0, 0, 255])));
        let png = encode_png(&img).expect("encode should succeed");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).expect("valid PNG");
        assert_eq!(decoded.width(), 10);
    }
}
