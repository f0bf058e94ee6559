//! Lossless PNG recompression and JPEG re-encoding via the `image` crate.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};

fn decode(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage, String> {
    image::load_from_memory_with_format(bytes, format).map_err(|e| e.to_string())
}

/// Re-encode a PNG with maximum deflate effort.
pub fn reencode_png(bytes: &[u8]) -> Result<Vec<u8>, String> {
    let img = decode(bytes, ImageFormat::Png)?;
    encode_png(&img)
}

/// Encode any image as PNG with maximum deflate effort.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder).map_err(|e| e.to_string())?;
    Ok(out)
}

/// Re-encode a JPEG at `quality` (1-100).
pub fn reencode_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, String> {
    let img = decode(bytes, ImageFormat::Jpeg)?;
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    rgb.write_with_encoder(encoder).map_err(|e| e.to_string())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, Rgba, RgbaImage};

    #[test]
    fn test_reencode_png_roundtrips_pixels() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 255]));
        let png = encode_png(&DynamicImage::ImageRgba8(img.clone())).unwrap();

        let again = reencode_png(&png).unwrap();
        let decoded = image::load_from_memory(&again).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_reencode_jpeg() {
        let img: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(32, 32, |x, y| Rgb([(x * 8) as u8, (y * 8) as u8, 128]));
        let mut original = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_with_encoder(JpegEncoder::new_with_quality(&mut original, 100))
            .unwrap();

        let out = reencode_jpeg(&original, 50).unwrap();
        assert!(out.starts_with(&[0xFF, 0xD8]));
        assert!(out.len() < original.len());
    }

    #[test]
    fn test_invalid_data_is_error() {
        assert!(reencode_png(b"not a png").is_err());
        assert!(reencode_jpeg(b"not a jpeg", 70).is_err());
    }
}
