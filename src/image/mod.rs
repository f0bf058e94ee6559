//! Image optimization.
//!
//! # Modules
//!
//! - [`raster`]: PNG / JPEG re-encoding
//! - [`svg`]: SVG minification as an XML event pass
//!
//! Every optimizer keeps whichever of the original and the re-encoded bytes
//! is smaller, so running it twice never grows a file.

pub mod raster;
pub mod svg;

/// Format-specific optimizer selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimizer {
    Png,
    Jpeg { quality: u8 },
    Svg,
    /// Copied through unchanged (gif, webp, ico, ...)
    Copy,
}

impl Optimizer {
    pub fn for_extension(ext: &str, jpeg_quality: u8) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg {
                quality: jpeg_quality,
            },
            "svg" => Self::Svg,
            _ => Self::Copy,
        }
    }

    /// Whether results are worth caching.
    pub const fn is_cacheable(self) -> bool {
        !matches!(self, Self::Copy)
    }

    /// Settings other than the source bytes that change the output.
    pub fn settings(self) -> Vec<u8> {
        match self {
            Self::Jpeg { quality } => vec![quality],
            _ => Vec::new(),
        }
    }

    pub fn optimize(self, bytes: &[u8]) -> Result<Vec<u8>, String> {
        let optimized = match self {
            Self::Png => raster::reencode_png(bytes)?,
            Self::Jpeg { quality } => raster::reencode_jpeg(bytes, quality)?,
            Self::Svg => svg::minify_svg(bytes)?,
            Self::Copy => return Ok(bytes.to_vec()),
        };
        Ok(smaller(bytes, optimized))
    }
}

fn smaller(original: &[u8], optimized: Vec<u8>) -> Vec<u8> {
    if optimized.len() < original.len() {
        optimized
    } else {
        original.to_vec()
    }
}
