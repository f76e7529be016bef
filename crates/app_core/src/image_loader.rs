//! Image decoding backend

use crate::AppError;
use image::{DynamicImage, GenericImageView, ImageReader, RgbaImage};
use rayon::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh3::xxh3_64;

/// Turns a file into a decoded image
///
/// The prefetch cache is generic over this so background decode jobs can be
/// driven by any backend.
pub trait ImageDecoder: Send + Sync + 'static {
    type Image: Send + Sync + 'static;

    fn decode(&self, path: &Path) -> Result<Self::Image, AppError>;
}

/// Decoded RGBA8 bitmap
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    /// xxh3 of the encoded source bytes
    pub hash: u64,
}

impl LoadedImage {
    /// Resident size of the pixel buffer
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }
}

/// Raster decoder built on the `image` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder {
    max_dimension: Option<u32>,
}

impl RasterDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Downscale results so neither side exceeds `max` pixels
    pub fn with_max_dimension(max: Option<u32>) -> Self {
        Self {
            max_dimension: max.filter(|m| *m > 0),
        }
    }
}

impl ImageDecoder for RasterDecoder {
    type Image = LoadedImage;

    fn decode(&self, path: &Path) -> Result<LoadedImage, AppError> {
        tracing::debug!("Loading image: {}", path.display());

        let data = std::fs::read(path)?;
        decode_with_bound(path.to_path_buf(), &data, self.max_dimension)
    }
}

/// Decode an in-memory image, e.g. a member read out of an archive
pub fn decode_bytes(name: &str, bytes: &[u8], max_dimension: Option<u32>) -> Result<LoadedImage, AppError> {
    decode_with_bound(PathBuf::from(name), bytes, max_dimension)
}

fn decode_with_bound(path: PathBuf, bytes: &[u8], max_dimension: Option<u32>) -> Result<LoadedImage, AppError> {
    let img = decode_dynamic(bytes)?;

    let img = match max_dimension {
        Some(max) => {
            let (w, h) = img.dimensions();
            if w > max || h > max {
                img.thumbnail(max, max)
            } else {
                img
            }
        }
        None => img,
    };

    Ok(into_loaded(path, img, xxh3_64(bytes)))
}

/// Photoshop document signature
const PSD_MAGIC: &[u8] = b"8BPS";

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, AppError> {
    if bytes.starts_with(PSD_MAGIC) {
        return decode_psd(bytes);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| AppError::ImageDecode(e.to_string()))?;

    if reader.format().is_none() {
        return Err(AppError::UnsupportedFormat("unrecognized image data".into()));
    }

    Ok(reader.decode()?)
}

/// Flattened composite of a layered document
fn decode_psd(bytes: &[u8]) -> Result<DynamicImage, AppError> {
    let psd = psd::Psd::from_bytes(bytes).map_err(|e| AppError::ImageDecode(format!("PSD: {}", e)))?;

    RgbaImage::from_raw(psd.width(), psd.height(), psd.rgba())
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(|| AppError::ImageDecode("PSD composite does not match its dimensions".into()))
}

fn into_loaded(path: PathBuf, img: DynamicImage, hash: u64) -> LoadedImage {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    LoadedImage {
        path,
        width,
        height,
        data: rgba.into_raw(),
        hash,
    }
}

/// Thumbnail generator
pub struct ThumbnailGenerator {
    size: u32,
}

impl ThumbnailGenerator {
    pub fn new(size: u32) -> Self {
        Self { size: size.max(1) }
    }

    /// Generate thumbnail for an image file
    pub fn generate(&self, path: &Path) -> Result<LoadedImage, AppError> {
        let data = std::fs::read(path)?;
        self.generate_from_bytes(path, &data)
    }

    /// Generate thumbnail from encoded bytes already in memory
    pub fn generate_from_bytes(&self, path: &Path, data: &[u8]) -> Result<LoadedImage, AppError> {
        let img = decode_dynamic(data)?;
        let thumb = img.thumbnail(self.size, self.size);
        Ok(into_loaded(path.to_path_buf(), thumb, xxh3_64(data)))
    }

    /// Generate thumbnails for multiple files in parallel
    pub fn generate_batch(&self, paths: &[&Path]) -> Vec<Result<LoadedImage, AppError>> {
        paths.par_iter().map(|path| self.generate(path)).collect()
    }
}

/// Check if a file is a supported image format
pub fn is_supported_image(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            matches!(
                e.to_lowercase().as_str(),
                "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tif" | "tiff" | "ico" | "psd"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use tempfile::TempDir;

    /// Encode a solid-colour PNG of the given size
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba([200, 40, 40, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// Single-layer RGB Photoshop document with raw image data
    fn psd_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"8BPS");
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&[0; 6]);
        out.extend_from_slice(&3u16.to_be_bytes());
        out.extend_from_slice(&height.to_be_bytes());
        out.extend_from_slice(&width.to_be_bytes());
        out.extend_from_slice(&8u16.to_be_bytes());
        out.extend_from_slice(&3u16.to_be_bytes());
        // Colour mode data, image resources, layer and mask info
        for _ in 0..3 {
            out.extend_from_slice(&0u32.to_be_bytes());
        }
        // Raw planar channels
        out.extend_from_slice(&0u16.to_be_bytes());
        for value in rgb {
            out.extend(std::iter::repeat(value).take((width * height) as usize));
        }
        out
    }

    #[test]
    fn test_psd_composite() {
        let img = decode_bytes("cover.psd", &psd_bytes(3, 2, [10, 20, 30]), None).unwrap();
        assert_eq!((img.width, img.height), (3, 2));
        assert_eq!(&img.data[..4], &[10, 20, 30, 255]);

        let bound = decode_bytes("cover.psd", &psd_bytes(40, 20, [1, 2, 3]), Some(10)).unwrap();
        assert_eq!((bound.width, bound.height), (10, 5));
    }

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image(Path::new("test.jpg")));
        assert!(is_supported_image(Path::new("test.PNG")));
        assert!(is_supported_image(Path::new("test.WebP")));
        assert!(is_supported_image("page01.bmp"));
        assert!(is_supported_image("scan.TIFF"));
        assert!(is_supported_image("layers.psd"));
        assert!(!is_supported_image(Path::new("test.txt")));
        assert!(!is_supported_image(Path::new("test.mp4")));
        assert!(!is_supported_image(Path::new("png")));
    }

    #[test]
    fn test_raster_decoder_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("red.png");
        let bytes = png_bytes(4, 3);
        std::fs::write(&path, &bytes).unwrap();

        let img = RasterDecoder::new().decode(&path).unwrap();
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(img.byte_len(), 4 * 3 * 4);
        assert_eq!(img.hash, xxh3_64(&bytes));
        assert_eq!(img.path, path);
    }

    #[test]
    fn test_max_dimension_downscales() {
        let img = decode_bytes("big.png", &png_bytes(64, 32), Some(16)).unwrap();
        assert!(img.width <= 16 && img.height <= 16);
        assert_eq!(img.width, 16);

        let small = decode_bytes("small.png", &png_bytes(8, 8), Some(16)).unwrap();
        assert_eq!((small.width, small.height), (8, 8));
    }

    #[test]
    fn test_decode_failures() {
        assert!(matches!(
            decode_bytes("notes.png", b"not an image", None),
            Err(AppError::UnsupportedFormat(_))
        ));

        let dir = TempDir::new().unwrap();
        assert!(matches!(
            RasterDecoder::new().decode(&dir.path().join("missing.png")),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn test_thumbnail_batch() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("a.png");
        let bad = dir.path().join("b.png");
        std::fs::write(&good, png_bytes(100, 50)).unwrap();
        std::fs::write(&bad, b"garbage").unwrap();

        let results = ThumbnailGenerator::new(20).generate_batch(&[&good, &bad]);
        assert_eq!(results.len(), 2);
        let thumb = results[0].as_ref().unwrap();
        assert_eq!((thumb.width, thumb.height), (20, 10));
        assert!(results[1].is_err());
    }
}
