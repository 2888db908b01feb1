//! Image codec boundary

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat};

use crate::Result;

pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

/// Encode in `format`. JPEG has no alpha channel, so RGBA input is flattened
/// to RGB first.
pub fn encode(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut cursor = Cursor::new(&mut output);

    if format == ImageFormat::Jpeg && image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8()).write_to(&mut cursor, format)?;
    } else {
        image.write_to(&mut cursor, format)?;
    }

    Ok(output)
}

pub fn load(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Output format from the file extension, PNG when unknown
pub fn format_for_path(path: &Path) -> ImageFormat {
    ImageFormat::from_path(path).unwrap_or(ImageFormat::Png)
}

/// Encode by extension and write, creating parent directories
pub fn save(image: &DynamicImage, path: &Path) -> Result<Vec<u8>> {
    let bytes = encode(image, format_for_path(path))?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, &bytes)?;
    log::info!("[Codec] wrote {} bytes to {}", bytes.len(), path.display());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_png_is_lossless() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(9, 7, |x, y| Rgb([x as u8, y as u8, 42])));
        let bytes = encode(&img, ImageFormat::Png).unwrap();
        assert_eq!(decode(&bytes).unwrap(), img);
    }

    #[test]
    fn test_jpeg_drops_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([10, 20, 30, 128])));
        let bytes = encode(&img, ImageFormat::Jpeg).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode(b"definitely not an image").is_err());
    }

    #[test]
    fn test_format_for_path() {
        assert_eq!(format_for_path(Path::new("a/b.jpg")), ImageFormat::Jpeg);
        assert_eq!(format_for_path(Path::new("a/b.PNG")), ImageFormat::Png);
        assert_eq!(format_for_path(Path::new("a/b.unknown")), ImageFormat::Png);
        assert_eq!(format_for_path(Path::new("noext")), ImageFormat::Png);
    }

    #[test]
    fn test_save_creates_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        let bytes = save(&img, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
        assert_eq!(load(&path).unwrap(), img);
    }
}
