//! Opaque masking of image regions

use aadhaar_ocr::Rect;
use image::{DynamicImage, GenericImageView, Rgba};
use imageproc::drawing::draw_filled_rect_mut;

use crate::{CoreError, Result};

/// Fills rectangles with a solid opaque colour.
///
/// The input image is never modified; every call returns a new image in the
/// same pixel format. Rectangles are validated before any pixel is written,
/// so a bad rectangle never yields a half-masked image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redactor {
    color: [u8; 3],
}

impl Default for Redactor {
    fn default() -> Self {
        Self { color: [0, 0, 0] }
    }
}

impl Redactor {
    pub fn with_color(color: [u8; 3]) -> Self {
        Self { color }
    }

    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    /// Mask a single rectangle
    pub fn redact(&self, image: &DynamicImage, rect: Rect) -> Result<DynamicImage> {
        self.redact_all(image, &[rect])
    }

    /// Mask every rectangle in one output image
    pub fn redact_all(&self, image: &DynamicImage, rects: &[Rect]) -> Result<DynamicImage> {
        if rects.is_empty() {
            return Err(CoreError::EmptyMask);
        }

        let (width, height) = image.dimensions();
        let targets = rects
            .iter()
            .map(|rect| to_draw_rect(*rect, width, height))
            .collect::<Result<Vec<_>>>()?;

        let [r, g, b] = self.color;
        let fill = Rgba([r, g, b, 255]);

        let mut out = image.clone();
        for (rect, target) in rects.iter().zip(targets) {
            draw_filled_rect_mut(&mut out, target, fill);
            log::debug!("[Redact] filled {}", rect);
        }

        log::info!("[Redact] masked {} region(s) on {}x{} image", rects.len(), width, height);
        Ok(out)
    }
}

/// Bounds check, no clipping
fn to_draw_rect(rect: Rect, width: u32, height: u32) -> Result<imageproc::rect::Rect> {
    let invalid = || CoreError::InvalidRectangle {
        rect,
        image_width: width,
        image_height: height,
    };

    if rect.is_empty() || !rect.fits_within(width, height) {
        return Err(invalid());
    }

    let x = i32::try_from(rect.x).map_err(|_| invalid())?;
    let y = i32::try_from(rect.y).map_err(|_| invalid())?;
    Ok(imageproc::rect::Rect::at(x, y).of_size(rect.width, rect.height))
}
