//! Conversions between on-disk page images and the ink bitmaps the grid
//! algorithms work on.

use std::path::Path;

use gridocr_core::Bitmap;
use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::close;

use crate::error::PipelineError;

/// Luma threshold separating paper from ink. Scans of these documents are
/// high-contrast; anything darker than this is treated as ink.
pub const INK_THRESHOLD: u8 = 200;

/// Binarize a grayscale image: pixels darker than [`INK_THRESHOLD`] become
/// ink, everything else paper.
pub fn binarize(img: &GrayImage) -> Bitmap {
    Bitmap::from_fn(img.width(), img.height(), |x, y| {
        img.get_pixel(x, y).0[0] < INK_THRESHOLD
    })
}

/// Render a bitmap back to a grayscale image (ink black, paper white), the
/// form the OCR engine and debug dumps consume.
pub fn to_gray(bitmap: &Bitmap) -> GrayImage {
    GrayImage::from_fn(bitmap.width(), bitmap.height(), |x, y| {
        if bitmap.get(x, y) {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}

/// Load a page image from disk and binarize it.
pub fn load_binarized(path: &Path) -> Result<Bitmap, PipelineError> {
    let img = image::open(path)?.into_luma8();
    Ok(binarize(&img))
}

/// Morphological close over the ink channel with a 3x3 structuring element,
/// bridging single-pixel gaps so speckle merges into solid strokes the OCR
/// engine can reject or read.
///
/// `imageproc` closes the *white* channel, so the image is inverted around
/// the operation.
pub fn close_ink(bitmap: &Bitmap) -> Bitmap {
    if bitmap.width() == 0 || bitmap.height() == 0 {
        return bitmap.clone();
    }
    let inverted = GrayImage::from_fn(bitmap.width(), bitmap.height(), |x, y| {
        if bitmap.get(x, y) {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    let closed = close(&inverted, Norm::LInf, 1);
    Bitmap::from_fn(bitmap.width(), bitmap.height(), |x, y| {
        closed.get_pixel(x, y).0[0] > 0
    })
}
