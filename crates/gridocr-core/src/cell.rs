//! Per-cell content analysis: edge erosion, emptiness, noise detection.

use crate::bitmap::Bitmap;
use crate::settings::GridSettings;

/// Outcome of analyzing one cell's pixels.
#[derive(Debug, Clone)]
pub struct CellContent {
    /// The cell with ruling-line fragments eroded off its edges.
    pub eroded: Bitmap,
    /// True when the cell holds too little foreground to be worth OCR.
    pub is_empty: bool,
    /// True when the ink:paper ratio is so balanced the cell is likely
    /// dominated by speckle or bleed-through rather than glyphs.
    pub maybe_noisy: bool,
}

/// Analyze one cell bitmap.
///
/// The dominant color is taken as background (more ink than paper means
/// white-on-black, as some scanners deliver). Edges are eroded up to
/// `edge_erode` pixels deep per side to strip fragments of the ruling
/// lines that bounded the cell; erosion on each sweep stops at the first
/// background pixel so real content touching the edge survives. A cell is
/// empty when fewer than `min_filled_px` foreground pixels remain.
pub fn analyze_cell(cell: &Bitmap, settings: &GridSettings) -> CellContent {
    let area = u64::from(cell.width()) * u64::from(cell.height());
    if area == 0 {
        return CellContent {
            eroded: cell.clone(),
            is_empty: true,
            maybe_noisy: false,
        };
    }

    let ink = cell.ink_count();
    let paper = area - ink;
    let bg_is_ink = ink > paper;

    let maybe_noisy = if ink == 0 || paper == 0 {
        false
    } else {
        let ratio = ink as f64 / paper as f64;
        (1.0 / settings.noise_ratio..=settings.noise_ratio).contains(&ratio)
    };

    let eroded = erode_edges(cell, bg_is_ink, settings.edge_erode);

    let bg_count = if bg_is_ink {
        eroded.ink_count()
    } else {
        let area = u64::from(eroded.width()) * u64::from(eroded.height());
        area - eroded.ink_count()
    };
    let is_empty = bg_count + u64::from(settings.min_filled_px) >= area;

    CellContent {
        eroded,
        is_empty,
        maybe_noisy,
    }
}

/// Clear foreground pixels inward from all four edges, at most `depth`
/// deep, stopping each sweep at the first background pixel.
fn erode_edges(cell: &Bitmap, bg_is_ink: bool, depth: u32) -> Bitmap {
    let (w, h) = (cell.width(), cell.height());
    let mut out = cell.clone();
    let bg = bg_is_ink;

    let xd = depth.min(w);
    let yd = depth.min(h);

    for y in 0..h {
        // left edge, sweeping right
        for x in 0..xd {
            if out.get(x, y) == bg {
                break;
            }
            out.set(x, y, bg);
        }
        // right edge, sweeping left
        for x in (w - xd..w).rev() {
            if out.get(x, y) == bg {
                break;
            }
            out.set(x, y, bg);
        }
    }
    for x in 0..w {
        for y in 0..yd {
            if out.get(x, y) == bg {
                break;
            }
            out.set(x, y, bg);
        }
        for y in (h - yd..h).rev() {
            if out.get(x, y) == bg {
                break;
            }
            out.set(x, y, bg);
        }
    }
    out
}
