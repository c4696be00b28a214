//! Block segmentation: split a page into vertically-separated table regions.

use crate::bitmap::Bitmap;
use crate::geometry::PixBox;
use crate::settings::GridSettings;

/// A row or column with at most this many ink pixels is treated as blank
/// when trimming margins and detecting separator runs. Absorbs specks of
/// scan noise on otherwise white paper.
const CONTENT_THRESHOLD: u64 = 6;

/// Split a page bitmap into table blocks, top to bottom.
///
/// The printed content's horizontal extent is found by trimming leading and
/// trailing low-ink columns. Within that extent, runs of blank rows at least
/// `settings.min_gap` tall separate blocks. A blank run touching the top of
/// the page is margin and produces no leading block. An all-white page
/// yields no blocks.
pub fn find_blocks(page: &Bitmap, settings: &GridSettings) -> Vec<PixBox> {
    let (w, h) = (page.width(), page.height());
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let col_ink = |x: u32| (0..h).filter(|&y| page.get(x, y)).count() as u64;

    let mut minx = 0;
    while minx < w && col_ink(minx) <= CONTENT_THRESHOLD {
        minx += 1;
    }
    if minx == w {
        // No column carries content.
        return Vec::new();
    }
    let mut maxx = w - 1;
    while maxx > minx && col_ink(maxx) <= CONTENT_THRESHOLD {
        maxx -= 1;
    }
    let maxx = maxx + 1; // exclusive right edge of the content span

    let row_is_black = |y: u32| {
        (minx..maxx).filter(|&x| page.get(x, y)).count() as u64 > CONTENT_THRESHOLD
    };

    // Collapse consecutive blank rows into half-open white runs.
    let mut white_runs: Vec<(u32, u32)> = Vec::new();
    let mut run_start: Option<u32> = None;
    for y in 0..h {
        if row_is_black(y) {
            if let Some(start) = run_start.take() {
                white_runs.push((start, y));
            }
        } else if run_start.is_none() {
            run_start = Some(y);
        }
    }
    if let Some(start) = run_start {
        white_runs.push((start, h));
    }

    // A white run at the very top is page margin, not a separator.
    let mut y0 = 0;
    let mut runs = white_runs.as_slice();
    if let Some(&(0, end)) = runs.first() {
        y0 = end;
        runs = &runs[1..];
    }

    let mut blocks = Vec::new();
    for &(start, end) in runs.iter().filter(|&&(s, e)| e - s >= settings.min_gap) {
        if start > y0 {
            blocks.push(PixBox::new(minx, y0, maxx, start));
        }
        y0 = end;
    }
    if h - y0 > settings.min_gap {
        blocks.push(PixBox::new(minx, y0, maxx, h));
    }
    blocks
}
