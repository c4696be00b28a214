//! Ruling-line detection with drift tolerance.
//!
//! Scanned forms are rarely perfectly axis-aligned: one physical ruling line
//! often drifts a few pixels up or down across the width of a block. A naive
//! per-row scan fragments such a line into short runs that never cross the
//! length threshold. The scans here follow an established run onto an
//! adjacent row (up to a maximum total drift) so a sloped line is reported
//! as one `Line`.

use crate::bitmap::Bitmap;
use crate::geometry::{Orientation, PixBox};
use crate::settings::GridSettings;

/// A detected ruling-line run.
///
/// For a horizontal line the bbox's x-extent is the run and the y-extent
/// records any drift; transposed for a vertical line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub bbox: PixBox,
    pub orientation: Orientation,
}

/// Effective minimum run length for a block dimension:
/// `max(min_line_px, dimension * line_ratio)`.
pub fn run_threshold(dimension: u32, settings: &GridSettings) -> u32 {
    let scaled = (f64::from(dimension) * settings.line_ratio) as u32;
    settings.min_line_px.max(scaled)
}

/// Detect horizontal ruling lines in a block bitmap.
///
/// Runs longer than `threshold` are reported, at most one per physical line:
/// a candidate overlapping or touching an already-reported line is the same
/// line traced from an adjacent starting row and is folded into it.
pub fn find_hlines(block: &Bitmap, threshold: u32, settings: &GridSettings) -> Vec<Line> {
    scan_rows(block, threshold, settings)
        .into_iter()
        .map(|bbox| Line {
            bbox,
            orientation: Orientation::Horizontal,
        })
        .collect()
}

/// Detect vertical ruling lines: the transpose of [`find_hlines`].
pub fn find_vlines(block: &Bitmap, threshold: u32, settings: &GridSettings) -> Vec<Line> {
    let transposed = Bitmap::from_fn(block.height(), block.width(), |x, y| block.get(y, x));
    scan_rows(&transposed, threshold, settings)
        .into_iter()
        .map(|b| Line {
            bbox: PixBox::new(b.y1, b.x1, b.y2, b.x2),
            orientation: Orientation::Vertical,
        })
        .collect()
}

/// Longest-run state for one starting row.
struct Run {
    start_x: u32,
    len: u32,
    end_ty: u32,
}

/// Row-scan core shared by both orientations.
fn scan_rows(block: &Bitmap, threshold: u32, settings: &GridSettings) -> Vec<PixBox> {
    let (w, h) = (block.width(), block.height());
    let mut found: Vec<PixBox> = Vec::new();

    for y in 0..h {
        let mut best: Option<Run> = None;
        let mut run: Option<Run> = None;
        // Tracked row: starts at y, nudged toward ink as the line drifts.
        let mut ty = y;

        for x in 0..w {
            if block.get(x, ty) {
                match run.as_mut() {
                    Some(r) => {
                        r.len += 1;
                        r.end_ty = ty;
                    }
                    None => {
                        run = Some(Run {
                            start_x: x,
                            len: 1,
                            end_ty: ty,
                        });
                    }
                }
                continue;
            }

            // Background ahead on the tracked row. An established run may
            // follow the line onto an adjacent row, within the drift cap.
            if let Some(r) = run.as_mut() {
                if r.len > settings.drift_min_run {
                    if let Some(t) = drift_target(block, x, ty, y, settings.max_line_drift) {
                        ty = t;
                        r.len += 1;
                        r.end_ty = ty;
                        continue;
                    }
                }
            }

            close_run(&mut run, &mut best);
            ty = y;
        }
        close_run(&mut run, &mut best);

        if let Some(r) = best {
            if r.len > threshold {
                let (top, bottom) = (y.min(r.end_ty), y.max(r.end_ty));
                let bbox = PixBox::new(r.start_x, top, r.start_x + r.len, bottom + 1);
                merge_or_push(&mut found, bbox);
            }
        }
    }
    found
}

/// Adjacent row carrying ink at column `x`, if following it keeps the total
/// drift from the starting row within `max_drift`.
fn drift_target(block: &Bitmap, x: u32, ty: u32, start_y: u32, max_drift: u32) -> Option<u32> {
    let up = ty.checked_sub(1);
    let down = if ty + 1 < block.height() {
        Some(ty + 1)
    } else {
        None
    };
    [up, down]
        .into_iter()
        .flatten()
        .find(|&t| block.get(x, t) && t.abs_diff(start_y) <= max_drift)
}

/// Fold a candidate run into an already-found line when they trace the same
/// physical line (x-extents overlap and y-extents overlap or touch, as for a
/// thick line scanned from each of its rows); otherwise record it as new.
fn merge_or_push(found: &mut Vec<PixBox>, bbox: PixBox) {
    let same_line = found
        .iter_mut()
        .find(|f| f.x_overlaps(&bbox) && bbox.y1 <= f.y2 && f.y1 <= bbox.y2);
    match same_line {
        Some(f) => {
            f.x1 = f.x1.min(bbox.x1);
            f.y1 = f.y1.min(bbox.y1);
            f.x2 = f.x2.max(bbox.x2);
            f.y2 = f.y2.max(bbox.y2);
        }
        None => found.push(bbox),
    }
}

fn close_run(run: &mut Option<Run>, best: &mut Option<Run>) {
    if let Some(r) = run.take() {
        let better = best.as_ref().map_or(true, |b| r.len > b.len);
        if better {
            *best = Some(r);
        }
    }
}
