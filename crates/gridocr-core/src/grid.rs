//! Row/column derivation and the cell grid.
//!
//! Rows and columns are bounded by the midpoints of consecutive ruling
//! lines, so a line's own thickness is split evenly between the cell on
//! either side rather than biasing one neighbor. The block edges bound the
//! first and last row/column.

use crate::geometry::PixBox;
use crate::lines::Line;

/// Derive column boxes (block-local) from vertical lines.
///
/// With no lines at all the whole block is one column. Columns narrower
/// than `min_col_width` are discarded.
pub fn columns_from_lines(
    vlines: &[Line],
    block_w: u32,
    block_h: u32,
    min_col_width: u32,
) -> Vec<PixBox> {
    let mut mids: Vec<u32> = vlines.iter().map(|l| l.bbox.x_mid()).collect();
    spans_from_mids(&mut mids, block_w)
        .into_iter()
        .filter(|&(a, b)| b - a >= min_col_width)
        .map(|(a, b)| PixBox::new(a, 0, b, block_h))
        .collect()
}

/// Derive row boxes (block-local) from horizontal lines.
///
/// Symmetric with [`columns_from_lines`], filtering on `min_row_height`.
pub fn rows_from_lines(
    hlines: &[Line],
    block_w: u32,
    block_h: u32,
    min_row_height: u32,
) -> Vec<PixBox> {
    let mut mids: Vec<u32> = hlines.iter().map(|l| l.bbox.y_mid()).collect();
    spans_from_mids(&mut mids, block_h)
        .into_iter()
        .filter(|&(a, b)| b - a >= min_row_height)
        .map(|(a, b)| PixBox::new(0, a, block_w, b))
        .collect()
}

/// Split `[0, extent)` at the sorted midpoints, keeping non-degenerate spans.
fn spans_from_mids(mids: &mut Vec<u32>, extent: u32) -> Vec<(u32, u32)> {
    if mids.is_empty() {
        return vec![(0, extent)];
    }
    mids.sort_unstable();
    let mut bounds = Vec::with_capacity(mids.len() + 2);
    bounds.push(0);
    bounds.extend(mids.iter().copied().filter(|&m| m <= extent));
    bounds.push(extent);
    bounds
        .windows(2)
        .filter(|w| w[1] > w[0])
        .map(|w| (w[0], w[1]))
        .collect()
}

/// The row-major grid of cell boxes: one cell per (row, column) pair, each
/// cell being the intersection of its row's y-extent and its column's
/// x-extent.
pub fn cell_grid(rows: &[PixBox], cols: &[PixBox]) -> Vec<Vec<PixBox>> {
    rows.iter()
        .map(|row| {
            cols.iter()
                .map(|col| PixBox::new(col.x1, row.y1, col.x2, row.y2))
                .collect()
        })
        .collect()
}
