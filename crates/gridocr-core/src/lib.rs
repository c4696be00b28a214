//! gridocr-core: I/O-free data types and algorithms for table-grid recovery.
//!
//! This crate provides the foundational types (`PixBox`, `Bitmap`, `Line`) and
//! the pure algorithms of the extraction pipeline: block segmentation,
//! drift-tolerant ruling-line detection, row/column derivation, and cell
//! analysis (edge erosion, emptiness, noise classification). External
//! processes, files, and the network live in the `gridocr` crate.

mod bitmap;
mod blocks;
mod cell;
mod geometry;
mod grid;
mod lines;
mod settings;

pub use bitmap::Bitmap;
pub use blocks::find_blocks;
pub use cell::{CellContent, analyze_cell};
pub use geometry::{Orientation, PixBox};
pub use grid::{cell_grid, columns_from_lines, rows_from_lines};
pub use lines::{Line, find_hlines, find_vlines, run_threshold};
pub use settings::GridSettings;
