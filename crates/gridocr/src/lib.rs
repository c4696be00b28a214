//! Grid-based cell OCR for scanned tabular documents.
//!
//! Japanese political-funding disclosures are published as scanned,
//! image-only PDFs of ruled tables. This crate turns such a PDF into a
//! stream of positioned, OCRed table-cell segments:
//!
//! 1. extract each page's scan with `pdfimages` ([`rasterize`]);
//! 2. binarize and find the table blocks, ruling lines, and cell grid
//!    (the [`gridocr_core`] algorithms);
//! 3. OCR each non-empty cell with Tesseract, retrying through a staged
//!    ladder for stubborn cells ([`ocr`]);
//! 4. submit each cell as a segment to the review store, skipping segments
//!    it already holds ([`store`], [`pipeline`]).
//!
//! # Example
//! ```no_run
//! use gridocr::{MemoryStore, PdfImages, Pipeline, PipelineOptions, Tesseract};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), gridocr::PipelineError> {
//! let rasterizer = PdfImages;
//! let engine = Tesseract::default();
//! let store = MemoryStore::new(42);
//! let pipeline = Pipeline::new(&rasterizer, &engine, &store, PipelineOptions::default());
//! let summary = pipeline.process_document(42, Path::new("r2345.pdf"))?;
//! println!("{} segments", summary.submitted);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod imaging;
pub mod ocr;
pub mod pipeline;
pub mod rasterize;
pub mod store;

pub use error::PipelineError;
pub use ocr::{OcrEngine, SegmentationMode, Tesseract, ocr_cell};
pub use pipeline::{BlockGeometry, PageGeometry, Pipeline, PipelineOptions, RunSummary, page_geometry};
pub use rasterize::{PageImage, PdfImages, Rasterizer};
pub use store::{DocumentInfo, HttpStore, MemoryStore, Segment, SegmentKey, SegmentStore, StoredSegment};

#[cfg(feature = "parallel")]
pub use pipeline::process_documents;

// Re-export the core types callers need to tune extraction.
pub use gridocr_core::{Bitmap, CellContent, GridSettings, PixBox};
