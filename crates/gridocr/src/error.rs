//! Error types for the extraction pipeline.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Everything the
//! pipeline can fail on funnels into [`PipelineError`].

use thiserror::Error;

/// Error type for pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The page rasterizer (external `pdfimages` binary) failed.
    #[error("rasterize error: {0}")]
    Rasterize(String),

    /// Error reading or writing files on disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error decoding or encoding a page image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The OCR engine could not be run at all. Unreadable cells are not
    /// errors; they come back as empty text.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// The segment store rejected a request or could not be reached.
    #[error("store error: {0}")]
    Store(String),

    /// The store has no document under the requested id.
    #[error("document {0} not found")]
    DocumentNotFound(i64),
}
