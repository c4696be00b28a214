//! Segment persistence: the wire types and the stores that accept them.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PipelineError;

/// One OCRed table cell, positioned in page-absolute pixel coordinates,
/// ready for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub doc_id: i64,
    /// 1-based page number.
    pub page: u32,
    /// Grid position within the page's block.
    pub row: u32,
    pub col: u32,
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    /// Recognized text; empty when the cell was unreadable.
    pub ocrtext: String,
}

impl Segment {
    pub fn key(&self) -> SegmentKey {
        SegmentKey {
            page: self.page,
            x1: self.x1,
            y1: self.y1,
            x2: self.x2,
            y2: self.y2,
        }
    }
}

/// Identity of a segment for deduplication: its page and pixel box. Grid
/// detection is deterministic, so a re-run of the same document produces
/// the same keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub page: u32,
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

/// A segment as the store reports it back. Only the fields needed for
/// deduplication are kept; the store may send more.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredSegment {
    pub page: u32,
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl StoredSegment {
    pub fn key(&self) -> SegmentKey {
        SegmentKey {
            page: self.page,
            x1: self.x1,
            y1: self.y1,
            x2: self.x2,
            y2: self.y2,
        }
    }
}

/// Store-side record for a document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentInfo {
    pub id: i64,
    #[serde(default)]
    pub filename: String,
    /// Segments already persisted for this document.
    #[serde(default)]
    pub segments: Vec<StoredSegment>,
}

/// Where extracted segments go.
pub trait SegmentStore {
    /// Fetch the document record, including its existing segments.
    fn document(&self, doc_id: i64) -> Result<DocumentInfo, PipelineError>;

    /// Persist one segment.
    fn submit(&self, segment: &Segment) -> Result<(), PipelineError>;
}

/// [`SegmentStore`] over the review application's HTTP API.
#[derive(Debug)]
pub struct HttpStore {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpStore {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl SegmentStore for HttpStore {
    fn document(&self, doc_id: i64) -> Result<DocumentInfo, PipelineError> {
        let url = format!("{}/api/document/{doc_id}", self.base_url);
        debug!(%url, "fetching document record");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| PipelineError::Store(format!("GET {url}: {e}")))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PipelineError::DocumentNotFound(doc_id));
        }
        let resp = resp
            .error_for_status()
            .map_err(|e| PipelineError::Store(format!("GET {url}: {e}")))?;
        resp.json()
            .map_err(|e| PipelineError::Store(format!("decoding document {doc_id}: {e}")))
    }

    fn submit(&self, segment: &Segment) -> Result<(), PipelineError> {
        let url = format!("{}/api/raw/doc_segment", self.base_url);
        self.client
            .post(&url)
            .json(segment)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| PipelineError::Store(format!("POST {url}: {e}")))?;
        Ok(())
    }
}

/// In-memory [`SegmentStore`] for tests and dry runs.
#[derive(Debug)]
pub struct MemoryStore {
    doc: DocumentInfo,
    submitted: Mutex<Vec<Segment>>,
}

impl MemoryStore {
    pub fn new(doc_id: i64) -> Self {
        Self::with_segments(doc_id, Vec::new())
    }

    /// A store that already holds `segments` for the document.
    pub fn with_segments(doc_id: i64, segments: Vec<StoredSegment>) -> Self {
        Self {
            doc: DocumentInfo {
                id: doc_id,
                filename: String::new(),
                segments,
            },
            submitted: Mutex::new(Vec::new()),
        }
    }

    /// Everything submitted so far, in submission order.
    pub fn submitted(&self) -> Vec<Segment> {
        match self.submitted.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SegmentStore for MemoryStore {
    fn document(&self, doc_id: i64) -> Result<DocumentInfo, PipelineError> {
        if doc_id != self.doc.id {
            return Err(PipelineError::DocumentNotFound(doc_id));
        }
        Ok(self.doc.clone())
    }

    fn submit(&self, segment: &Segment) -> Result<(), PipelineError> {
        match self.submitted.lock() {
            Ok(mut guard) => guard.push(segment.clone()),
            Err(poisoned) => poisoned.into_inner().push(segment.clone()),
        }
        Ok(())
    }
}
