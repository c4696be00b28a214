//! End-to-end extraction: rasterize, segment, grid, OCR, submit.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use gridocr_core::{
    Bitmap, GridSettings, PixBox, analyze_cell, cell_grid, columns_from_lines, find_blocks,
    find_hlines, find_vlines, rows_from_lines, run_threshold,
};
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::imaging::{load_binarized, to_gray};
use crate::ocr::{OcrEngine, ocr_cell};
use crate::rasterize::Rasterizer;
use crate::store::{Segment, SegmentKey, SegmentStore, StoredSegment};

/// Knobs for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub settings: GridSettings,
    /// First and last PDF page to extract (1-based, inclusive).
    pub first_page: u32,
    pub last_page: u32,
    /// When set, block crops, pre-/post-erosion cell images, and raw OCR
    /// text are written under this directory for inspection.
    pub dump_dir: Option<PathBuf>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            settings: GridSettings::default(),
            first_page: 1,
            last_page: 200,
            dump_dir: None,
        }
    }
}

/// Counters for one document run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages successfully loaded and processed.
    pub pages: u32,
    pub blocks: u32,
    /// Cells examined, including empty ones.
    pub cells: u32,
    pub empty_cells: u32,
    /// Segments submitted to the store.
    pub submitted: u32,
    /// Segments skipped because the store already had them.
    pub skipped: u32,
}

/// The extraction pipeline, wired to a rasterizer, an OCR engine, and a
/// segment store.
pub struct Pipeline<'a> {
    rasterizer: &'a (dyn Rasterizer + Sync),
    engine: &'a (dyn OcrEngine + Sync),
    store: &'a (dyn SegmentStore + Sync),
    options: PipelineOptions,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        rasterizer: &'a (dyn Rasterizer + Sync),
        engine: &'a (dyn OcrEngine + Sync),
        store: &'a (dyn SegmentStore + Sync),
        options: PipelineOptions,
    ) -> Self {
        Self {
            rasterizer,
            engine,
            store,
            options,
        }
    }

    /// Extract every table cell of `pdf` and submit the results as segments
    /// of document `doc_id`.
    ///
    /// Re-running over the same document is safe: segments whose page and
    /// pixel box the store already holds are skipped, so an interrupted run
    /// picks up where it left off. A page that fails to load is logged and
    /// skipped; a store failure is fatal.
    pub fn process_document(
        &self,
        doc_id: i64,
        pdf: &Path,
    ) -> Result<RunSummary, PipelineError> {
        let doc = self.store.document(doc_id)?;
        let existing: HashSet<SegmentKey> = doc.segments.iter().map(StoredSegment::key).collect();
        info!(
            doc_id,
            pdf = %pdf.display(),
            existing = existing.len(),
            "processing document"
        );

        let workdir = tempfile::tempdir()?;
        let pages = self.rasterizer.rasterize(
            pdf,
            workdir.path(),
            self.options.first_page,
            self.options.last_page,
        )?;

        let mut summary = RunSummary::default();
        for page in &pages {
            let bitmap = match load_binarized(&page.path) {
                Ok(bitmap) => bitmap,
                Err(e) => {
                    warn!(page = page.page, error = %e, "skipping unloadable page");
                    continue;
                }
            };
            summary.pages += 1;
            self.process_page(doc_id, page.page, &bitmap, &existing, &mut summary)?;
        }

        info!(
            doc_id,
            pages = summary.pages,
            cells = summary.cells,
            submitted = summary.submitted,
            skipped = summary.skipped,
            "document done"
        );
        Ok(summary)
    }

    fn process_page(
        &self,
        doc_id: i64,
        pageno: u32,
        page: &Bitmap,
        existing: &HashSet<SegmentKey>,
        summary: &mut RunSummary,
    ) -> Result<(), PipelineError> {
        let settings = &self.options.settings;
        let blocks = find_blocks(page, settings);
        info!(page = pageno, blocks = blocks.len(), "segmented page");
        summary.blocks += blocks.len() as u32;

        for (blockno, block_box) in blocks.iter().enumerate() {
            let block = page.crop(block_box);
            self.dump_image(&block, format!("p{pageno:03}-b{blockno}.png"))?;

            let hthresh = run_threshold(block.width(), settings);
            let vthresh = run_threshold(block.height(), settings);
            let hlines = find_hlines(&block, hthresh, settings);
            let vlines = find_vlines(&block, vthresh, settings);
            debug!(
                page = pageno,
                block = blockno,
                hlines = hlines.len(),
                vlines = vlines.len(),
                "detected ruling lines"
            );

            // With no lines in a direction the whole block is one row or
            // column, so an unruled block still yields one cell.
            let rows = rows_from_lines(&hlines, block.width(), block.height(), settings.min_row_height);
            let cols =
                columns_from_lines(&vlines, block.width(), block.height(), settings.min_col_width);
            debug!(
                page = pageno,
                block = blockno,
                rows = rows.len(),
                cols = cols.len(),
                "derived grid"
            );

            for (rowno, grid_row) in cell_grid(&rows, &cols).iter().enumerate() {
                for (colno, cell_box) in grid_row.iter().enumerate() {
                    summary.cells += 1;
                    let cell = block.crop(cell_box);
                    let content = analyze_cell(&cell, settings);
                    let stem = format!("p{pageno:03}-b{blockno}-r{rowno}-c{colno}");
                    self.dump_image(&cell, format!("{stem}-raw.png"))?;
                    self.dump_image(&content.eroded, format!("{stem}-eroded.png"))?;

                    if content.is_empty {
                        summary.empty_cells += 1;
                        continue;
                    }

                    let text = ocr_cell(self.engine, &content)?;
                    self.dump_text(&text, format!("{stem}.txt"))?;

                    let abs = cell_box.translate(block_box.x1, block_box.y1);
                    let segment = Segment {
                        doc_id,
                        page: pageno,
                        row: rowno as u32,
                        col: colno as u32,
                        x1: abs.x1,
                        y1: abs.y1,
                        x2: abs.x2,
                        y2: abs.y2,
                        ocrtext: text,
                    };
                    if existing.contains(&segment.key()) {
                        debug!(page = pageno, row = rowno, col = colno, "segment already stored");
                        summary.skipped += 1;
                    } else {
                        self.store.submit(&segment)?;
                        summary.submitted += 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn dump_image(&self, bitmap: &Bitmap, name: String) -> Result<(), PipelineError> {
        if let Some(dir) = &self.options.dump_dir {
            std::fs::create_dir_all(dir)?;
            to_gray(bitmap).save(dir.join(name))?;
        }
        Ok(())
    }

    fn dump_text(&self, text: &str, name: String) -> Result<(), PipelineError> {
        if let Some(dir) = &self.options.dump_dir {
            std::fs::create_dir_all(dir)?;
            std::fs::write(dir.join(name), text)?;
        }
        Ok(())
    }
}

/// Detected geometry of one page image, for diagnostics without OCR.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    pub blocks: Vec<BlockGeometry>,
}

/// Per-block geometry: the block's page box and its grid in block-local
/// coordinates.
#[derive(Debug, Clone)]
pub struct BlockGeometry {
    pub bbox: PixBox,
    pub hlines: Vec<PixBox>,
    pub vlines: Vec<PixBox>,
    pub rows: Vec<PixBox>,
    pub cols: Vec<PixBox>,
}

/// Run block and grid detection over one page bitmap.
pub fn page_geometry(page: &Bitmap, settings: &GridSettings) -> PageGeometry {
    let blocks = find_blocks(page, settings)
        .into_iter()
        .map(|bbox| {
            let block = page.crop(&bbox);
            let hlines = find_hlines(&block, run_threshold(block.width(), settings), settings);
            let vlines = find_vlines(&block, run_threshold(block.height(), settings), settings);
            let rows =
                rows_from_lines(&hlines, block.width(), block.height(), settings.min_row_height);
            let cols =
                columns_from_lines(&vlines, block.width(), block.height(), settings.min_col_width);
            BlockGeometry {
                bbox,
                hlines: hlines.into_iter().map(|l| l.bbox).collect(),
                vlines: vlines.into_iter().map(|l| l.bbox).collect(),
                rows,
                cols,
            }
        })
        .collect();
    PageGeometry { blocks }
}

/// Process several documents in parallel, one rayon task per document.
/// Results come back in input order.
#[cfg(feature = "parallel")]
pub fn process_documents(
    pipeline: &Pipeline<'_>,
    jobs: &[(i64, PathBuf)],
) -> Vec<Result<RunSummary, PipelineError>> {
    use rayon::prelude::*;
    jobs.par_iter()
        .map(|(doc_id, pdf)| pipeline.process_document(*doc_id, pdf))
        .collect()
}
