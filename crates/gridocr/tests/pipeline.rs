//! End-to-end pipeline tests over synthetic page images, with the
//! rasterizer and OCR engine stubbed out.

use std::path::Path;
use std::sync::Mutex;

use gridocr::imaging::to_gray;
use gridocr::{
    Bitmap, MemoryStore, OcrEngine, PageImage, Pipeline, PipelineError, PipelineOptions,
    Rasterizer, SegmentationMode, StoredSegment,
};
use image::GrayImage;

const DOC_ID: i64 = 42;

// --- stubs ---

enum Fixture {
    Page(Bitmap),
    Broken,
}

/// Rasterizer that writes prebuilt bitmaps (or deliberately corrupt files)
/// to the work directory instead of shelling out.
struct FixtureRasterizer {
    fixtures: Vec<Fixture>,
}

impl Rasterizer for FixtureRasterizer {
    fn rasterize(
        &self,
        _pdf: &Path,
        out_dir: &Path,
        _first: u32,
        _last: u32,
    ) -> Result<Vec<PageImage>, PipelineError> {
        let mut pages = Vec::new();
        for (i, fixture) in self.fixtures.iter().enumerate() {
            let page = i as u32 + 1;
            let path = out_dir.join(format!("page-{page:03}-000.png"));
            match fixture {
                Fixture::Page(bitmap) => to_gray(bitmap).save(&path)?,
                Fixture::Broken => std::fs::write(&path, b"not a png")?,
            }
            pages.push(PageImage { page, path });
        }
        Ok(pages)
    }
}

/// Engine that reads any cell containing ink as a fixed string.
struct InkEngine;

impl OcrEngine for InkEngine {
    fn recognize(
        &self,
        image: &GrayImage,
        _mode: SegmentationMode,
    ) -> Result<String, PipelineError> {
        if image.pixels().any(|p| p.0[0] < 128) {
            Ok("株式会社".to_string())
        } else {
            Ok(String::new())
        }
    }
}

/// Engine that replays scripted responses and records segmentation modes.
struct ScriptedEngine {
    responses: Mutex<Vec<String>>,
    modes: Mutex<Vec<SegmentationMode>>,
}

impl ScriptedEngine {
    fn new(responses: &[&str]) -> Self {
        let mut rs: Vec<String> = responses.iter().map(|s| s.to_string()).collect();
        rs.reverse();
        Self {
            responses: Mutex::new(rs),
            modes: Mutex::new(Vec::new()),
        }
    }

    fn modes(&self) -> Vec<SegmentationMode> {
        self.modes.lock().unwrap().clone()
    }
}

impl OcrEngine for ScriptedEngine {
    fn recognize(
        &self,
        _image: &GrayImage,
        mode: SegmentationMode,
    ) -> Result<String, PipelineError> {
        self.modes.lock().unwrap().push(mode);
        Ok(self.responses.lock().unwrap().pop().unwrap_or_default())
    }
}

// --- fixtures ---

/// A 400x600 page with a fully-ruled 2x2 table and content in the
/// top-right cell.
///
/// Vertical rulings (3px) at x 20, 200, 380 spanning y 100..500;
/// horizontal rulings (3px) at y 100, 300, 497 spanning x 20..383;
/// a 40x40 content blob at (250,150).
fn ruled_page() -> Bitmap {
    Bitmap::from_fn(400, 600, |x, y| {
        let in_table_y = (100..500).contains(&y);
        let in_table_x = (20..383).contains(&x);
        let vline = in_table_y && [20u32, 200, 380].iter().any(|&v| (v..v + 3).contains(&x));
        let hline = in_table_x && [100u32, 300, 497].iter().any(|&h| (h..h + 3).contains(&y));
        let blob = (250..290).contains(&x) && (150..190).contains(&y);
        vline || hline || blob
    })
}

/// A 400x300 page with one unruled block of text-like checkerboard ink.
fn unruled_page() -> Bitmap {
    Bitmap::from_fn(400, 300, |x, y| {
        (50..350).contains(&x) && (100..200).contains(&y) && (x + y) % 2 == 0
    })
}

fn run(
    fixtures: Vec<Fixture>,
    engine: &(dyn OcrEngine + Sync),
    store: &MemoryStore,
) -> Result<gridocr::RunSummary, PipelineError> {
    let rasterizer = FixtureRasterizer { fixtures };
    let pipeline = Pipeline::new(&rasterizer, engine, store, PipelineOptions::default());
    pipeline.process_document(DOC_ID, Path::new("doc.pdf"))
}

// --- tests ---

#[test]
fn ruled_table_yields_one_segment_from_four_cells() {
    let store = MemoryStore::new(DOC_ID);
    let summary = run(vec![Fixture::Page(ruled_page())], &InkEngine, &store).unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.blocks, 1);
    assert_eq!(summary.cells, 4);
    assert_eq!(summary.empty_cells, 3);
    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.skipped, 0);

    let segments = store.submitted();
    assert_eq!(segments.len(), 1);
    let seg = &segments[0];
    assert_eq!(seg.doc_id, DOC_ID);
    assert_eq!(seg.page, 1);
    assert_eq!((seg.row, seg.col), (0, 1));
    assert_eq!(seg.ocrtext, "株式会社");
    // Page-absolute cell box: between the mid-gap ruling and the right
    // ruling, between the top and middle rulings.
    assert_eq!((seg.x1, seg.y1, seg.x2, seg.y2), (201, 101, 381, 301));
}

#[test]
fn rerun_skips_everything_already_stored() {
    let first = MemoryStore::new(DOC_ID);
    run(vec![Fixture::Page(ruled_page())], &InkEngine, &first).unwrap();

    let stored: Vec<StoredSegment> = first
        .submitted()
        .iter()
        .map(|s| StoredSegment {
            page: s.page,
            x1: s.x1,
            y1: s.y1,
            x2: s.x2,
            y2: s.y2,
        })
        .collect();
    let stored_count = stored.len() as u32;

    let second = MemoryStore::with_segments(DOC_ID, stored);
    let summary = run(vec![Fixture::Page(ruled_page())], &InkEngine, &second).unwrap();

    assert_eq!(summary.submitted, 0);
    assert_eq!(summary.skipped, stored_count);
    assert!(second.submitted().is_empty());
}

#[test]
fn unreadable_cell_still_becomes_a_textless_segment() {
    struct BlankEngine;
    impl OcrEngine for BlankEngine {
        fn recognize(&self, _: &GrayImage, _: SegmentationMode) -> Result<String, PipelineError> {
            Ok(String::new())
        }
    }

    let store = MemoryStore::new(DOC_ID);
    let summary = run(vec![Fixture::Page(ruled_page())], &BlankEngine, &store).unwrap();

    assert_eq!(summary.submitted, 1);
    let segments = store.submitted();
    assert_eq!(segments.len(), 1);
    assert!(segments[0].ocrtext.is_empty());
}

#[test]
fn block_without_rulings_falls_back_to_a_single_cell() {
    let store = MemoryStore::new(DOC_ID);
    let summary = run(vec![Fixture::Page(unruled_page())], &InkEngine, &store).unwrap();

    assert_eq!(summary.blocks, 1);
    assert_eq!(summary.cells, 1);
    assert_eq!(summary.submitted, 1);

    let seg = &store.submitted()[0];
    assert_eq!((seg.row, seg.col), (0, 0));
    // The single cell is the whole block.
    assert_eq!((seg.x1, seg.y1, seg.x2, seg.y2), (50, 100, 350, 200));
}

#[test]
fn noisy_cell_gets_the_close_retry_stage() {
    // The unruled checkerboard block is half ink, half paper, so it lands
    // in the noise band; a blank first read must trigger the morphological
    // close retry before single-block mode.
    let engine = ScriptedEngine::new(&["", "12,000"]);
    let store = MemoryStore::new(DOC_ID);
    let summary = run(vec![Fixture::Page(unruled_page())], &engine, &store).unwrap();

    assert_eq!(summary.submitted, 1);
    assert_eq!(store.submitted()[0].ocrtext, "12,000");
    assert_eq!(
        engine.modes(),
        vec![SegmentationMode::MultiBlock, SegmentationMode::MultiBlock]
    );
}

#[test]
fn unloadable_page_is_skipped_not_fatal() {
    let store = MemoryStore::new(DOC_ID);
    let summary = run(
        vec![Fixture::Broken, Fixture::Page(ruled_page())],
        &InkEngine,
        &store,
    )
    .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.submitted, 1);
    assert_eq!(store.submitted()[0].page, 2);
}

#[test]
fn unknown_document_fails_before_any_work() {
    let store = MemoryStore::new(7);
    let err = run(vec![Fixture::Page(ruled_page())], &InkEngine, &store).unwrap_err();
    assert!(matches!(err, PipelineError::DocumentNotFound(DOC_ID)));
}

#[test]
fn blank_document_produces_nothing() {
    let store = MemoryStore::new(DOC_ID);
    let summary = run(
        vec![Fixture::Page(Bitmap::new(400, 600))],
        &InkEngine,
        &store,
    )
    .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.blocks, 0);
    assert_eq!(summary.cells, 0);
    assert!(store.submitted().is_empty());
}
