use std::path::{Path, PathBuf};

use gridocr::{
    HttpStore, MemoryStore, PdfImages, Pipeline, PipelineOptions, RunSummary, SegmentStore,
    Tesseract,
};

use crate::page_span::parse_page_span;

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: &Path,
    doc_id: i64,
    store_url: &str,
    lang: &str,
    pages: Option<&str>,
    debug_dump: Option<&Path>,
    dry_run: bool,
) -> Result<(), i32> {
    if !file.exists() {
        eprintln!("Error: file {} does not exist", file.display());
        return Err(1);
    }

    let mut options = PipelineOptions {
        dump_dir: debug_dump.map(PathBuf::from),
        ..PipelineOptions::default()
    };
    if let Some(span) = pages {
        let (first, last) = parse_page_span(span).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?;
        options.first_page = first;
        options.last_page = last;
    }

    let rasterizer = PdfImages;
    let engine = Tesseract::new(lang);

    let summary = if dry_run {
        let store = MemoryStore::new(doc_id);
        let summary = process(&rasterizer, &engine, &store, options, doc_id, file)?;
        for segment in store.submitted() {
            println!("{}", serde_json::to_string(&segment).unwrap());
        }
        summary
    } else {
        let store = HttpStore::new(store_url);
        process(&rasterizer, &engine, &store, options, doc_id, file)?
    };

    eprintln!(
        "{} pages, {} blocks, {} cells ({} empty): {} submitted, {} skipped",
        summary.pages,
        summary.blocks,
        summary.cells,
        summary.empty_cells,
        summary.submitted,
        summary.skipped
    );
    Ok(())
}

fn process(
    rasterizer: &PdfImages,
    engine: &Tesseract,
    store: &(dyn SegmentStore + Sync),
    options: PipelineOptions,
    doc_id: i64,
    file: &Path,
) -> Result<RunSummary, i32> {
    Pipeline::new(rasterizer, engine, store, options)
        .process_document(doc_id, file)
        .map_err(|e| {
            eprintln!("Error: {e}");
            1
        })
}
