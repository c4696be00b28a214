//! Cell-level OCR through the Tesseract command-line binary, with a staged
//! retry ladder for cells the first pass can't read.

use std::path::Path;
use std::process::Command;

use gridocr_core::CellContent;
use image::GrayImage;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::imaging::{close_ink, to_gray};

/// How the engine should segment the image before recognizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentationMode {
    /// Let the engine find blocks of text itself (its default behavior).
    MultiBlock,
    /// Treat the whole image as one uniform block of text. Helps with
    /// single short values that block detection discards as noise.
    SingleBlock,
}

/// A text recognizer for single-cell images.
///
/// Implementations return the recognized text with surrounding whitespace
/// and blank lines stripped; an unreadable cell is `Ok` with an empty
/// string, not an error.
pub trait OcrEngine {
    fn recognize(&self, image: &GrayImage, mode: SegmentationMode)
    -> Result<String, PipelineError>;
}

/// [`OcrEngine`] backed by the `tesseract` command.
///
/// Each call writes the cell to a temporary PNG, runs the binary, and reads
/// the `.txt` sidecar it produces.
#[derive(Debug, Clone)]
pub struct Tesseract {
    /// Language model(s), e.g. `"jpn+eng"`. The disclosure forms mix
    /// Japanese names with Arabic-numeral amounts, so both are loaded.
    pub language: String,
}

impl Default for Tesseract {
    fn default() -> Self {
        Self {
            language: "jpn+eng".to_string(),
        }
    }
}

impl Tesseract {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl OcrEngine for Tesseract {
    fn recognize(
        &self,
        image: &GrayImage,
        mode: SegmentationMode,
    ) -> Result<String, PipelineError> {
        let dir = tempfile::tempdir()?;
        let png = dir.path().join("cell.png");
        let base = dir.path().join("cell");
        image.save(&png)?;

        let mut cmd = Command::new("tesseract");
        cmd.arg("-l").arg(&self.language).arg(&png).arg(&base);
        if mode == SegmentationMode::SingleBlock {
            cmd.arg("--psm").arg("6");
        }
        let output = cmd
            .output()
            .map_err(|e| PipelineError::Ocr(format!("failed to run tesseract: {e}")))?;
        if !output.status.success() {
            // Tesseract bails on images it considers degenerate (too small,
            // all one color). That is an unreadable cell, not a failure.
            warn!(status = %output.status, "tesseract returned non-zero, treating cell as blank");
            return Ok(String::new());
        }

        read_sidecar(&base.with_extension("txt"))
    }
}

/// Read tesseract's `.txt` output, trimming each line and dropping blanks.
/// A missing sidecar means the engine produced nothing.
fn read_sidecar(path: &Path) -> Result<String, PipelineError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => return Err(e.into()),
    };
    Ok(normalize_lines(&raw))
}

fn normalize_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// OCR one analyzed cell, escalating through cheaper-to-harsher stages:
///
/// 1. the eroded cell as-is;
/// 2. if the cell looked noisy, a morphological close to fuse speckle into
///    strokes, then another pass;
/// 3. single-block segmentation as a last resort, run on whatever image the
///    previous stage used; this rescues short values the block detector
///    throws away.
///
/// An empty string after all three stages means the cell is unreadable.
pub fn ocr_cell(engine: &dyn OcrEngine, content: &CellContent) -> Result<String, PipelineError> {
    let text = engine.recognize(&to_gray(&content.eroded), SegmentationMode::MultiBlock)?;
    if !text.is_empty() {
        return Ok(text);
    }

    let retry_image = if content.maybe_noisy {
        debug!("cell blank and noisy, retrying after morphological close");
        let closed = close_ink(&content.eroded);
        let text = engine.recognize(&to_gray(&closed), SegmentationMode::MultiBlock)?;
        if !text.is_empty() {
            return Ok(text);
        }
        closed
    } else {
        content.eroded.clone()
    };

    debug!("cell still blank, retrying with single-block segmentation");
    engine.recognize(&to_gray(&retry_image), SegmentationMode::SingleBlock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridocr_core::Bitmap;
    use std::cell::RefCell;

    /// Engine that replays scripted responses and records how it was called:
    /// the segmentation mode and the ink pixel count of each image received.
    struct ScriptedEngine {
        responses: RefCell<Vec<String>>,
        calls: RefCell<Vec<SegmentationMode>>,
        inks: RefCell<Vec<u32>>,
    }

    impl ScriptedEngine {
        fn new(responses: &[&str]) -> Self {
            let mut rs: Vec<String> = responses.iter().map(|s| s.to_string()).collect();
            rs.reverse();
            Self {
                responses: RefCell::new(rs),
                calls: RefCell::new(Vec::new()),
                inks: RefCell::new(Vec::new()),
            }
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn recognize(
            &self,
            image: &GrayImage,
            mode: SegmentationMode,
        ) -> Result<String, PipelineError> {
            self.calls.borrow_mut().push(mode);
            let ink = image.pixels().filter(|p| p.0[0] == 0).count() as u32;
            self.inks.borrow_mut().push(ink);
            Ok(self.responses.borrow_mut().pop().unwrap_or_default())
        }
    }

    fn content(maybe_noisy: bool) -> CellContent {
        CellContent {
            eroded: Bitmap::from_fn(30, 10, |x, y| x == 15 && y == 5),
            is_empty: false,
            maybe_noisy,
        }
    }

    #[test]
    fn first_stage_success_skips_retries() {
        let engine = ScriptedEngine::new(&["12000"]);
        let text = ocr_cell(&engine, &content(false)).unwrap();
        assert_eq!(text, "12000");
        assert_eq!(engine.calls.borrow().len(), 1);
        assert_eq!(engine.calls.borrow()[0], SegmentationMode::MultiBlock);
    }

    #[test]
    fn clean_cell_skips_close_stage() {
        let engine = ScriptedEngine::new(&["", "fallback"]);
        let text = ocr_cell(&engine, &content(false)).unwrap();
        assert_eq!(text, "fallback");
        assert_eq!(
            *engine.calls.borrow(),
            vec![SegmentationMode::MultiBlock, SegmentationMode::SingleBlock]
        );
    }

    #[test]
    fn noisy_cell_runs_all_three_stages() {
        let engine = ScriptedEngine::new(&["", "", "last resort"]);
        let text = ocr_cell(&engine, &content(true)).unwrap();
        assert_eq!(text, "last resort");
        assert_eq!(
            *engine.calls.borrow(),
            vec![
                SegmentationMode::MultiBlock,
                SegmentationMode::MultiBlock,
                SegmentationMode::SingleBlock,
            ]
        );
    }

    #[test]
    fn noisy_cell_stops_when_close_stage_reads() {
        let engine = ScriptedEngine::new(&["", "寄附"]);
        let text = ocr_cell(&engine, &content(true)).unwrap();
        assert_eq!(text, "寄附");
        assert_eq!(engine.calls.borrow().len(), 2);
    }

    /// An 8-pixel ring with a one-pixel hole: morphological close fills the
    /// hole, so the closed image carries 9 ink pixels to the ring's 8.
    fn ring_content(maybe_noisy: bool) -> CellContent {
        let eroded = Bitmap::from_fn(20, 10, |x, y| {
            (4..=6).contains(&x) && (4..=6).contains(&y) && !(x == 5 && y == 5)
        });
        CellContent {
            eroded,
            is_empty: false,
            maybe_noisy,
        }
    }

    #[test]
    fn last_stage_reuses_the_closed_image_for_noisy_cells() {
        let engine = ScriptedEngine::new(&["", "", ""]);
        ocr_cell(&engine, &ring_content(true)).unwrap();
        assert_eq!(*engine.inks.borrow(), vec![8, 9, 9]);
    }

    #[test]
    fn last_stage_keeps_the_eroded_image_for_clean_cells() {
        let engine = ScriptedEngine::new(&["", ""]);
        ocr_cell(&engine, &ring_content(false)).unwrap();
        assert_eq!(*engine.inks.borrow(), vec![8, 8]);
    }

    #[test]
    fn all_stages_blank_yields_empty_text() {
        let engine = ScriptedEngine::new(&["", "", ""]);
        let text = ocr_cell(&engine, &content(true)).unwrap();
        assert!(text.is_empty());
    }

    // --- sidecar normalization ---

    #[test]
    fn normalize_strips_blank_lines_and_padding() {
        assert_eq!(normalize_lines("  first \n\n second\n\n\n"), "first\nsecond");
        assert_eq!(normalize_lines("\n\n"), "");
        assert_eq!(normalize_lines(""), "");
    }

    #[test]
    fn missing_sidecar_is_blank_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let text = read_sidecar(&dir.path().join("nope.txt")).unwrap();
        assert!(text.is_empty());
    }

    #[test]
    fn sidecar_is_read_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cell.txt");
        std::fs::write(&path, " 1,200,000 \n\n").unwrap();
        assert_eq!(read_sidecar(&path).unwrap(), "1,200,000");
    }
}
