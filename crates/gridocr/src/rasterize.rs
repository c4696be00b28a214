//! Page rasterization via the poppler `pdfimages` binary.
//!
//! Scanned disclosure PDFs are image containers: each page wraps one full-page
//! scan (sometimes accompanied by small stamp or logo images). `pdfimages`
//! pulls the embedded images out losslessly, which beats re-rendering the
//! page through a rasterizer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::PipelineError;

/// One extracted page image.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-based page number within the PDF.
    pub page: u32,
    pub path: PathBuf,
}

/// Turns a PDF into one image file per page.
pub trait Rasterizer {
    /// Extract pages `first..=last` of `pdf` into `out_dir`, returning one
    /// image per page in ascending page order. Pages past the end of the
    /// document are silently absent from the result.
    fn rasterize(
        &self,
        pdf: &Path,
        out_dir: &Path,
        first: u32,
        last: u32,
    ) -> Result<Vec<PageImage>, PipelineError>;
}

/// [`Rasterizer`] backed by the `pdfimages` command. Pages whose PDF
/// dictionary carries a rotation (per `pdfinfo`) are turned upright with
/// ImageMagick before being handed to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct PdfImages;

const PREFIX: &str = "page";

impl Rasterizer for PdfImages {
    fn rasterize(
        &self,
        pdf: &Path,
        out_dir: &Path,
        first: u32,
        last: u32,
    ) -> Result<Vec<PageImage>, PipelineError> {
        let rotation = page_rotation(pdf);
        let prefix = out_dir.join(PREFIX);
        debug!(pdf = %pdf.display(), first, last, "running pdfimages");
        let status = Command::new("pdfimages")
            .arg("-p")
            .arg("-f")
            .arg(first.to_string())
            .arg("-l")
            .arg(last.to_string())
            .arg("-png")
            .arg(pdf)
            .arg(&prefix)
            .status()
            .map_err(|e| PipelineError::Rasterize(format!("failed to run pdfimages: {e}")))?;
        if !status.success() {
            return Err(PipelineError::Rasterize(format!(
                "pdfimages exited with {status} for {}",
                pdf.display()
            )));
        }
        let mut pages = largest_image_per_page(out_dir)?;
        if rotation != 0 {
            for page in &mut pages {
                page.path = unrotate(&page.path, rotation);
            }
        }
        Ok(pages)
    }
}

/// Ask `pdfinfo` how the pages are rotated. Scanned forms are regularly fed
/// through the scanner sideways or upside-down, and the rotation lands in the
/// page dictionary rather than the embedded image. Best effort: any failure
/// is logged and treated as unrotated.
fn page_rotation(pdf: &Path) -> u32 {
    let output = match Command::new("pdfinfo").arg(pdf).output() {
        Ok(output) => output,
        Err(e) => {
            warn!(pdf = %pdf.display(), "failed to run pdfinfo: {e}");
            return 0;
        }
    };
    if !output.status.success() {
        warn!(pdf = %pdf.display(), status = %output.status, "pdfinfo returned non-zero");
        return 0;
    }
    match parse_rotation(&String::from_utf8_lossy(&output.stdout)) {
        Some(rot) => rot,
        None => {
            warn!(pdf = %pdf.display(), "no page rotation info");
            0
        }
    }
}

/// Pull the `Page rot:` value out of `pdfinfo` output.
fn parse_rotation(pdfinfo: &str) -> Option<u32> {
    pdfinfo
        .lines()
        .find_map(|line| line.strip_prefix("Page rot:"))
        .and_then(|rest| rest.trim().parse().ok())
}

/// Rotate a page image back upright with ImageMagick's `convert`, writing a
/// sibling file. Best effort: if the rotated file doesn't materialize the
/// original path is kept.
fn unrotate(path: &Path, rotation: u32) -> PathBuf {
    let flipped = flip_path(path);
    debug!(path = %path.display(), rotation, "unflipping page image");
    let status = Command::new("convert")
        .arg(path)
        .arg("-rotate")
        .arg(rotation.to_string())
        .arg(&flipped)
        .status();
    match status {
        Ok(status) if status.success() && flipped.exists() => flipped,
        Ok(status) => {
            warn!(path = %path.display(), status = %status, "convert did not produce a rotated image");
            path.to_path_buf()
        }
        Err(e) => {
            warn!(path = %path.display(), "failed to run convert: {e}");
            path.to_path_buf()
        }
    }
}

fn flip_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push("-flip.png");
    PathBuf::from(name)
}

/// Scan `out_dir` for `page-PPP-NNN.png` outputs and keep, for each page,
/// the largest file. A scanned page embeds its full-page scan plus the
/// occasional stamp or seal image; the scan is by far the biggest.
fn largest_image_per_page(out_dir: &Path) -> Result<Vec<PageImage>, PipelineError> {
    let mut best: BTreeMap<u32, (u64, PathBuf)> = BTreeMap::new();
    for entry in std::fs::read_dir(out_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(page) = page_number(&path) else {
            continue;
        };
        let size = entry.metadata()?.len();
        match best.get(&page) {
            Some((len, _)) if *len >= size => {}
            _ => {
                best.insert(page, (size, path));
            }
        }
    }
    Ok(best
        .into_iter()
        .map(|(page, (_, path))| PageImage { page, path })
        .collect())
}

/// Parse the page number out of a `page-PPP-NNN.png` filename, rejecting
/// anything that doesn't match the pdfimages output pattern.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension().and_then(|e| e.to_str()) != Some("png") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    let rest = stem.strip_prefix(PREFIX)?.strip_prefix('-')?;
    let (page, img) = rest.split_once('-')?;
    img.parse::<u32>().ok()?;
    page.parse().ok()
}
