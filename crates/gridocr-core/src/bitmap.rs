//! Owned monochrome pixel grid.

use crate::geometry::PixBox;

/// A monochrome bitmap: `true` pixels are ink (foreground), `false` pixels
/// are paper (background). Row-major storage.
///
/// Reads outside the bitmap's bounds return background rather than panicking,
/// which keeps the line-following scans free of explicit edge checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl Bitmap {
    /// All-background bitmap of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; (width as usize) * (height as usize)],
        }
    }

    /// Build a bitmap by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        let mut bm = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if f(x, y) {
                    bm.set(x, y, true);
                }
            }
        }
        bm
    }

    /// Build a bitmap from an ASCII-art description where `'#'` is ink and
    /// anything else is background. All rows must have equal length.
    ///
    /// Intended for tests and small fixtures.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.len()) as u32;
        let mut bm = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            assert_eq!(row.len() as u32, width, "ragged row {y}");
            for (x, ch) in row.bytes().enumerate() {
                if ch == b'#' {
                    bm.set(x as u32, y as u32, true);
                }
            }
        }
        bm
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`; out-of-bounds reads are background.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Set pixel at `(x, y)`. Panics on out-of-bounds writes.
    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        assert!(x < self.width && y < self.height, "set({x},{y}) out of bounds");
        self.pixels[(y as usize) * (self.width as usize) + x as usize] = ink;
    }

    /// Number of ink pixels.
    pub fn ink_count(&self) -> u64 {
        self.pixels.iter().filter(|&&p| p).count() as u64
    }

    /// Copy the region described by `window` into a new bitmap.
    ///
    /// The window must lie within the bitmap.
    pub fn crop(&self, window: &PixBox) -> Bitmap {
        assert!(
            window.x2 <= self.width && window.y2 <= self.height,
            "crop window {window:?} exceeds {}x{}",
            self.width,
            self.height
        );
        Bitmap::from_fn(window.width(), window.height(), |x, y| {
            self.get(window.x1 + x, window.y1 + y)
        })
    }
}
