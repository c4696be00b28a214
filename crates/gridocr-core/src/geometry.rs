/// Axis-aligned pixel rectangle, half-open on the right and bottom edges.
///
/// Coordinates are page- or block-local pixel offsets:
/// - `x1`: left edge (inclusive)
/// - `y1`: top edge (inclusive)
/// - `x2`: right edge (exclusive)
/// - `y2`: bottom edge (exclusive)
///
/// Invariant: `x1 <= x2` and `y1 <= y2`, so `width` and `height` never
/// underflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PixBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixBox {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32) -> Self {
        debug_assert!(x1 <= x2 && y1 <= y2, "degenerate box ({x1},{y1},{x2},{y2})");
        Self { x1, y1, x2, y2 }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Pixel area.
    pub fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// Horizontal midpoint.
    pub fn x_mid(&self) -> u32 {
        (self.x1 + self.x2) / 2
    }

    /// Vertical midpoint.
    pub fn y_mid(&self) -> u32 {
        (self.y1 + self.y2) / 2
    }

    /// Translate a block-local box into the coordinate frame of its parent
    /// (e.g. cell coordinates into page-absolute coordinates).
    pub fn translate(&self, dx: u32, dy: u32) -> PixBox {
        PixBox {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    /// Whether the horizontal extents of the two boxes intersect.
    pub fn x_overlaps(&self, other: &PixBox) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2
    }

    /// Whether the vertical extents of the two boxes intersect.
    pub fn y_overlaps(&self, other: &PixBox) -> bool {
        self.y1 < other.y2 && other.y1 < self.y2
    }
}

/// Ruling-line orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    Horizontal,
    Vertical,
}
