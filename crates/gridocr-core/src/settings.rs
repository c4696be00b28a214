/// Configuration for grid detection and cell analysis.
///
/// All values are empirically tuned pixel thresholds carried over from the
/// production scans this pipeline was built for; treat them as defaults to
/// override per corpus, not derived quantities.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridSettings {
    /// Absolute minimum run length (px) for a ruling line.
    pub min_line_px: u32,
    /// Minimum run length as a fraction of the block dimension; the
    /// effective threshold is `max(min_line_px, dimension * line_ratio)`.
    pub line_ratio: f64,
    /// Maximum distance (px) a followed line may drift off its starting
    /// row/column before the run is closed.
    pub max_line_drift: u32,
    /// Minimum accumulated run length (px) before drift-following engages.
    pub drift_min_run: u32,
    /// Minimum white-run height (px) separating two blocks on a page.
    pub min_gap: u32,
    /// Columns narrower than this are discarded.
    pub min_col_width: u32,
    /// Rows shorter than this are discarded.
    pub min_row_height: u32,
    /// Depth (px) of the border-erosion walk on each cell side.
    pub edge_erode: u32,
    /// Noise floor: a cell with fewer than this many non-background pixels
    /// after erosion counts as empty.
    pub min_filled_px: u32,
    /// Noise band: a cell whose pre-erosion foreground:background ratio lies
    /// within `[1/noise_ratio, noise_ratio]` is flagged as possibly
    /// salt-and-pepper noise rather than clean text.
    pub noise_ratio: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            min_line_px: 200,
            line_ratio: 0.6,
            max_line_drift: 10,
            drift_min_run: 20,
            min_gap: 20,
            min_col_width: 10,
            min_row_height: 10,
            edge_erode: 4,
            min_filled_px: 20,
            noise_ratio: 4.0,
        }
    }
}
