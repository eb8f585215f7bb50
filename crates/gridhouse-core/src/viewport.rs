//! Viewport Translation
//!
//! Maps a client's pixel viewport (scroll position, screen size, buffer
//! margins) to the canonical row/column slice the storage layer understands.
//!
//! ## The Problem
//!
//! Clients think in pixels: "my window is 1000×480 and I'm scrolled to
//! y = 48 000". The slicer thinks in rows and columns. The translation has to
//! be pure and total: any combination of client numbers must produce a valid,
//! bounded slice request.
//!
//! ## The Rules
//!
//! - `start_row = scroll_top / row_height`, clamped to the table
//! - `row_count = visible rows + 2 × vertical buffer`, clamped to what
//!   remains below `start_row`
//! - columns follow the same formulas with their own buffer
//! - hard safety caps bound any single slice at 1000 rows × 200 columns,
//!   regardless of what the viewport asks for
//!
//! The same inputs always produce the same output, and growing `scroll_top`
//! never moves `start_row` backwards.

use serde::{Deserialize, Serialize};

/// Hard cap on rows in a single slice, regardless of viewport size.
pub const MAX_SLICE_ROWS: u32 = 1000;

/// Hard cap on columns in a single slice, regardless of viewport size.
pub const MAX_SLICE_COLS: u32 = 200;

/// A client's pixel viewport, as reported in a `slice_request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub screen_width: u32,
    pub screen_height: u32,
    pub horizontal_buffer: u32,
    pub vertical_buffer: u32,
    pub default_column_width: u32,
    pub default_row_height: u32,
    pub scroll_left: u64,
    pub scroll_top: u64,
}

/// Canonical slice parameters produced from a [`Viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceParams {
    pub start_row: u64,
    pub row_count: u32,
    pub start_col: u32,
    pub col_count: u32,
}

/// Translate a pixel viewport into slice parameters for a table of
/// `max_rows` × `max_cols` cells.
pub fn compute_slice_params(viewport: &Viewport, max_rows: u64, max_cols: u32) -> SliceParams {
    // Zero pixel sizes from a client must not panic the worker.
    let row_height = viewport.default_row_height.max(1);
    let col_width = viewport.default_column_width.max(1);

    let mut start_row = viewport.scroll_top / row_height as u64;
    if start_row >= max_rows {
        start_row = max_rows.saturating_sub(1);
    }
    let visible_rows = div_ceil(viewport.screen_height, row_height);
    let wanted_rows = visible_rows as u64 + 2 * viewport.vertical_buffer as u64;
    let remaining_rows = max_rows - start_row.min(max_rows);
    let row_count = wanted_rows.min(remaining_rows).min(MAX_SLICE_ROWS as u64) as u32;

    // Clamp in u64 first: an absurd scroll_left must not wrap the cast.
    let mut start_col_wide = viewport.scroll_left / col_width as u64;
    if start_col_wide >= max_cols as u64 {
        start_col_wide = max_cols.saturating_sub(1) as u64;
    }
    let start_col = start_col_wide as u32;
    let visible_cols = div_ceil(viewport.screen_width, col_width);
    let wanted_cols = visible_cols.saturating_add(viewport.horizontal_buffer.saturating_mul(2));
    let remaining_cols = max_cols - start_col.min(max_cols);
    let col_count = wanted_cols.min(remaining_cols).min(MAX_SLICE_COLS);

    SliceParams {
        start_row,
        row_count,
        start_col,
        col_count,
    }
}

fn div_ceil(a: u32, b: u32) -> u32 {
    if b == 0 {
        return 0;
    }
    (a + b - 1) / b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_viewport() -> Viewport {
        Viewport {
            screen_width: 1000,
            screen_height: 480,
            horizontal_buffer: 2,
            vertical_buffer: 5,
            default_column_width: 100,
            default_row_height: 24,
            scroll_left: 0,
            scroll_top: 0,
        }
    }

    // ---------------------------------------------------------------
    // Reference scenario
    // ---------------------------------------------------------------

    #[test]
    fn test_small_table_clamps_both_axes() {
        // 20 visible rows + 10 buffered would be 30, but the table only has 5.
        // 10 visible cols + 4 buffered would be 14, but the table only has 2.
        let params = compute_slice_params(&sample_viewport(), 5, 2);
        assert_eq!(
            params,
            SliceParams {
                start_row: 0,
                row_count: 5,
                start_col: 0,
                col_count: 2,
            }
        );
    }

    #[test]
    fn test_large_table_uses_buffered_window() {
        let params = compute_slice_params(&sample_viewport(), 1_000_000_000, 1000);
        assert_eq!(params.start_row, 0);
        assert_eq!(params.row_count, 30); // ceil(480/24) + 2*5
        assert_eq!(params.start_col, 0);
        assert_eq!(params.col_count, 14); // ceil(1000/100) + 2*2
    }

    #[test]
    fn test_scroll_positions_map_to_indices() {
        let mut vp = sample_viewport();
        vp.scroll_top = 24 * 1234;
        vp.scroll_left = 100 * 7;
        let params = compute_slice_params(&vp, 1_000_000, 100);
        assert_eq!(params.start_row, 1234);
        assert_eq!(params.start_col, 7);
    }

    // ---------------------------------------------------------------
    // Safety caps
    // ---------------------------------------------------------------

    #[test]
    fn test_row_cap_bounds_huge_viewports() {
        let mut vp = sample_viewport();
        vp.screen_height = 1_000_000;
        let params = compute_slice_params(&vp, u64::MAX, 2);
        assert_eq!(params.row_count, MAX_SLICE_ROWS);
    }

    #[test]
    fn test_col_cap_bounds_huge_viewports() {
        let mut vp = sample_viewport();
        vp.screen_width = 1_000_000;
        let params = compute_slice_params(&vp, 100, u32::MAX);
        assert_eq!(params.col_count, MAX_SLICE_COLS);
    }

    #[test]
    fn test_huge_buffers_are_capped() {
        let mut vp = sample_viewport();
        vp.vertical_buffer = u32::MAX;
        vp.horizontal_buffer = u32::MAX;
        let params = compute_slice_params(&vp, u64::MAX, u32::MAX);
        assert_eq!(params.row_count, MAX_SLICE_ROWS);
        assert_eq!(params.col_count, MAX_SLICE_COLS);
    }

    // ---------------------------------------------------------------
    // Clamping at the table edges
    // ---------------------------------------------------------------

    #[test]
    fn test_huge_scroll_left_clamps_without_wrapping() {
        let mut vp = sample_viewport();
        vp.scroll_left = u64::MAX;
        let params = compute_slice_params(&vp, 100, 2);
        assert_eq!(params.start_col, 1);
        assert_eq!(params.col_count, 1);
    }

    #[test]
    fn test_scroll_past_end_clamps_to_last_row() {
        let mut vp = sample_viewport();
        vp.scroll_top = 24 * 1_000_000;
        let params = compute_slice_params(&vp, 50, 2);
        assert_eq!(params.start_row, 49);
        assert_eq!(params.row_count, 1);
    }

    #[test]
    fn test_near_end_gets_remaining_rows_only() {
        let mut vp = sample_viewport();
        vp.scroll_top = 24 * 95;
        let params = compute_slice_params(&vp, 100, 2);
        assert_eq!(params.start_row, 95);
        assert_eq!(params.row_count, 5);
    }

    #[test]
    fn test_empty_table_yields_empty_slice() {
        let params = compute_slice_params(&sample_viewport(), 0, 0);
        assert_eq!(params.start_row, 0);
        assert_eq!(params.row_count, 0);
        assert_eq!(params.start_col, 0);
        assert_eq!(params.col_count, 0);
    }

    // ---------------------------------------------------------------
    // Degenerate pixel sizes
    // ---------------------------------------------------------------

    #[test]
    fn test_zero_row_height_does_not_panic() {
        let mut vp = sample_viewport();
        vp.default_row_height = 0;
        vp.default_column_width = 0;
        let params = compute_slice_params(&vp, 100, 2);
        assert!(params.row_count <= MAX_SLICE_ROWS);
        assert!(params.col_count <= 2);
    }

    // ---------------------------------------------------------------
    // Laws
    // ---------------------------------------------------------------

    #[test]
    fn test_translation_is_idempotent() {
        let vp = sample_viewport();
        let a = compute_slice_params(&vp, 1_000_000, 50);
        let b = compute_slice_params(&vp, 1_000_000, 50);
        assert_eq!(a, b);
    }

    #[test]
    fn test_start_row_is_monotonic_in_scroll_top() {
        let mut prev = 0u64;
        for scroll_top in (0..100_000u64).step_by(7) {
            let mut vp = sample_viewport();
            vp.scroll_top = scroll_top;
            let params = compute_slice_params(&vp, 1_000_000, 50);
            assert!(params.start_row >= prev, "start_row went backwards");
            prev = params.start_row;
        }
    }
}
