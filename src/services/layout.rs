//! Row-batch pagination: where every item of a barcode sheet lands.
//!
//! Items fill a `columns x rows` grid left to right, top to bottom, and a new
//! page starts every `columns * rows` items. Margins are spread evenly around
//! the grid, so the same geometry always produces the same positions.
//!
//! ```ignore
//! use labelkit::models::LayoutGeometry;
//! use labelkit::services::layout::Paginator;
//!
//! let paginator = Paginator::new(LayoutGeometry::a4(3, 8, 60, 20, 10))?;
//! let pos = paginator.position(24);
//! assert_eq!(pos.page_index, 1);
//! ```

use crate::error::ToolResult;
use crate::models::{LayoutGeometry, PagePosition};

/// Pure position calculator for one validated geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paginator {
    geometry: LayoutGeometry,
    horizontal_margin: f64,
    vertical_margin: f64,
}

impl Paginator {
    /// Validate the geometry and precompute margins.
    ///
    /// Margins may come out negative when the grid is wider or taller than the
    /// page. That is logged, not rejected: the sheet is still produced and the
    /// overflowing cells simply run off the page.
    pub fn new(geometry: LayoutGeometry) -> ToolResult<Self> {
        geometry.validate()?;

        let columns = f64::from(geometry.columns);
        let rows = f64::from(geometry.rows);
        let cell_height = f64::from(geometry.barcode_height) + f64::from(geometry.text_allowance);

        let horizontal_margin = (f64::from(geometry.page_width)
            - columns * f64::from(geometry.barcode_width))
            / (columns + 1.0);
        let vertical_margin =
            (f64::from(geometry.page_height) - rows * cell_height) / (rows + 1.0);

        let paginator = Self {
            geometry,
            horizontal_margin,
            vertical_margin,
        };

        if paginator.overflows() {
            tracing::warn!(
                "Layout {}x{} of {}x{} mm does not fit a {}x{} mm page (margins {:.2}/{:.2} mm)",
                geometry.columns,
                geometry.rows,
                geometry.barcode_width,
                geometry.barcode_height,
                geometry.page_width,
                geometry.page_height,
                horizontal_margin,
                vertical_margin
            );
        }

        Ok(paginator)
    }

    pub fn geometry(&self) -> &LayoutGeometry {
        &self.geometry
    }

    pub fn horizontal_margin(&self) -> f64 {
        self.horizontal_margin
    }

    pub fn vertical_margin(&self) -> f64 {
        self.vertical_margin
    }

    /// True when either margin is negative.
    pub fn overflows(&self) -> bool {
        self.horizontal_margin < 0.0 || self.vertical_margin < 0.0
    }

    pub fn items_per_page(&self) -> usize {
        self.geometry.items_per_page()
    }

    /// Position of the item at `index`.
    pub fn position(&self, index: usize) -> PagePosition {
        let per_page = self.items_per_page();
        let columns = self.geometry.columns as usize;

        let column = (index % columns) as u32;
        let row = ((index % per_page) / columns) as u32;

        let cell_width = f64::from(self.geometry.barcode_width) + self.horizontal_margin;
        let cell_height = f64::from(self.geometry.barcode_height)
            + f64::from(self.geometry.text_allowance)
            + self.vertical_margin;

        PagePosition {
            page_index: index / per_page,
            column,
            row,
            x: self.horizontal_margin + f64::from(column) * cell_width,
            y: self.vertical_margin + f64::from(row) * cell_height,
        }
    }

    /// Whether the item at `index` is the first on a fresh page.
    pub fn starts_new_page(&self, index: usize) -> bool {
        index > 0 && index % self.items_per_page() == 0
    }

    /// Pages needed for `item_count` items (at least one).
    pub fn page_count(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.items_per_page()).max(1)
    }

    /// Positions for the first `item_count` items, in order.
    pub fn layout(&self, item_count: usize) -> Vec<PagePosition> {
        (0..item_count).map(|i| self.position(i)).collect()
    }
}

/// Lay out `item_count` items with `geometry` in one call.
pub fn paginate(geometry: LayoutGeometry, item_count: usize) -> ToolResult<Vec<PagePosition>> {
    Ok(Paginator::new(geometry)?.layout(item_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;

    fn serial_geometry() -> LayoutGeometry {
        LayoutGeometry::a4(3, 8, 60, 20, 10)
    }

    #[test]
    fn test_first_item_at_margins() {
        let p = Paginator::new(serial_geometry()).unwrap();
        let pos = p.position(0);
        assert_eq!(pos.page_index, 0);
        assert_eq!((pos.column, pos.row), (0, 0));
        assert!((pos.x - 7.5).abs() < 1e-9);
        assert!((pos.y - 57.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_walk() {
        let p = Paginator::new(serial_geometry()).unwrap();

        let pos = p.position(4);
        assert_eq!((pos.column, pos.row), (1, 1));
        assert!((pos.x - (7.5 + 67.5)).abs() < 1e-9);
        let vm = 57.0 / 9.0;
        assert!((pos.y - (vm + 30.0 + vm)).abs() < 1e-9);

        let last = p.position(23);
        assert_eq!(last.page_index, 0);
        assert_eq!((last.column, last.row), (2, 7));

        let next = p.position(24);
        assert_eq!(next.page_index, 1);
        assert_eq!((next.column, next.row), (0, 0));
        assert_eq!(next.x, p.position(0).x);
        assert_eq!(next.y, p.position(0).y);
    }

    #[test]
    fn test_page_breaks() {
        let p = Paginator::new(serial_geometry()).unwrap();
        assert!(!p.starts_new_page(0));
        assert!(!p.starts_new_page(23));
        assert!(p.starts_new_page(24));
        assert!(p.starts_new_page(48));
        assert_eq!(p.page_count(0), 1);
        assert_eq!(p.page_count(24), 1);
        assert_eq!(p.page_count(25), 2);
    }

    #[test]
    fn test_overflow_is_not_an_error() {
        let p = Paginator::new(LayoutGeometry::a4(4, 2, 100, 20, 10)).unwrap();
        assert!(p.overflows());
        assert!(p.horizontal_margin() < 0.0);
        assert_eq!(p.layout(3).len(), 3);
    }

    #[test]
    fn test_zero_geometry_rejected() {
        let err = paginate(LayoutGeometry::a4(3, 0, 60, 20, 10), 5).unwrap_err();
        assert!(matches!(err, ToolError::InvalidConfig(_)));
    }
}
