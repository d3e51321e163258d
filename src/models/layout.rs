use serde::{Deserialize, Serialize};

use crate::error::{ToolError, ToolResult};

/// A4 page width in millimetres.
pub const A4_WIDTH_MM: u32 = 210;

/// A4 page height in millimetres.
pub const A4_HEIGHT_MM: u32 = 297;

/// Page and grid sizing for a barcode sheet, in millimetres.
///
/// `text_allowance` is the extra vertical space reserved under every barcode
/// for its caption. Tools differ here: the serial and PDF417 sheets reserve a
/// 10 mm text margin, the location and pallet sheets reserve 15 mm of text
/// height plus a 5 mm gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutGeometry {
    #[serde(default = "default_page_width")]
    pub page_width: u32,
    #[serde(default = "default_page_height")]
    pub page_height: u32,
    pub columns: u32,
    pub rows: u32,
    pub barcode_width: u32,
    pub barcode_height: u32,
    pub text_allowance: u32,
}

fn default_page_width() -> u32 {
    A4_WIDTH_MM
}

fn default_page_height() -> u32 {
    A4_HEIGHT_MM
}

impl LayoutGeometry {
    /// Geometry on an A4 page.
    pub fn a4(
        columns: u32,
        rows: u32,
        barcode_width: u32,
        barcode_height: u32,
        text_allowance: u32,
    ) -> Self {
        Self {
            page_width: A4_WIDTH_MM,
            page_height: A4_HEIGHT_MM,
            columns,
            rows,
            barcode_width,
            barcode_height,
            text_allowance,
        }
    }

    /// Check every dimension is positive.
    pub fn validate(&self) -> ToolResult<()> {
        let fields = [
            ("page width", self.page_width),
            ("page height", self.page_height),
            ("columns", self.columns),
            ("rows", self.rows),
            ("barcode width", self.barcode_width),
            ("barcode height", self.barcode_height),
            ("text allowance", self.text_allowance),
        ];

        for (name, value) in fields {
            if value == 0 {
                return Err(ToolError::invalid_config(format!(
                    "Layout {} must be a positive number.",
                    name
                )));
            }
        }

        Ok(())
    }

    /// `columns * rows`.
    pub fn items_per_page(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Where one item lands: page, grid cell, and top-left corner in millimetres
/// measured from the top-left of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePosition {
    pub page_index: usize,
    pub column: u32,
    pub row: u32,
    pub x: f64,
    pub y: f64,
}
