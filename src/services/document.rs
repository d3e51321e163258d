//! PDF sheet writer.
//!
//! Rasters are drawn as filled rectangles (one per dark run, with identical rows
//! merged into bands) so no image encoding is needed. Positions come from the
//! [`Paginator`](crate::services::layout::Paginator) and are measured from the
//! top-left of the page; they are flipped to PDF's bottom-left origin here.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};

use crate::error::{ToolError, ToolResult};
use crate::models::{LayoutGeometry, PagePosition};
use crate::services::barcode::{BarcodeRaster, RenderedItem};
use crate::services::layout::Paginator;

const PT_TO_MM: f64 = 0.352_778;

/// Helvetica-Bold advance widths for `' '..='~'`, in 1/1000 em (standard AFM metrics).
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // '0'..'?'
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 'P'..'_'
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // '`'..'o'
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 'p'..'~'
];

/// Width used for characters outside printable ASCII.
const FALLBACK_GLYPH_WIDTH: u16 = 556;

fn glyph_width(c: char) -> u16 {
    (c as u32)
        .checked_sub(0x20)
        .and_then(|i| HELVETICA_BOLD_WIDTHS.get(i as usize))
        .copied()
        .unwrap_or(FALLBACK_GLYPH_WIDTH)
}

/// Caption font and baseline placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptionStyle {
    pub font_size: f32,
    /// Distance from the bottom edge of the barcode to the caption baseline, in mm.
    pub baseline_offset: f64,
}

impl CaptionStyle {
    /// Small caption right under the text margin (serial and PDF417 sheets).
    pub fn compact(text_margin: f64) -> Self {
        Self {
            font_size: 10.0,
            baseline_offset: text_margin,
        }
    }

    /// Large caption centred in a 15 mm text band (location and pallet sheets).
    pub fn large(font_size: f32) -> Self {
        Self {
            font_size,
            baseline_offset: 15.0 / 2.0,
        }
    }

    /// Rendered width of `text` in mm, from per-glyph Helvetica-Bold metrics.
    ///
    /// Kerning is ignored. Characters outside printable ASCII count as a digit's width.
    pub fn text_width(&self, text: &str) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(glyph_width(c))).sum();
        f64::from(units) / 1000.0 * f64::from(self.font_size) * PT_TO_MM
    }
}

/// What to print under each symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionText {
    None,
    /// The item's own text.
    ItemText,
    /// The same text under every symbol.
    Fixed(String),
}

impl CaptionText {
    fn for_item(&self, item_text: &str) -> Option<String> {
        match self {
            CaptionText::None => None,
            CaptionText::ItemText => Some(item_text.to_string()),
            CaptionText::Fixed(text) if text.is_empty() => None,
            CaptionText::Fixed(text) => Some(text.clone()),
        }
    }
}

/// One symbol on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub position: PagePosition,
    pub raster: BarcodeRaster,
    pub caption: Option<String>,
}

/// Pair every rendered item with its position. Items without a raster keep
/// their slot but produce no placement.
pub fn place_items(
    paginator: &Paginator,
    items: Vec<RenderedItem>,
    caption: &CaptionText,
) -> Vec<Placement> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let raster = item.raster?;
            Some(Placement {
                position: paginator.position(index),
                caption: caption.for_item(&item.text),
                raster,
            })
        })
        .collect()
}

/// Build a PDF with `placements` drawn on pages of `geometry`'s size.
///
/// Pages are created up to the highest page index referenced, so gaps that
/// land on an otherwise empty page still advance the sheet.
pub fn write_sheet(
    title: &str,
    geometry: &LayoutGeometry,
    placements: &[Placement],
    style: CaptionStyle,
) -> ToolResult<Vec<u8>> {
    let page_width = f64::from(geometry.page_width);
    let page_height = f64::from(geometry.page_height);

    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(page_width as f32),
        Mm(page_height as f32),
        "Layer 1",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ToolError::export(title, e))?;

    let page_count = placements
        .iter()
        .map(|p| p.position.page_index + 1)
        .max()
        .unwrap_or(1);

    let mut layers = Vec::with_capacity(page_count);
    layers.push(doc.get_page(first_page).get_layer(first_layer));
    for _ in 1..page_count {
        let (page, layer) = doc.add_page(
            Mm(page_width as f32),
            Mm(page_height as f32),
            "Layer 1",
        );
        layers.push(doc.get_page(page).get_layer(layer));
    }

    for layer in &layers {
        layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }

    let box_width = f64::from(geometry.barcode_width);
    let box_height = f64::from(geometry.barcode_height);

    for placement in placements {
        let layer = &layers[placement.position.page_index];
        draw_raster(
            layer,
            &placement.raster,
            placement.position.x,
            placement.position.y,
            box_width,
            box_height,
            page_height,
        );

        if let Some(caption) = &placement.caption {
            draw_caption(
                layer,
                &font,
                caption,
                &placement.position,
                box_width,
                box_height,
                page_height,
                style,
            );
        }
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| ToolError::export(title, e))?;

    tracing::debug!(
        "Wrote {} placements on {} page(s) for {}",
        placements.len(),
        page_count,
        title
    );

    Ok(bytes)
}

fn draw_raster(
    layer: &PdfLayerReference,
    raster: &BarcodeRaster,
    x: f64,
    y_top: f64,
    width: f64,
    height: f64,
    page_height: f64,
) {
    let module_width = width / f64::from(raster.width());
    let module_height = height / f64::from(raster.height());

    for (first_row, row_count) in raster.row_bands() {
        let top = page_height - (y_top + f64::from(first_row) * module_height);
        let bottom = top - f64::from(row_count) * module_height;

        for (start, len) in raster.dark_runs(first_row) {
            let left = x + f64::from(start) * module_width;
            let right = left + f64::from(len) * module_width;
            layer.add_rect(Rect::new(
                Mm(left as f32),
                Mm(bottom as f32),
                Mm(right as f32),
                Mm(top as f32),
            ));
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_caption(
    layer: &PdfLayerReference,
    font: &IndirectFontRef,
    text: &str,
    position: &PagePosition,
    box_width: f64,
    box_height: f64,
    page_height: f64,
    style: CaptionStyle,
) {
    let center = position.x + box_width / 2.0;
    let left = center - style.text_width(text) / 2.0;
    let baseline = page_height - (position.y + box_height + style.baseline_offset);

    layer.use_text(
        text,
        style.font_size,
        Mm(left as f32),
        Mm(baseline as f32),
        font,
    );
}
