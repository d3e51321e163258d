//! Barcode symbol rendering.
//!
//! Symbol encoding is delegated to `rxing` behind the [`SymbolRenderer`] trait so
//! the rest of the pipeline only ever sees a [`BarcodeRaster`]. Rendering failures
//! never abort a sheet: the failing item becomes an empty placeholder and is
//! counted in the [`RenderReport`].

use rxing::{BarcodeFormat, MultiFormatWriter, Writer};
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, ToolResult};

/// Symbologies the tools print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbology {
    Code128,
    Pdf417,
}

impl Symbology {
    pub fn is_linear(&self) -> bool {
        matches!(self, Symbology::Code128)
    }

    fn format(&self) -> BarcodeFormat {
        match self {
            Symbology::Code128 => BarcodeFormat::CODE_128,
            Symbology::Pdf417 => BarcodeFormat::PDF_417,
        }
    }
}

impl std::fmt::Display for Symbology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbology::Code128 => write!(f, "code128"),
            Symbology::Pdf417 => write!(f, "pdf417"),
        }
    }
}

/// Row-major grid of modules; `true` is a dark module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodeRaster {
    width: u32,
    height: u32,
    modules: Vec<bool>,
}

impl BarcodeRaster {
    /// Build a raster from row-major modules. Fails if the size does not match.
    pub fn new(width: u32, height: u32, modules: Vec<bool>) -> ToolResult<Self> {
        if width == 0 || height == 0 || modules.len() != width as usize * height as usize {
            return Err(ToolError::Render {
                text: String::new(),
                reason: format!(
                    "raster of {} modules does not match {}x{}",
                    modules.len(),
                    width,
                    height
                ),
            });
        }
        Ok(Self {
            width,
            height,
            modules,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.modules[(y * self.width + x) as usize]
    }

    pub fn row(&self, y: u32) -> &[bool] {
        let start = (y * self.width) as usize;
        &self.modules[start..start + self.width as usize]
    }

    /// `(start, length)` of every dark run in row `y`.
    pub fn dark_runs(&self, y: u32) -> Vec<(u32, u32)> {
        let mut runs = Vec::new();
        let mut start: Option<u32> = None;

        for (x, &dark) in self.row(y).iter().enumerate() {
            let x = x as u32;
            match (dark, start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    runs.push((s, x - s));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, self.width - s));
        }
        runs
    }

    /// Consecutive identical rows collapsed into `(first_row, row_count)` bands.
    pub fn row_bands(&self) -> Vec<(u32, u32)> {
        let mut bands: Vec<(u32, u32)> = Vec::new();
        for y in 0..self.height {
            match bands.last_mut() {
                Some((first, count)) if self.row(*first) == self.row(y) => *count += 1,
                _ => bands.push((y, 1)),
            }
        }
        bands
    }

    /// Encode as an 8-bit grayscale PNG.
    pub fn to_png(&self) -> ToolResult<Vec<u8>> {
        let pixels: Vec<u8> = self
            .modules
            .iter()
            .map(|&dark| if dark { 0 } else { 255 })
            .collect();

        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Grayscale);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| ToolError::export("barcode preview", e))?;
            writer
                .write_image_data(&pixels)
                .map_err(|e| ToolError::export("barcode preview", e))?;
            writer
                .finish()
                .map_err(|e| ToolError::export("barcode preview", e))?;
        }
        Ok(out)
    }
}

/// Renders one symbol to a raster.
///
/// `scale` is the pixel size of one module; `height` is the bar height in
/// modules for linear symbols and ignored for stacked ones.
pub trait SymbolRenderer {
    fn render(
        &self,
        symbology: Symbology,
        text: &str,
        scale: u32,
        height: u32,
    ) -> ToolResult<BarcodeRaster>;
}

/// [`SymbolRenderer`] backed by `rxing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RxingRenderer;

impl RxingRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl SymbolRenderer for RxingRenderer {
    fn render(
        &self,
        symbology: Symbology,
        text: &str,
        scale: u32,
        height: u32,
    ) -> ToolResult<BarcodeRaster> {
        let render_error = |reason: String| ToolError::Render {
            text: text.to_string(),
            reason,
        };

        if text.is_empty() {
            return Err(render_error("nothing to encode".to_string()));
        }

        let matrix = MultiFormatWriter::default()
            .encode(text, &symbology.format(), 0, 0)
            .map_err(|e| render_error(e.to_string()))?;

        // Crop the quiet zone the writer adds; the page layout supplies spacing.
        let (mw, mh) = (matrix.width(), matrix.height());
        let dark_cols: Vec<u32> = (0..mw)
            .filter(|&x| (0..mh).any(|y| matrix.get(x, y)))
            .collect();
        let dark_rows: Vec<u32> = (0..mh)
            .filter(|&y| (0..mw).any(|x| matrix.get(x, y)))
            .collect();
        let (Some(&left), Some(&right), Some(&top), Some(&bottom)) = (
            dark_cols.first(),
            dark_cols.last(),
            dark_rows.first(),
            dark_rows.last(),
        ) else {
            return Err(render_error("writer produced an empty symbol".to_string()));
        };

        let scale = scale.max(1);
        let symbol_width = right - left + 1;

        // Linear symbols come back one module tall; give them their bar height.
        let source_rows: Vec<u32> = if symbology.is_linear() {
            vec![top; height.max(1) as usize]
        } else {
            (top..=bottom).collect()
        };

        let width = symbol_width * scale;
        let mut modules = Vec::with_capacity((width as usize) * source_rows.len() * scale as usize);
        for &sy in &source_rows {
            let row: Vec<bool> = (0..width)
                .map(|x| matrix.get(left + x / scale, sy))
                .collect();
            for _ in 0..scale {
                modules.extend_from_slice(&row);
            }
        }

        BarcodeRaster::new(width, source_rows.len() as u32 * scale, modules)
    }
}

/// Parameters shared by every item of one sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest {
    pub symbology: Symbology,
    pub scale: u32,
    pub height: u32,
}

/// An item and its raster; `None` for gaps and failed renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedItem {
    pub text: String,
    pub raster: Option<BarcodeRaster>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub items: Vec<RenderedItem>,
    pub failures: usize,
}

impl RenderReport {
    pub fn rendered(&self) -> usize {
        self.items.iter().filter(|item| item.raster.is_some()).count()
    }
}

fn render_one(
    renderer: &dyn SymbolRenderer,
    request: RenderRequest,
    text: &str,
    failures: &mut usize,
) -> RenderedItem {
    if text.is_empty() {
        return RenderedItem {
            text: String::new(),
            raster: None,
        };
    }

    match renderer.render(request.symbology, text, request.scale, request.height) {
        Ok(raster) => RenderedItem {
            text: text.to_string(),
            raster: Some(raster),
        },
        Err(e) => {
            tracing::warn!("Skipping {} item: {}", request.symbology, e);
            *failures += 1;
            RenderedItem {
                text: String::new(),
                raster: None,
            }
        }
    }
}

/// Render every item, yielding to the runtime every `batch_size` items.
///
/// The result has exactly one entry per input item so layout slots are kept.
pub async fn render_items(
    renderer: &dyn SymbolRenderer,
    request: RenderRequest,
    items: &[String],
    batch_size: usize,
) -> RenderReport {
    let batch_size = batch_size.max(1);
    let mut report = RenderReport {
        items: Vec::with_capacity(items.len()),
        failures: 0,
    };

    for chunk in items.chunks(batch_size) {
        for text in chunk {
            let item = render_one(renderer, request, text, &mut report.failures);
            report.items.push(item);
        }
        tokio::task::yield_now().await;
    }

    tracing::debug!(
        "Rendered {} {} items ({} failed)",
        report.rendered(),
        request.symbology,
        report.failures
    );

    report
}

/// The first few rendered items shown before export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub items: Vec<RenderedItem>,
    pub total: usize,
    pub failures: usize,
}

impl Preview {
    /// Note shown when the preview is truncated.
    pub fn note(&self) -> Option<String> {
        preview_note(self.items.len(), self.total)
    }
}

/// Note for a preview showing `shown` of `total` items, if it is truncated.
pub fn preview_note(shown: usize, total: usize) -> Option<String> {
    (total > shown).then(|| {
        format!(
            "Showing {} of {} barcodes in preview. All {} barcodes will be included in the PDF.",
            shown, total, total
        )
    })
}

/// Render at most `limit` items for preview. Gap items are not shown.
pub fn preview(
    renderer: &dyn SymbolRenderer,
    request: RenderRequest,
    items: &[String],
    limit: usize,
) -> Preview {
    let mut failures = 0;
    let shown: Vec<RenderedItem> = items
        .iter()
        .filter(|text| !text.is_empty())
        .take(limit)
        .map(|text| render_one(renderer, request, text, &mut failures))
        .collect();

    Preview {
        items: shown,
        total: items.iter().filter(|text| !text.is_empty()).count(),
        failures,
    }
}
