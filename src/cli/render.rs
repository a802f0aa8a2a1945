//! Draw a `Layout` and write the result to disk
//!
//! `draw` walks the blocks once and emits primitive drawing calls to a
//! `Canvas`. Coordinates handed to a canvas are in millimeters from the
//! top-left corner of the page; `PdfCanvas` flips them to the bottom-left
//! origin of PDF.

use printpdf::{IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rect};
use std::{
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

use crate::cli::font::Typeface;
use crate::cli::layout::{
    Align, Border, Cell, Layout, Op, Rgb, Style, BLACK, MARGIN_LEFT, MARGIN_RIGHT, MARGIN_TOP,
    PAGE_HEIGHT, PAGE_WIDTH,
};
use crate::lib::{error::Error, invoice::Invoice};

/// Space between the edge of a cell and its text
const PADDING: f32 = 1.0;
const PT_TO_MM: f32 = 25.4 / 72.0;
/// Stroke width of borders and rules, in points
const LINE_WIDTH: f32 = 0.5;

/// Anything that can receive drawing primitives
pub trait Canvas {
    /// Write `text` starting at `x` on the line `baseline`
    fn text(&mut self, x: f32, baseline: f32, text: &str, style: &Style);
    /// Paint a rectangle whose top-left corner is `(x, y)`
    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
    /// Polyline through `points`, back to the first one if `closed`
    fn stroke(&mut self, points: &[(f32, f32)], closed: bool, color: Rgb);
}

/// Position of the next cell
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cursor {
    x: f32,
    y: f32,
}

impl Cursor {
    fn newline(&mut self, height: f32) {
        self.x = MARGIN_LEFT;
        self.y += height;
    }
}

/// Interpret every block of `layout` in order
pub fn draw<C>(layout: &Layout, face: &Typeface, canvas: &mut C)
where C: Canvas {
    let mut cursor = Cursor { x: MARGIN_LEFT, y: MARGIN_TOP };
    for block in &layout.blocks {
        tracing::trace!(section = ?block.section, x = cursor.x, y = cursor.y, "drawing block");
        for op in &block.ops {
            match op {
                Op::Row { cells, advance } => {
                    for cell in cells {
                        let width = cell
                            .width
                            .unwrap_or(PAGE_WIDTH - MARGIN_RIGHT - cursor.x)
                            .max(0.0);
                        draw_cell(canvas, face, cell, cursor.x, cursor.y, width);
                        cursor.x += width;
                    }
                    if *advance {
                        let height = cells.iter().map(|c| c.height).fold(0.0, f32::max);
                        cursor.newline(height);
                    }
                }
                Op::Goto { x, y } => cursor = Cursor { x: *x, y: *y },
                Op::Skip(height) => cursor.newline(*height),
                Op::Rule(color) => canvas.stroke(
                    &[(MARGIN_LEFT, cursor.y), (PAGE_WIDTH - MARGIN_RIGHT, cursor.y)],
                    false,
                    *color,
                ),
            }
        }
    }
}

fn draw_cell<C>(canvas: &mut C, face: &Typeface, cell: &Cell, x: f32, y: f32, w: f32)
where C: Canvas {
    let h = cell.height;
    if let Some(color) = cell.fill {
        canvas.fill(x, y, w, h, color);
    }
    match cell.border {
        Border::None => {}
        Border::All => canvas.stroke(&[(x, y), (x + w, y), (x + w, y + h), (x, y + h)], true, BLACK),
        Border::Open => canvas.stroke(&[(x, y), (x, y + h), (x + w, y + h), (x + w, y)], false, BLACK),
    }
    if cell.text.is_empty() {
        return;
    }
    let missing = face.missing(&cell.text, &cell.style);
    if !missing.is_empty() {
        tracing::warn!(text = %cell.text, ?missing, "characters not covered by the font");
    }
    let width = face.width(&cell.text, &cell.style);
    let tx = match cell.align {
        Align::Left => x + PADDING,
        Align::Center => x + (w - width) / 2.0,
        Align::Right => x + w - PADDING - width,
    };
    // vertically centered on the cap height
    let baseline = y + h / 2.0 + 0.3 * cell.style.size * PT_TO_MM;
    canvas.text(tx, baseline, &cell.text, &cell.style);
}

/// Single-page PDF output
struct PdfCanvas {
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

fn pdf_color(Rgb(r, g, b): Rgb) -> printpdf::Color {
    printpdf::Color::Rgb(printpdf::Rgb::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        None,
    ))
}

fn pdf_point(x: f32, y: f32) -> Point {
    Point::new(Mm(x), Mm(PAGE_HEIGHT - y))
}

impl Canvas for PdfCanvas {
    fn text(&mut self, x: f32, baseline: f32, text: &str, style: &Style) {
        let font = if style.bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(pdf_color(style.color));
        self.layer.use_text(text, style.size, Mm(x), Mm(PAGE_HEIGHT - baseline), font);
    }

    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.layer.set_fill_color(pdf_color(color));
        self.layer.add_rect(
            Rect::new(Mm(x), Mm(PAGE_HEIGHT - y - h), Mm(x + w), Mm(PAGE_HEIGHT - y))
                .with_mode(printpdf::path::PaintMode::Fill),
        );
    }

    fn stroke(&mut self, points: &[(f32, f32)], closed: bool, color: Rgb) {
        self.layer.set_outline_color(pdf_color(color));
        self.layer.set_outline_thickness(LINE_WIDTH);
        self.layer.add_line(Line {
            points: points.iter().map(|&(x, y)| (pdf_point(x, y), false)).collect(),
            is_closed: closed,
        });
    }
}

/// Render `layout` as the bytes of a PDF document
pub fn to_pdf(layout: &Layout) -> Result<Vec<u8>, Error> {
    let fail = |e: String| Error::new("Cannot render document").with_text(e);
    let face = Typeface::load()?;
    let (doc, page, layer) =
        PdfDocument::new(layout.title.as_str(), Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let mut canvas = PdfCanvas {
        layer: doc.get_page(page).get_layer(layer),
        regular: doc
            .add_external_font(Typeface::file(false))
            .map_err(|e| fail(e.to_string()))?,
        bold: doc
            .add_external_font(Typeface::file(true))
            .map_err(|e| fail(e.to_string()))?,
    };
    draw(layout, &face, &mut canvas);
    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(|e| fail(e.to_string()))?;
    writer.into_inner().map_err(|e| fail(e.to_string()))
}

/// Lay out `inv`, render it and write it to `dir`
///
/// The document is first written to a temporary file in `dir`, then moved
/// to its final name, so that an interrupted run never leaves a truncated PDF.
pub fn save(inv: &Invoice, dir: &Path) -> Result<PathBuf, Error> {
    let bytes = to_pdf(&Layout::of(inv))?;
    let path = dir.join(inv.filename("pdf"));
    write_atomic(dir, &path, &bytes).map_err(|e| {
        Error::new("Cannot write document")
            .with_text(format!("Destination is '{}'", path.display()))
            .with_text(e)
            .with_hint("check that the output directory exists and is writable")
    })?;
    tracing::info!(path = %path.display(), size = bytes.len(), "document written");
    Ok(path)
}

fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
