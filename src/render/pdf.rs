//! Landscape A4 PDF output.
//!
//! Each region group becomes one section: a centered title line followed by
//! a bordered table whose header row is highlighted and repeated on every
//! page. Sections always start on a new page. Cell text is wrapped to the
//! column width and centered horizontally and vertically.

use super::arabic::{shape, visual_order};
use super::font::FontFace;
use super::{column_width, section_title, Report, ReportRenderer};
use crate::error::Result;
use crate::types::{Field, RegionGroup};
use crate::util::format_cell;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object};
use std::collections::BTreeMap;
use tracing::debug;

pub const PAGE_WIDTH: f32 = 841.89;
pub const PAGE_HEIGHT: f32 = 595.28;
pub const MARGIN: f32 = 15.0;

const TITLE_SIZE: f32 = 14.0;
const HEADER_SIZE: f32 = 10.0;
const BODY_SIZE: f32 = 9.0;
const LEADING: f32 = 1.2;
const TITLE_GAP: f32 = 14.0;
const CELL_PAD_X: f32 = 6.0;
const CELL_PAD_Y: f32 = 3.0;
const GRID_WIDTH: f32 = 0.25;
// #64B5F6
const HEADER_BACKGROUND: [f32; 3] = [100.0 / 255.0, 181.0 / 255.0, 246.0 / 255.0];
const FONT_RESOURCE: &str = "F1";

pub struct PdfRenderer {
    font: FontFace,
}

impl PdfRenderer {
    pub fn new(font: FontFace) -> Self {
        PdfRenderer { font }
    }
}

impl ReportRenderer for PdfRenderer {
    fn render(&self, report: &Report<'_>) -> Result<Vec<u8>> {
        let mut canvas = Canvas::new(&self.font);
        for group in report.groups {
            canvas.section(report, group);
        }
        let pages = canvas.page_count();
        let bytes = canvas.into_pdf()?;
        debug!(pages, bytes = bytes.len(), "pdf rendered");
        Ok(bytes)
    }
}

/// A laid-out table row: wrapped, shaped lines per cell in logical order.
struct Row {
    cells: Vec<Vec<String>>,
    size: f32,
    height: f32,
}

struct Canvas<'f> {
    font: &'f FontFace,
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    /// Top of the free area on the current page.
    y: f32,
    used_glyphs: BTreeMap<u16, char>,
}

impl<'f> Canvas<'f> {
    fn new(font: &'f FontFace) -> Self {
        Canvas {
            font,
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
            used_glyphs: BTreeMap::new(),
        }
    }

    fn page_count(&self) -> usize {
        self.pages.len() + usize::from(!self.ops.is_empty())
    }

    fn break_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn section(&mut self, report: &Report<'_>, group: &RegionGroup) {
        if !self.ops.is_empty() {
            self.break_page();
        }

        let title = shape(&section_title(group.region, report.brand, report.date));
        let title_width = PAGE_WIDTH - 2.0 * MARGIN;
        for line in wrap(self.font, &title, title_width, TITLE_SIZE) {
            let baseline = self.y - TITLE_SIZE;
            self.centered_line(&line, MARGIN, title_width, baseline, TITLE_SIZE);
            self.y -= TITLE_SIZE * LEADING;
        }
        self.y -= TITLE_GAP;

        let widths: Vec<f32> = report.columns.iter().map(|f| column_width(*f)).collect();
        let left = (PAGE_WIDTH - widths.iter().sum::<f32>()) / 2.0;
        let labels = report.columns.iter().map(|f| f.label().to_string()).collect();
        let header = self.layout_row(labels, &widths, HEADER_SIZE);
        self.draw_row(&header, left, &widths, true);

        let mut rows_on_page = 0usize;
        for record in &group.records {
            let cells = report
                .columns
                .iter()
                .map(|f: &Field| format_cell(record.get(*f), *f))
                .collect();
            let row = self.layout_row(cells, &widths, BODY_SIZE);
            if rows_on_page > 0 && self.y - row.height < MARGIN {
                self.break_page();
                self.draw_row(&header, left, &widths, true);
                rows_on_page = 0;
            }
            self.draw_row(&row, left, &widths, false);
            rows_on_page += 1;
        }
    }

    fn layout_row(&self, cells: Vec<String>, widths: &[f32], size: f32) -> Row {
        let cells: Vec<Vec<String>> = cells
            .iter()
            .zip(widths)
            .map(|(text, width)| wrap(self.font, &shape(text), width - 2.0 * CELL_PAD_X, size))
            .collect();
        let lines = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
        Row {
            height: lines as f32 * size * LEADING + 2.0 * CELL_PAD_Y,
            cells,
            size,
        }
    }

    fn draw_row(&mut self, row: &Row, left: f32, widths: &[f32], header: bool) {
        let top = self.y;
        let bottom = top - row.height;
        let total: f32 = widths.iter().sum();

        if header {
            let [r, g, b] = HEADER_BACKGROUND;
            self.ops.push(Operation::new("q", vec![]));
            self.ops.push(Operation::new("rg", vec![real(r), real(g), real(b)]));
            self.ops.push(rect(left, bottom, total, row.height));
            self.ops.push(Operation::new("f", vec![]));
            self.ops.push(Operation::new("Q", vec![]));
        }

        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new("w", vec![real(GRID_WIDTH)]));
        self.ops.push(Operation::new("RG", vec![real(0.0), real(0.0), real(0.0)]));
        let mut x = left;
        for width in widths {
            self.ops.push(rect(x, bottom, *width, row.height));
            x += width;
        }
        self.ops.push(Operation::new("S", vec![]));
        self.ops.push(Operation::new("Q", vec![]));

        let leading = row.size * LEADING;
        let mut x = left;
        for (lines, width) in row.cells.iter().zip(widths) {
            let block = lines.len() as f32 * leading;
            let block_top = top - (row.height - block) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                let baseline = block_top - i as f32 * leading - row.size;
                self.centered_line(line, x, *width, baseline, row.size);
            }
            x += width;
        }
        self.y = bottom;
    }

    /// Draw one logical-order line centered in `[x, x + width]`.
    fn centered_line(&mut self, line: &str, x: f32, width: f32, baseline: f32, size: f32) {
        let visual = visual_order(line);
        if visual.is_empty() {
            return;
        }
        let text_x = x + (width - self.font.text_width(&visual, size)) / 2.0;
        let operand = self.font.encode(&visual, &mut self.used_glyphs);
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new("Tf", vec![Object::from(FONT_RESOURCE), real(size)]));
        self.ops.push(Operation::new("Td", vec![real(text_x), real(baseline)]));
        self.ops.push(Operation::new("Tj", vec![operand]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn into_pdf(mut self) -> Result<Vec<u8>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.pages.push(std::mem::take(&mut self.ops));
        }

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = self.font.write_to(&mut doc, &self.used_glyphs);
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { FONT_RESOURCE => font_id },
        });

        let mut kids = Vec::with_capacity(self.pages.len());
        for operations in self.pages {
            let content = Content { operations };
            let content_id = doc.add_object(lopdf::Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(Object::Reference(page_id));
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
                "Resources" => resources_id,
                "MediaBox" => vec![real(0.0), real(0.0), real(PAGE_WIDTH), real(PAGE_HEIGHT)],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer)?;
        Ok(buffer)
    }
}

/// Greedy word wrap to `max_width`. Words wider than a line are broken
/// between characters. Runs of whitespace collapse to one space.
fn wrap(font: &FontFace, text: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if font.text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        for c in word.chars() {
            current.push(c);
            if current.chars().count() > 1 && font.text_width(&current, size) > max_width {
                current.pop();
                lines.push(std::mem::replace(&mut current, c.to_string()));
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

fn rect(x: f32, y: f32, width: f32, height: f32) -> Operation {
    Operation::new("re", vec![real(x), real(y), real(width), real(height)])
}
