//! Dispatch document rendering.
//!
//! The pipeline hands a [`Report`] (ordered region groups plus the columns to
//! print) to a [`ReportRenderer`] and gets the finished document bytes back.
//! [`pdf::PdfRenderer`] is the landscape A4 implementation.

pub mod arabic;
pub mod font;
pub mod pdf;

use crate::error::Result;
use crate::regions::Region;
use crate::types::{Field, RegionGroup};

/// Brand printed in every section title.
pub const DEFAULT_BRAND: &str = "ECOMERG";

/// Everything a renderer needs for one document.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub groups: &'a [RegionGroup],
    /// Columns to print, in display order.
    pub columns: &'a [Field],
    /// Local calendar date shown in each section title.
    pub date: &'a str,
    pub brand: &'a str,
}

pub trait ReportRenderer {
    fn render(&self, report: &Report<'_>) -> Result<Vec<u8>>;
}

/// Section title: region, brand and date.
pub fn section_title(region: Region, brand: &str, date: &str) -> String {
    format!("{} | {} | {}", region.label(), brand, date)
}

/// Printed column width in points. The full set of columns fits a
/// landscape A4 page with 15pt margins.
pub fn column_width(field: Field) -> f32 {
    const POINTS_PER_CM: f32 = 28.35;
    let cm = match field {
        Field::OrderCode => 2.0,
        Field::CustomerName => 2.0,
        Field::Region => 1.5,
        Field::Address => 3.0,
        Field::City => 2.0,
        Field::Mobile => 3.0,
        Field::Status => 1.5,
        Field::PieceCount => 1.5,
        Field::Notes => 2.5,
        Field::ItemName => 3.5,
        Field::Color => 1.5,
        Field::Size => 1.5,
        Field::Quantity => 1.0,
        Field::TotalWithShipping => 1.5,
    };
    (cm * POINTS_PER_CM).max(15.0)
}
