//! End-to-end tests: exports in, grouped records and a PDF out

use dispatch_sheets::loader::load_inputs;
use dispatch_sheets::normalize::prepare;
use dispatch_sheets::output::write_groups_csv;
use dispatch_sheets::regions::Region;
use dispatch_sheets::render::font::FontFace;
use dispatch_sheets::render::pdf::PdfRenderer;
use dispatch_sheets::render::{Report, ReportRenderer};
use dispatch_sheets::reports::group_by_region;
use dispatch_sheets::types::{Field, STATUS_CONFIRMED};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_merge_keeps_every_non_empty_row() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        common::first_export(temp_dir.path()),
        common::second_export(temp_dir.path()),
    ];
    let (tables, report) = load_inputs(&paths).unwrap();
    let merged = prepare(&tables);

    // One fully empty line in the first export is dropped
    assert_eq!(report.total_rows, 6);
    assert_eq!(merged.records.len(), 5);
}

#[test]
fn test_item_lines_inherit_order_details() {
    let temp_dir = TempDir::new().unwrap();
    let (tables, _) = load_inputs(&[common::first_export(temp_dir.path())]).unwrap();
    let merged = prepare(&tables);

    let shoes = &merged.records[1];
    assert_eq!(shoes.item_name.as_deref(), Some("Shoes"));
    assert_eq!(shoes.order_code.as_deref(), Some("A-200"));
    assert_eq!(shoes.customer_name.as_deref(), Some("Mona"));
    assert_eq!(shoes.city.as_deref(), Some("الجهراء"));
    assert_eq!(shoes.region, Some(Region::Jahra));
    // Mobile is not a filled column
    assert_eq!(shoes.mobile, None);
    assert_eq!(merged.records[0].status.as_deref(), Some(STATUS_CONFIRMED));
}

#[test]
fn test_groups_follow_first_seen_region_order() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        common::first_export(temp_dir.path()),
        common::second_export(temp_dir.path()),
    ];
    let (tables, _) = load_inputs(&paths).unwrap();
    let groups = group_by_region(prepare(&tables).records);

    let regions: Vec<Region> = groups.iter().map(|g| g.region).collect();
    assert_eq!(regions, vec![Region::Jahra, Region::Hawalli, Region::Other]);

    let jahra: Vec<_> = groups[0]
        .records
        .iter()
        .map(|r| (r.order_code.as_deref(), r.item_name.as_deref()))
        .collect();
    assert_eq!(
        jahra,
        vec![
            (Some("A-150"), Some("Scarf")),
            (Some("A-200"), Some("Shirt")),
            (Some("A-200"), Some("Shoes")),
        ]
    );
    assert_eq!(groups[2].records[0].city.as_deref(), Some("Cairo"));
}

#[test]
fn test_pdf_has_one_page_per_region() {
    let temp_dir = TempDir::new().unwrap();
    let paths = vec![
        common::first_export(temp_dir.path()),
        common::second_export(temp_dir.path()),
    ];
    let (tables, _) = load_inputs(&paths).unwrap();
    let merged = prepare(&tables);
    let columns = merged.display_fields();
    let groups = group_by_region(merged.records);

    let report = Report {
        groups: &groups,
        columns: &columns,
        date: "2026-10-18",
        brand: "ECOMERG",
    };
    let bytes = PdfRenderer::new(FontFace::Builtin).render(&report).unwrap();
    assert!(bytes.starts_with(b"%PDF-1.5"));

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 3);
}

#[test]
fn test_csv_export_uses_display_formatting() {
    let temp_dir = TempDir::new().unwrap();
    let (tables, _) = load_inputs(&[common::first_export(temp_dir.path())]).unwrap();
    let merged = prepare(&tables);
    let columns = merged.display_fields();
    assert_eq!(
        columns,
        vec![
            Field::OrderCode,
            Field::CustomerName,
            Field::Region,
            Field::City,
            Field::Mobile,
            Field::Status,
            Field::ItemName,
            Field::Quantity,
        ]
    );
    let groups = group_by_region(merged.records);

    let out = temp_dir.path().join("merged.csv");
    write_groups_csv(&out, &columns, &groups).unwrap();

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    // Jahra order first; float mobile and quantity are printed as integers
    assert_eq!(&rows[0][0], "A-200");
    assert_eq!(&rows[0][2], "منطقة الجهراء");
    assert_eq!(&rows[0][4], "96550001234");
    assert_eq!(&rows[0][7], "2");
    assert_eq!(&rows[1][4], "");
    assert_eq!(&rows[2][0], "A-100");
}
