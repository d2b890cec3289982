use crate::error::{DispatchError, Result};
use crate::types::RawTable;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub files: usize,
    pub tables: usize,
    pub total_rows: usize,
}

/// Read every input file into tables, keeping file and sheet order.
///
/// Workbooks contribute one table per sheet; CSV files contribute one table.
/// Any unreadable file aborts the run.
pub fn load_inputs(paths: &[PathBuf]) -> Result<(Vec<RawTable>, LoadReport)> {
    let mut tables = Vec::new();
    let mut report = LoadReport::default();
    for path in paths {
        let loaded = load_file(path)?;
        report.files += 1;
        report.tables += loaded.len();
        report.total_rows += loaded.iter().map(|t| t.rows.len()).sum::<usize>();
        tables.extend(loaded);
    }
    info!(
        files = report.files,
        tables = report.tables,
        rows = report.total_rows,
        "inputs loaded"
    );
    Ok((tables, report))
}

pub fn load_file(path: &Path) -> Result<Vec<RawTable>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path),
        "csv" => Ok(vec![load_csv(path)?]),
        _ => Err(DispatchError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// One table per sheet; the first row of each sheet is its header.
pub fn load_workbook(path: &Path) -> Result<Vec<RawTable>> {
    let mut workbook = open_workbook_auto(path).map_err(|e| DispatchError::workbook(path, e))?;
    let file_name = display_name(path);
    let mut tables = Vec::new();
    for sheet in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&sheet)
            .map_err(|e| DispatchError::workbook(path, format!("sheet '{sheet}': {e}")))?;
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            debug!(source = %file_name, sheet = %sheet, "empty sheet skipped");
            continue;
        };
        let headers = normalize_headers(header_row.iter().map(|c| c.to_string()).collect());
        let rows: Vec<Vec<Option<String>>> = rows
            .map(|row| row.iter().map(cell_text).collect())
            .collect();
        debug!(
            source = %file_name,
            sheet = %sheet,
            columns = headers.len(),
            rows = rows.len(),
            "sheet read"
        );
        tables.push(RawTable {
            source: format!("{file_name}#{sheet}"),
            headers,
            rows,
        });
    }
    Ok(tables)
}

pub fn load_csv(path: &Path) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    let headers = normalize_headers(headers);
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|v| (!v.is_empty()).then(|| v.to_string()))
                .collect(),
        );
    }
    let source = display_name(path);
    debug!(source = %source, columns = headers.len(), rows = rows.len(), "csv read");
    Ok(RawTable {
        source,
        headers,
        rows,
    })
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        other => {
            let text = other.to_string();
            (!text.is_empty()).then_some(text)
        }
    }
}

/// Trim header labels, name blank ones by position and suffix duplicates
/// (`.1`, `.2`, ...) so every column label in a table is unique.
pub fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, label)| {
            let label = label.trim();
            let base = if label.is_empty() {
                format!("Unnamed: {i}")
            } else {
                label.to_string()
            };
            let count = seen.entry(base.clone()).or_insert(0);
            let unique = if *count == 0 {
                base
            } else {
                format!("{base}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_trimmed_and_deduplicated() {
        let headers = normalize_headers(vec![
            " المدينة ".into(),
            "".into(),
            "Notes".into(),
            "Notes".into(),
            "Notes".into(),
        ]);
        assert_eq!(
            headers,
            vec!["المدينة", "Unnamed: 1", "Notes", "Notes.1", "Notes.2"]
        );
    }

    #[test]
    fn empty_cells_are_absent() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String(String::new())), None);
        assert_eq!(cell_text(&Data::String(" x ".into())), Some(" x ".into()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".into()));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("orders.pdf")).unwrap_err();
        assert!(matches!(err, DispatchError::UnsupportedFormat(_)));
    }
}
