use crate::error::Result;
use crate::types::{Field, RegionGroup};
use crate::util::format_cell;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

/// File name of the dispatch document for a given local date.
pub fn document_file_name(date: &str) -> String {
    format!("سواقين ايكوميرج - {date}.pdf")
}

/// Where the document goes: an explicit path wins over the directory default.
pub fn document_path(explicit: Option<&Path>, out_dir: &Path, date: &str) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => out_dir.join(document_file_name(date)),
    }
}

/// Write the grouped records as CSV: one header row of column labels, then
/// every record in print order with display formatting applied.
pub fn write_groups_csv(path: &Path, columns: &[Field], groups: &[RegionGroup]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(columns.iter().map(|f| f.label()))?;
    for record in groups.iter().flat_map(|g| &g.records) {
        wtr.write_record(columns.iter().map(|f| format_cell(record.get(*f), *f)))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
    if rows.len() > max_rows {
        println!("({} more rows not shown)\n", rows.len() - max_rows);
    }
}
