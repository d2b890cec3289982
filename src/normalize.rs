// Merge and repair of uploaded order tables.
//
// Each step is a separate pass over the merged record sequence so its edge
// cases can be exercised on their own:
//
// 1. concatenate tables, dropping fully empty rows
// 2. harmonize the pending status token
// 3. forward-fill city, order code and customer name
// 4. backfill blank cities on item lines from the pre-fill city column
//
// Classification runs last and stamps every record with a region.
use crate::regions::{classify, Region};
use crate::types::{
    Field, MergedTable, OrderRecord, RawTable, PIECE_COUNT_ALIAS, STATUS_CONFIRMED,
    STATUS_PENDING,
};
use tracing::{debug, info, warn};

/// Fields that are forward-filled after merging.
pub const FILL_FIELDS: [Field; 3] = [Field::City, Field::OrderCode, Field::CustomerName];

/// Run the full merge/repair/classify pipeline over the loaded tables.
pub fn prepare(tables: &[RawTable]) -> MergedTable {
    let mut merged = concat_tables(tables);
    warn_missing_columns(&merged);

    let replaced = harmonize_status(&mut merged.records);
    if replaced > 0 {
        debug!(replaced, "pending statuses marked confirmed");
    }

    let original_city: Vec<Option<String>> =
        merged.records.iter().map(|r| r.city.clone()).collect();
    for field in FILL_FIELDS {
        if merged.has_field(field) {
            forward_fill(&mut merged.records, field);
        }
    }
    if merged.has_field(Field::City) {
        fill_absent(&mut merged.records, Field::City, "");
        if merged.has_field(Field::ItemName) {
            let backfilled = backfill_city(&mut merged.records, &original_city);
            if backfilled > 0 {
                debug!(backfilled, "item lines took the city of their order block");
            }
        }
    }

    classify_records(&mut merged);
    info!(rows = merged.records.len(), "orders normalized");
    merged
}

/// Append the rows of every table in input order.
///
/// Fully empty rows are dropped. The merged column set is the union of
/// source headers; a column missing from a table reads as absent there.
pub fn concat_tables(tables: &[RawTable]) -> MergedTable {
    let mut merged = MergedTable::default();
    for table in tables {
        let mapping: Vec<Option<Field>> = table
            .headers
            .iter()
            .map(|h| Field::from_label(h))
            .collect();
        for (header, field) in table.headers.iter().zip(&mapping) {
            let label = match field {
                Some(f) => f.label(),
                None => header.as_str(),
            };
            if !merged.columns.iter().any(|c| c == label) {
                merged.columns.push(label.to_string());
            }
        }
        let unknown = mapping.iter().filter(|m| m.is_none()).count();
        if unknown == mapping.len() && !mapping.is_empty() {
            warn!(source = %table.source, "no recognised order columns in table");
        }

        let mut dropped = 0usize;
        for row in &table.rows {
            let record = build_record(&table.headers, &mapping, row);
            if record.is_empty() {
                dropped += 1;
                continue;
            }
            merged.records.push(record);
        }
        debug!(
            source = %table.source,
            kept = table.rows.len() - dropped,
            dropped,
            "table merged"
        );
    }
    merged
}

fn build_record(
    headers: &[String],
    mapping: &[Option<Field>],
    row: &[Option<String>],
) -> OrderRecord {
    let mut record = OrderRecord::default();
    for ((header, field), cell) in headers.iter().zip(mapping).zip(row) {
        let Some(value) = cell.clone() else {
            continue;
        };
        match field {
            // An explicit piece-count column wins over the long-form alias.
            Some(Field::PieceCount) if header == PIECE_COUNT_ALIAS => {
                record.piece_count.get_or_insert(value);
            }
            Some(Field::PieceCount) => record.piece_count = Some(value),
            // Regions are always recomputed from the city.
            Some(Field::Region) => {
                record.extra.insert(header.clone(), value);
            }
            Some(field) => {
                if let Some(slot) = record.slot_mut(*field) {
                    *slot = Some(value);
                }
            }
            None => {
                record.extra.insert(header.clone(), value);
            }
        }
    }
    record
}

/// Replace the pending status token with the confirmed one. Exact match only.
pub fn harmonize_status(records: &mut [OrderRecord]) -> usize {
    let mut replaced = 0;
    for record in records.iter_mut() {
        if record.status.as_deref() == Some(STATUS_PENDING) {
            record.status = Some(STATUS_CONFIRMED.to_string());
            replaced += 1;
        }
    }
    replaced
}

/// Carry the last present value of `field` forward over absent cells.
/// Leading absent cells stay absent.
pub fn forward_fill(records: &mut [OrderRecord], field: Field) {
    let mut last: Option<String> = None;
    for record in records.iter_mut() {
        let Some(slot) = record.slot_mut(field) else {
            return;
        };
        match slot {
            Some(value) => last = Some(value.clone()),
            None => *slot = last.clone(),
        }
    }
}

/// Replace absent cells of `field` with `value`.
pub fn fill_absent(records: &mut [OrderRecord], field: Field, value: &str) {
    for record in records.iter_mut() {
        if let Some(slot) = record.slot_mut(field) {
            slot.get_or_insert_with(|| value.to_string());
        }
    }
}

/// Give item lines with a blank city the city of their order block.
///
/// `original_city` is the city column as merged, before forward-filling.
/// For each record with a non-blank item name and a blank city, the city
/// becomes the nearest preceding non-blank entry of `original_city`.
/// Returns the number of records changed.
pub fn backfill_city(records: &mut [OrderRecord], original_city: &[Option<String>]) -> usize {
    let mut last_city: Option<&str> = None;
    let mut changed = 0;
    for (record, original) in records.iter_mut().zip(original_city) {
        if let Some(city) = original.as_deref().filter(|c| !is_blank(c)) {
            last_city = Some(city);
        }
        let has_item = record.item_name.as_deref().is_some_and(|v| !is_blank(v));
        let city_blank = record.city.as_deref().map_or(true, is_blank);
        if has_item && city_blank {
            if let Some(city) = last_city {
                record.city = Some(city.to_string());
                changed += 1;
            }
        }
    }
    changed
}

/// Stamp every record with the region of its city.
pub fn classify_records(merged: &mut MergedTable) {
    for record in merged.records.iter_mut() {
        record.region = Some(classify(record.city.as_deref()));
    }
    if !merged.has_field(Field::Region) {
        merged.columns.push(Field::Region.label().to_string());
    }
    let unclassified = merged
        .records
        .iter()
        .filter(|r| r.region == Some(Region::Other))
        .count();
    if unclassified > 0 {
        debug!(unclassified, "records without a known city");
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn warn_missing_columns(merged: &MergedTable) {
    if merged.records.is_empty() {
        return;
    }
    if !merged.has_field(Field::City) {
        warn!(
            column = Field::City.label(),
            "city column not found in any table; every order is classified as {}",
            Region::Other
        );
    }
    if !merged.has_field(Field::OrderCode) {
        warn!(
            column = Field::OrderCode.label(),
            "order code column not found in any table; rows keep input order within a region"
        );
    }
    if !merged.has_field(Field::CustomerName) {
        warn!(
            column = Field::CustomerName.label(),
            "customer column not found in any table; customer fill skipped"
        );
    }
    if merged.has_field(Field::City) && !merged.has_field(Field::ItemName) {
        warn!(
            column = Field::ItemName.label(),
            "item column not found in any table; item-line city backfill skipped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn table(headers: &[&str], rows: &[&[Option<&str>]]) -> RawTable {
        RawTable {
            source: "test".into(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        }
    }

    fn cities(records: &[OrderRecord]) -> Vec<Option<&str>> {
        records.iter().map(|r| r.city.as_deref()).collect()
    }

    #[test]
    fn concat_drops_empty_rows_and_unions_columns() {
        let a = table(
            &["كود الاوردر", "المدينة"],
            &[&[Some("1"), Some("حولي")], &[None, None], &[Some("2"), None]],
        );
        let b = table(
            &["المدينة", "Tracking"],
            &[&[None, Some("T-9")], &[None, None]],
        );
        let merged = concat_tables(&[a, b]);
        assert_eq!(merged.records.len(), 3);
        assert_eq!(merged.columns, vec!["كود الاوردر", "المدينة", "Tracking"]);
        assert_eq!(merged.records[2].order_code, None);
        assert_eq!(merged.records[2].extra.get("Tracking").map(String::as_str), Some("T-9"));
    }

    #[test]
    fn piece_count_alias_is_renamed() {
        let t = table(&[PIECE_COUNT_ALIAS], &[&[Some("4.0")]]);
        let merged = concat_tables(&[t]);
        assert!(merged.has_field(Field::PieceCount));
        assert_eq!(merged.records[0].piece_count.as_deref(), Some("4.0"));
    }

    #[test]
    fn explicit_piece_count_beats_alias() {
        let t = table(&["عدد القطع", PIECE_COUNT_ALIAS], &[&[Some("2"), Some("9")], &[None, Some("5")]]);
        let merged = concat_tables(&[t]);
        assert_eq!(merged.records[0].piece_count.as_deref(), Some("2"));
        assert_eq!(merged.records[1].piece_count.as_deref(), Some("5"));
    }

    #[test]
    fn pending_status_becomes_confirmed() {
        let mut records = vec![
            OrderRecord { status: Some(STATUS_PENDING.into()), ..Default::default() },
            OrderRecord { status: Some(format!("{STATUS_PENDING} ")), ..Default::default() },
            OrderRecord { notes: Some(STATUS_PENDING.into()), ..Default::default() },
        ];
        assert_eq!(harmonize_status(&mut records), 1);
        assert_eq!(records[0].status.as_deref(), Some(STATUS_CONFIRMED));
        assert_eq!(records[1].status.as_deref(), Some("معلق "));
        assert_eq!(records[2].notes.as_deref(), Some(STATUS_PENDING));
    }

    #[test]
    fn forward_fill_carries_last_value() {
        let mut records: Vec<OrderRecord> = [None, Some("A"), None, Some(""), None]
            .iter()
            .map(|c| OrderRecord { order_code: c.map(str::to_string), ..Default::default() })
            .collect();
        forward_fill(&mut records, Field::OrderCode);
        let codes: Vec<_> = records.iter().map(|r| r.order_code.as_deref()).collect();
        assert_eq!(codes, vec![None, Some("A"), Some("A"), Some(""), Some("")]);
    }

    #[test]
    fn forward_fill_is_idempotent() {
        let mut once: Vec<OrderRecord> = [Some("X"), None, None, Some("Y"), None]
            .iter()
            .map(|c| OrderRecord { customer_name: c.map(str::to_string), ..Default::default() })
            .collect();
        forward_fill(&mut once, Field::CustomerName);
        let mut twice = once.clone();
        forward_fill(&mut twice, Field::CustomerName);
        assert_eq!(once, twice);
    }

    #[test]
    fn leading_missing_city_becomes_empty() {
        let t = table(
            &["المدينة", "كود الاوردر"],
            &[&[None, Some("1")], &[Some("حولي"), Some("2")], &[None, Some("3")]],
        );
        let merged = prepare(&[t]);
        assert_eq!(cities(&merged.records), vec![Some(""), Some("حولي"), Some("حولي")]);
        assert_eq!(merged.records[0].region, Some(Region::Other));
        assert_eq!(merged.records[2].region, Some(Region::Hawalli));
    }

    #[test]
    fn item_lines_inherit_block_city() {
        // Ordinary fill would carry the whitespace cell forward; item lines
        // must still get the block's real city.
        let t = table(
            &["كود الاوردر", "المدينة", "اسم الصنف"],
            &[
                &[Some("7"), Some("الجهراء"), None],
                &[None, Some(" "), Some("Shirt")],
                &[None, None, Some("Shoes")],
                &[Some("8"), None, None],
            ],
        );
        let merged = prepare(&[t]);
        assert_eq!(
            cities(&merged.records),
            vec![Some("الجهراء"), Some("الجهراء"), Some("الجهراء"), Some(" ")]
        );
        assert!(merged.records[..3].iter().all(|r| r.region == Some(Region::Jahra)));
        assert_eq!(merged.records[3].region, Some(Region::Other));
    }

    #[test]
    fn backfill_only_touches_item_lines_with_blank_city() {
        let mut records = vec![
            OrderRecord { city: Some("X".into()), ..Default::default() },
            OrderRecord { city: Some("".into()), item_name: Some("A".into()), ..Default::default() },
            OrderRecord { city: Some("".into()), item_name: Some("  ".into()), ..Default::default() },
            OrderRecord { city: Some("Y".into()), item_name: Some("B".into()), ..Default::default() },
        ];
        let original = vec![Some("X".to_string()), None, None, Some("Y".to_string())];
        assert_eq!(backfill_city(&mut records, &original), 1);
        assert_eq!(cities(&records), vec![Some("X"), Some("X"), Some(""), Some("Y")]);
    }

    #[test]
    fn missing_city_column_classifies_everything_as_fallback() {
        let t = table(&["كود الاوردر"], &[&[Some("1")], &[Some("2")]]);
        let merged = prepare(&[t]);
        assert!(merged.records.iter().all(|r| r.region == Some(Region::Other)));
        assert!(merged.records.iter().all(|r| r.city.is_none()));
        assert!(merged.has_field(Field::Region));
    }

    #[test]
    fn fill_crosses_table_boundaries() {
        let a = table(&["المدينة", "اسم العميل"], &[&[Some("الفروانية"), Some("Sara")]]);
        let b = table(&["كود الاوردر"], &[&[Some("5")]]);
        let merged = prepare(&[a, b]);
        assert_eq!(merged.records[1].city.as_deref(), Some("الفروانية"));
        assert_eq!(merged.records[1].customer_name.as_deref(), Some("Sara"));
        assert_eq!(merged.records[0].order_code, None);
    }

    #[test]
    #[traced_test]
    fn missing_city_column_is_warned() {
        let t = table(&["كود الاوردر", "اسم الصنف"], &[&[Some("1"), Some("Bag")]]);
        prepare(&[t]);
        assert!(logs_contain("city column not found"));
        assert!(logs_contain("customer column not found"));
        assert!(!logs_contain("order code column not found"));
    }

    #[test]
    #[traced_test]
    fn missing_item_column_is_warned_only_with_a_city_column() {
        let t = table(
            &["المدينة", "كود الاوردر", "اسم العميل"],
            &[&[Some("حولي"), Some("1"), Some("Ali")]],
        );
        prepare(&[t]);
        assert!(logs_contain("item column not found"));
        assert!(!logs_contain("city column not found"));
    }

    #[test]
    #[traced_test]
    fn table_without_known_columns_is_warned() {
        let t = table(&["Tracking"], &[&[Some("T-1")]]);
        concat_tables(&[t]);
        assert!(logs_contain("no recognised order columns"));
    }

    #[test]
    #[traced_test]
    fn empty_input_raises_no_column_warnings() {
        let t = table(&["Tracking"], &[&[None]]);
        let merged = prepare(&[t]);
        assert!(merged.records.is_empty());
        assert!(!logs_contain("column not found"));
    }
}
