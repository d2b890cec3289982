use crate::regions::Region;
use crate::types::{OrderRecord, RegionGroup, RegionSummaryRow, RunSummary};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Region print order: named regions by first appearance, then the
/// fallback bucket.
///
/// The fallback is appended even when no record falls into it; callers that
/// build groups drop it if it ends up empty.
pub fn region_order(records: &[OrderRecord]) -> Vec<Region> {
    let mut order: Vec<Region> = Vec::new();
    for record in records {
        let region = record.region.unwrap_or(Region::Other);
        if !region.is_fallback() && !order.contains(&region) {
            order.push(region);
        }
    }
    order.push(Region::Other);
    order
}

/// Sort records by region order then order code, and split them into
/// per-region groups.
///
/// Records without an order code sort after those with one. The sort is
/// stable, so rows sharing a code keep their merged order.
pub fn group_by_region(mut records: Vec<OrderRecord>) -> Vec<RegionGroup> {
    let order = region_order(&records);
    let rank = |r: &OrderRecord| {
        let region = r.region.unwrap_or(Region::Other);
        order.iter().position(|o| *o == region).unwrap_or(order.len())
    };
    records.sort_by(|a, b| {
        rank(a)
            .cmp(&rank(b))
            .then_with(|| compare_codes(a.order_code.as_deref(), b.order_code.as_deref()))
    });

    let mut groups: Vec<RegionGroup> = order
        .iter()
        .map(|region| RegionGroup {
            region: *region,
            records: Vec::new(),
        })
        .collect();
    for record in records {
        let idx = rank(&record);
        if let Some(group) = groups.get_mut(idx) {
            group.records.push(record);
        }
    }
    groups.retain(|g| !g.records.is_empty());
    groups
}

fn compare_codes(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn generate_region_summary(groups: &[RegionGroup]) -> Vec<RegionSummaryRow> {
    groups
        .iter()
        .map(|group| {
            let orders: HashSet<&str> = group
                .records
                .iter()
                .filter_map(|r| r.order_code.as_deref())
                .collect();
            RegionSummaryRow {
                region: group.region.label().to_string(),
                orders: orders.len(),
                lines: group.records.len(),
            }
        })
        .collect()
}

pub fn generate_summary(
    generated_on: &str,
    input_files: usize,
    input_tables: usize,
    groups: &[RegionGroup],
) -> RunSummary {
    RunSummary {
        generated_on: generated_on.to_string(),
        input_files,
        input_tables,
        merged_rows: groups.iter().map(|g| g.records.len()).sum(),
        regions: generate_region_summary(groups),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: Option<&str>, region: Region) -> OrderRecord {
        OrderRecord {
            order_code: code.map(str::to_string),
            region: Some(region),
            ..Default::default()
        }
    }

    fn codes(group: &RegionGroup) -> Vec<Option<&str>> {
        group.records.iter().map(|r| r.order_code.as_deref()).collect()
    }

    #[test]
    fn fallback_goes_last_and_named_regions_keep_first_seen_order() {
        let records = vec![
            record(Some("4"), Region::Jahra),
            record(Some("3"), Region::Hawalli),
            record(Some("2"), Region::Jahra),
            record(Some("5"), Region::Other),
            record(Some("1"), Region::Hawalli),
        ];
        assert_eq!(
            region_order(&records),
            vec![Region::Jahra, Region::Hawalli, Region::Other]
        );
        let groups = group_by_region(records);
        let regions: Vec<Region> = groups.iter().map(|g| g.region).collect();
        assert_eq!(regions, vec![Region::Jahra, Region::Hawalli, Region::Other]);
        assert_eq!(codes(&groups[0]), vec![Some("2"), Some("4")]);
        assert_eq!(codes(&groups[1]), vec![Some("1"), Some("3")]);
        assert_eq!(codes(&groups[2]), vec![Some("5")]);
    }

    #[test]
    fn fallback_first_in_input_still_prints_last() {
        let records = vec![
            record(Some("9"), Region::Other),
            record(Some("1"), Region::Fahaheel),
        ];
        let groups = group_by_region(records);
        assert_eq!(groups[0].region, Region::Fahaheel);
        assert_eq!(groups[1].region, Region::Other);
    }

    #[test]
    fn empty_fallback_group_is_omitted() {
        let records = vec![record(Some("1"), Region::Farwaniya)];
        assert_eq!(region_order(&records).last(), Some(&Region::Other));
        let groups = group_by_region(records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].region, Region::Farwaniya);
    }

    #[test]
    fn codes_sort_as_text_with_missing_codes_last() {
        let records = vec![
            record(None, Region::Hawalli),
            record(Some("99"), Region::Hawalli),
            record(Some("100"), Region::Hawalli),
        ];
        let groups = group_by_region(records);
        assert_eq!(codes(&groups[0]), vec![Some("100"), Some("99"), None]);
    }

    #[test]
    fn equal_codes_keep_merged_order() {
        let mut first = record(Some("7"), Region::Jahra);
        first.item_name = Some("Shirt".into());
        let mut second = record(Some("7"), Region::Jahra);
        second.item_name = Some("Shoes".into());
        let groups = group_by_region(vec![first, second]);
        let items: Vec<_> = groups[0].records.iter().map(|r| r.item_name.as_deref()).collect();
        assert_eq!(items, vec![Some("Shirt"), Some("Shoes")]);
    }

    #[test]
    fn summary_counts_distinct_orders() {
        let groups = group_by_region(vec![
            record(Some("1"), Region::Hawalli),
            record(Some("1"), Region::Hawalli),
            record(Some("2"), Region::Hawalli),
            record(Some("3"), Region::Other),
        ]);
        let summary = generate_summary("2026-01-01", 1, 2, &groups);
        assert_eq!(summary.merged_rows, 4);
        assert_eq!(summary.regions[0].orders, 2);
        assert_eq!(summary.regions[0].lines, 3);
        assert_eq!(summary.regions[1].region, "Other City");
    }
}
