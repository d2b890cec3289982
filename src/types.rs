use crate::regions::Region;
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// Header used by some exports for the piece-count column.
pub const PIECE_COUNT_ALIAS: &str = "اجمالي عدد القطع في الطلب";

/// Status token for an order still waiting on confirmation.
pub const STATUS_PENDING: &str = "معلق";
/// Status token printed on dispatch sheets instead of [`STATUS_PENDING`].
pub const STATUS_CONFIRMED: &str = "تم التأكيد";

/// A known order-sheet column. The declaration order is the display order
/// of the rendered table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    OrderCode,
    CustomerName,
    Region,
    Address,
    City,
    Mobile,
    Status,
    PieceCount,
    Notes,
    ItemName,
    Color,
    Size,
    Quantity,
    TotalWithShipping,
}

impl Field {
    pub const ALL: [Field; 14] = [
        Field::OrderCode,
        Field::CustomerName,
        Field::Region,
        Field::Address,
        Field::City,
        Field::Mobile,
        Field::Status,
        Field::PieceCount,
        Field::Notes,
        Field::ItemName,
        Field::Color,
        Field::Size,
        Field::Quantity,
        Field::TotalWithShipping,
    ];

    /// Header label as it appears in the exported sheets.
    pub fn label(self) -> &'static str {
        match self {
            Field::OrderCode => "كود الاوردر",
            Field::CustomerName => "اسم العميل",
            Field::Region => "المنطقة",
            Field::Address => "العنوان",
            Field::City => "المدينة",
            Field::Mobile => "رقم موبايل العميل",
            Field::Status => "حالة الاوردر",
            Field::PieceCount => "عدد القطع",
            Field::Notes => "الملاحظات",
            Field::ItemName => "اسم الصنف",
            Field::Color => "اللون",
            Field::Size => "المقاس",
            Field::Quantity => "الكمية",
            Field::TotalWithShipping => "الإجمالي مع الشحن",
        }
    }

    /// Resolve a header label, including the piece-count alias.
    pub fn from_label(label: &str) -> Option<Field> {
        if label == PIECE_COUNT_ALIAS {
            return Some(Field::PieceCount);
        }
        Field::ALL.into_iter().find(|f| f.label() == label)
    }
}

/// One table as read from a sheet or CSV file: a header row plus data rows.
///
/// Missing cells are `None`; a cell is never `Some("")`.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Human-readable origin, e.g. `orders.xlsx#Sheet1`.
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// One order line after merging.
///
/// Every text field keeps the difference between "absent" (`None`) and an
/// empty value (`Some("")`); forward-filling depends on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRecord {
    pub order_code: Option<String>,
    pub customer_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub mobile: Option<String>,
    pub status: Option<String>,
    pub piece_count: Option<String>,
    pub notes: Option<String>,
    pub item_name: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub quantity: Option<String>,
    pub total_with_shipping: Option<String>,
    /// Set by classification; a region column in the input is not trusted.
    pub region: Option<Region>,
    /// Cells from columns we do not recognise, keyed by header.
    pub extra: BTreeMap<String, String>,
}

impl OrderRecord {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Region => self.region.map(Region::label),
            _ => self.slot(field).and_then(|v| v.as_deref()),
        }
    }

    fn slot(&self, field: Field) -> Option<&Option<String>> {
        Some(match field {
            Field::OrderCode => &self.order_code,
            Field::CustomerName => &self.customer_name,
            Field::Region => return None,
            Field::Address => &self.address,
            Field::City => &self.city,
            Field::Mobile => &self.mobile,
            Field::Status => &self.status,
            Field::PieceCount => &self.piece_count,
            Field::Notes => &self.notes,
            Field::ItemName => &self.item_name,
            Field::Color => &self.color,
            Field::Size => &self.size,
            Field::Quantity => &self.quantity,
            Field::TotalWithShipping => &self.total_with_shipping,
        })
    }

    /// Mutable access to a text field. The region is derived and has no slot.
    pub fn slot_mut(&mut self, field: Field) -> Option<&mut Option<String>> {
        Some(match field {
            Field::OrderCode => &mut self.order_code,
            Field::CustomerName => &mut self.customer_name,
            Field::Region => return None,
            Field::Address => &mut self.address,
            Field::City => &mut self.city,
            Field::Mobile => &mut self.mobile,
            Field::Status => &mut self.status,
            Field::PieceCount => &mut self.piece_count,
            Field::Notes => &mut self.notes,
            Field::ItemName => &mut self.item_name,
            Field::Color => &mut self.color,
            Field::Size => &mut self.size,
            Field::Quantity => &mut self.quantity,
            Field::TotalWithShipping => &mut self.total_with_shipping,
        })
    }

    /// True when every cell of the row is absent.
    pub fn is_empty(&self) -> bool {
        self.region.is_none()
            && self.extra.is_empty()
            && Field::ALL.into_iter().all(|f| self.get(f).is_none())
    }
}

/// All input tables concatenated into one ordered sequence.
#[derive(Debug, Clone, Default)]
pub struct MergedTable {
    /// Union of source column labels in first-seen order.
    pub columns: Vec<String>,
    pub records: Vec<OrderRecord>,
}

impl MergedTable {
    pub fn has_field(&self, field: Field) -> bool {
        self.columns.iter().any(|c| c == field.label())
    }

    /// Known columns present in the merged table, in display order.
    pub fn display_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.has_field(*f))
            .collect()
    }
}

/// Records of one region, already in print order.
#[derive(Debug, Clone)]
pub struct RegionGroup {
    pub region: Region,
    pub records: Vec<OrderRecord>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionSummaryRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "Orders")]
    #[tabled(rename = "Orders")]
    pub orders: usize,
    #[serde(rename = "Lines")]
    #[tabled(rename = "Lines")]
    pub lines: usize,
}

#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_on: String,
    pub input_files: usize,
    pub input_tables: usize,
    pub merged_rows: usize,
    pub regions: Vec<RegionSummaryRow>,
}
