//! Shared test utilities and fixture generators

use std::io::Write;
use std::path::{Path, PathBuf};

/// Header row used by the order export fixtures.
pub const ORDER_HEADER: &str =
    "كود الاوردر,اسم العميل,المدينة,رقم موبايل العميل,حالة الاوردر,اسم الصنف,الكمية";

/// Write `lines` as a CSV file named `name` inside `dir`.
pub fn write_csv(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    path
}

/// First export: a Jahra order with two item lines, then a Hawalli order.
pub fn first_export(dir: &Path) -> PathBuf {
    write_csv(
        dir,
        "store_a.csv",
        &[
            ORDER_HEADER,
            "A-200,Mona,الجهراء,96550001234.0,معلق,Shirt,2.0",
            ",,,,,Shoes,1.0",
            ",,,,,,",
            "A-100,Ali,حولي,96560000000,تم التأكيد,Bag,1",
        ],
    )
}

/// Second export: an unknown city, then a second Jahra order.
pub fn second_export(dir: &Path) -> PathBuf {
    write_csv(
        dir,
        "store_b.csv",
        &[
            ORDER_HEADER,
            "B-300,Omar,Cairo,,معلق,Hat,1",
            "A-150,Huda,الجهراء,,,Scarf,3",
        ],
    )
}
