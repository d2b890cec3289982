//! Arabic text preparation for PDF text runs.
//!
//! PDF draws glyphs left to right exactly as given, so Arabic text has to be
//! shaped into its contextual presentation forms and then reordered into
//! visual order before it is written.

use ar_reshaper::reshape_line;
use unicode_bidi::BidiInfo;

/// Replace Arabic-script letters (Persian and Urdu additions included) with
/// their contextual presentation forms. Other characters pass through.
pub fn shape(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    reshape_line(text)
}

/// Reorder one line of logical-order text into visual (left to right) order.
pub fn visual_order(line: &str) -> String {
    if line.is_empty() {
        return String::new();
    }
    let info = BidiInfo::new(line, None);
    info.paragraphs
        .iter()
        .map(|para| info.reorder_line(para, para.range.clone()).into_owned())
        .collect()
}
