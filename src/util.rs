// Utility helpers for cell formatting, dates and counts.
//
// Spreadsheet exports are loose about numbers: phone numbers and piece
// counts often arrive as floats ("96550001234.0", "3.0"). This module turns
// them back into the plain digit text a driver expects to read.
use crate::error::{DispatchError, Result};
use crate::types::Field;
use chrono::Utc;
use chrono_tz::Tz;
use num_format::{Locale, ToFormattedString};

/// Timezone the dispatch team works in.
pub const DEFAULT_TIMEZONE: &str = "Africa/Cairo";

/// Columns whose text is printed as-is. The mobile column is listed here but
/// still goes through integer coercion, see [`format_cell`].
pub fn is_text_column(field: Field) -> bool {
    !matches!(field, Field::PieceCount | Field::Quantity)
}

/// Render one cell for display.
///
/// - Absent values render as an empty string.
/// - Text columns are returned unchanged, except the mobile number which is
///   coerced like a numeric column because exports store it as a float.
/// - Every other column is coerced: `"1500.0"` becomes `"1500"`.
pub fn format_cell(value: Option<&str>, field: Field) -> String {
    let Some(value) = value else {
        return String::new();
    };
    if is_text_column(field) && field != Field::Mobile {
        return value.to_string();
    }
    coerce_integer(value).unwrap_or_else(|| value.to_string())
}

/// Integer text for a value made of digits and at most one decimal point.
///
/// The fractional part is truncated and leading zeros dropped, so
/// `"0012.70"` gives `"12"` and `".5"` gives `"0"`. Arabic-Indic digits are
/// accepted and rendered as ASCII. Anything else (signs, spaces, a second
/// point, an empty string) returns `None`.
pub fn coerce_integer(value: &str) -> Option<String> {
    let (int_part, frac_part) = match value.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (value, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let int_digits: Option<String> = int_part.chars().map(ascii_digit).collect();
    let int_digits = int_digits?;
    if !frac_part.chars().all(|c| ascii_digit(c).is_some()) {
        return None;
    }
    let trimmed = int_digits.trim_start_matches('0');
    Some(if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    })
}

fn ascii_digit(c: char) -> Option<char> {
    match c {
        '0'..='9' => Some(c),
        // Arabic-Indic and Extended Arabic-Indic digits
        '\u{0660}'..='\u{0669}' => char::from_digit(c as u32 - 0x0660, 10),
        '\u{06F0}'..='\u{06F9}' => char::from_digit(c as u32 - 0x06F0, 10),
        _ => None,
    }
}

/// Today's date in the given IANA timezone, formatted `YYYY-MM-DD`.
pub fn local_date(timezone: &str) -> Result<String> {
    let tz: Tz = timezone
        .parse()
        .map_err(|e| DispatchError::Timezone(format!("{timezone} ({e})")))?;
    Ok(Utc::now().with_timezone(&tz).format("%Y-%m-%d").to_string())
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `1,204 rows merged`).
    n.to_formatted_string(&Locale::en)
}
