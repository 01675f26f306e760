//! XML text helpers.

use std::borrow::Cow;

/// Escape text for element content or attribute values.
///
/// Characters XML 1.0 cannot carry at all (most C0 controls) are dropped
/// before escaping.
pub(crate) fn escape_text(text: &str) -> Cow<'_, str> {
    if text.chars().any(is_forbidden) {
        let cleaned: String = text.chars().filter(|c| !is_forbidden(*c)).collect();
        Cow::Owned(quick_xml::escape::escape(cleaned.as_str()).into_owned())
    } else {
        quick_xml::escape::escape(text)
    }
}

fn is_forbidden(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r') && (c as u32) < 0x20
}

/// Inches to English Metric Units.
pub(crate) fn emu(inches: f64) -> i64 {
    (inches * 914_400.0).round() as i64
}
