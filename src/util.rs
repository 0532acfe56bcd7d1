// Utility helpers for parsing, text cleanup and number formatting.
//
// This module centralizes the "dirty" CSV value handling so the rest of the
// code can assume clean, typed values.
use encoding_rs::{Encoding, UTF_8};
use num_format::{Locale, ToFormattedString};

/// Parse a coordinate in decimal degrees.
///
/// - Accepts `Option<&str>` so callers can pass through missing fields.
/// - Trims whitespace.
/// - Accepts a comma as the decimal separator (`-33,4489`).
/// - Returns `None` for anything non-numeric or non-finite.
pub fn parse_coordinate(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let v = s.replace(',', ".").parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Parse an integer code such as a region number.
///
/// Exports sometimes write integer codes as floats (`13.0`); those are
/// accepted when they have no fractional part.
pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}

/// Undo mojibake produced by decoding UTF-8 text with a legacy encoding.
///
/// The text is encoded back with `legacy` and the bytes are decoded as UTF-8.
/// If a character cannot be represented in `legacy`, or the bytes are not
/// valid UTF-8, the original text is returned unchanged.
pub fn repair_text(text: &str, legacy: &'static Encoding) -> String {
    let (bytes, _, unmappable) = legacy.encode(text);
    if unmappable {
        return text.to_string();
    }
    match UTF_8.decode_without_bom_handling_and_without_replacement(&bytes) {
        Some(fixed) => fixed.into_owned(),
        None => text.to_string(),
    }
}

/// Key used to compare place names: trimmed, lowercased and with Spanish
/// diacritics folded (`" Maipú "` -> `"maipu"`).
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Share of `part` in `total` as a percentage; 0 for an empty total.
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `4,321 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
