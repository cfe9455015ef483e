// Parsing and small numeric helpers shared by the loader and the reports.
//
// The CSV comes from an upstream export, so field handling is forgiving
// about whitespace and thousands separators but never guesses a value.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;
use std::fmt::Display;

/// Parse a numeric field.
///
/// - Trims whitespace.
/// - Rejects values that contain alphabetic characters (`inf`, `NaN`, `1e309`).
/// - Strips thousands separators like `","` before parsing.
/// - Returns `None` for empty, non-numeric or non-finite text.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace(',', "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integer counts may arrive as `12` or `12.0` depending on the exporter.
pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 {
        Some(f as i64)
    } else {
        None
    }
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Accepts plain `YYYY-MM-DD` dates (midnight) and the usual timestamp forms.
pub fn parse_datetime_safe(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

pub fn parse_flag_safe(s: Option<&str>) -> Option<bool> {
    let s = s?.trim();
    match s.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" => Some(true),
        "0" | "0.0" | "false" => Some(false),
        _ => None,
    }
}

/// Whole days elapsed from `earlier` to `later`, truncated.
pub fn days_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    (later - earlier).num_days()
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; 0 for an empty slice so no NaN reaches an export.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Descending order with missing values last.
pub fn desc_missing_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// `0.4523` with one decimal becomes `45.2%`.
pub fn format_pct(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
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
    n.to_formatted_string(&Locale::en)
}

// Console preview renderers used by the `Tabled` output rows.

pub fn display_rate(v: &f64) -> String {
    format_pct(*v, 1)
}

pub fn display_money(v: &f64) -> String {
    format_number(*v, 2)
}

pub fn display_decimal(v: &f64) -> String {
    format!("{:.2}", v)
}

pub fn display_optional<T: Display>(v: &Option<T>) -> String {
    v.as_ref().map(|x| x.to_string()).unwrap_or_default()
}
