use crate::error::{ReportError, Result};
use crate::types::{CustomerRecord, RawRow};
use crate::util::{parse_datetime_safe, parse_f64_safe, parse_flag_safe, parse_i64_safe};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub countries: usize,
}

pub fn load_transactions(path: &Path) -> Result<(Vec<CustomerRecord>, LoadReport)> {
    let file = File::open(path).map_err(|e| ReportError::io(path, e))?;
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(file);
    let headers = rdr.headers()?.clone();
    debug!("{} columns in {}: {:?}", headers.len(), path.display(), headers);

    let mut records: Vec<CustomerRecord> = Vec::new();
    let mut raw = StringRecord::new();
    while rdr.read_record(&mut raw)? {
        let line = raw.position().map(|p| p.line()).unwrap_or(0);
        let row: RawRow = raw.deserialize(Some(&headers))?;
        records.push(clean_row(row, line)?);
    }

    let mut countries: Vec<&str> = records.iter().map(|r| r.country.as_str()).collect();
    countries.sort_unstable();
    countries.dedup();

    let report = LoadReport {
        total_rows: records.len(),
        countries: countries.len(),
    };
    Ok((records, report))
}

fn text(raw: Option<String>, field: &'static str, line: u64) -> Result<String> {
    match raw {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        other => Err(ReportError::Parse {
            line,
            field,
            value: other.unwrap_or_default(),
        }),
    }
}

/// Blank or absent cells are missing values; anything else has to parse.
fn optional<T>(
    raw: &Option<String>,
    parse: fn(Option<&str>) -> Option<T>,
    field: &'static str,
    line: u64,
) -> Result<Option<T>> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse(Some(s)).map(Some).ok_or_else(|| ReportError::Parse {
            line,
            field,
            value: s.to_string(),
        }),
    }
}

fn clean_row(row: RawRow, line: u64) -> Result<CustomerRecord> {
    // The window is built from this date, so it is the one numeric-ish
    // column that cannot be missing.
    let last_purchase = parse_datetime_safe(row.last_purchase_date.as_deref()).ok_or_else(|| {
        ReportError::Parse {
            line,
            field: "last_purchase_date",
            value: row.last_purchase_date.clone().unwrap_or_default(),
        }
    })?;

    Ok(CustomerRecord {
        last_purchase,
        spending_score: optional(&row.spending_score, parse_f64_safe, "spending_score", line)?,
        cart_abandon_rate: optional(&row.cart_abandon_rate, parse_f64_safe, "cart_abandon_rate", line)?,
        num_purchases: optional(&row.num_purchases, parse_i64_safe, "num_purchases", line)?,
        avg_purchase_value: optional(&row.avg_purchase_value, parse_f64_safe, "avg_purchase_value", line)?,
        website_visits_per_month: optional(
            &row.website_visits_per_month,
            parse_f64_safe,
            "website_visits_per_month",
            line,
        )?,
        churned: optional(&row.churned, parse_flag_safe, "churned", line)?,
        customer_id: text(row.customer_id, "customer_id", line)?,
        country: text(row.country, "country", line)?,
        gender: text(row.gender, "gender", line)?,
    })
}
