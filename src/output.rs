use crate::error::{ReportError, Result};
use log::debug;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Create `dir` and any missing parents; an existing directory is fine.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| ReportError::io(dir, e))
}

/// Header row plus one line per row, no index column. An empty slice still
/// gets its header so downstream readers see the schema.
pub fn write_csv<T: Serialize + Tabled>(path: &Path, rows: &[T]) -> Result<()> {
    let file = File::create(path).map_err(|e| ReportError::io(path, e))?;
    let mut wtr = csv::Writer::from_writer(file);
    if rows.is_empty() {
        wtr.write_record(T::headers().iter().map(|h| h.as_bytes()))?;
    }
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush().map_err(|e| ReportError::io(path, e))?;
    debug!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut s = serde_json::to_string_pretty(value)?;
    s.push('\n');
    std::fs::write(path, s).map_err(|e| ReportError::io(path, e))?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
    if rows.len() > max_rows {
        println!("({} more rows in the exported file)\n", rows.len() - max_rows);
    }
}
