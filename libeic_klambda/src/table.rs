use csv::Writer;
use std::fs::File;
use std::path::{Path, PathBuf};

use super::error::TableError;

/// An append-only CSV table: the header row is written on creation, then
/// one row per write. Rows are never rewritten. The column count of every
/// row is checked against the header so a drifting schema fails loudly
/// instead of misaligning downstream columns.
pub struct CsvTable {
    writer: Writer<File>,
    name: String,
    n_columns: usize,
    rows_written: u64,
}

impl CsvTable {
    pub fn create(path: &Path, headers: &[String]) -> Result<Self, TableError> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(headers)?;
        Ok(Self {
            writer,
            name: path.to_string_lossy().into_owned(),
            n_columns: headers.len(),
            rows_written: 0,
        })
    }

    /// Append one row; the field count must match the header
    pub fn write_row(&mut self, row: &[String]) -> Result<(), TableError> {
        if row.len() != self.n_columns {
            return Err(TableError::ColumnCountMismatch {
                table: self.name.clone(),
                expected: self.n_columns,
                found: row.len(),
            });
        }
        self.writer.write_record(row)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and consume the table
    pub fn finish(mut self) -> Result<(), TableError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Derive a side-table path from the primary output name: a trailing
/// `.csv` is stripped and `_{suffix}.csv` appended, so `out.csv` with
/// suffix `prot_hits` becomes `out_prot_hits.csv`
pub fn side_table_path(primary: &Path, suffix: &str) -> PathBuf {
    let name = primary.to_string_lossy();
    let stem = name.strip_suffix(".csv").unwrap_or(&name);
    PathBuf::from(format!("{stem}_{suffix}.csv"))
}
