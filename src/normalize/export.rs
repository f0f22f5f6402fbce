use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use csv::{Terminator, WriterBuilder};
use serde::Serialize;

use super::table::Table;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Csv,
    Tsv,
}

impl Format {
    pub fn delimiter(self) -> u8 {
        match self {
            Format::Csv => b',',
            Format::Tsv => b'\t',
        }
    }
}

/// Header plus one line per row. A table without rows serializes to nothing at all.
pub fn serialize(table: &Table, format: Format) -> Result<String> {
    if table.is_empty() {
        return Ok(String::new());
    }
    let mut w = WriterBuilder::new()
        .delimiter(format.delimiter())
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    w.write_record(&table.columns)?;
    for row in &table.rows {
        w.write_record(row)?;
    }
    let bytes = w.into_inner().map_err(|e| anyhow!("flush table: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Write to `out`, or stdout when no path is given.
pub fn write_output(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text).with_context(|| format!("write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
