use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use crate::output::types::Meta;
use crate::record::{self, RawListingRecord};
use crate::telemetry::{self};
use crate::telemetry::ops::normalize::Phase as NormalizePhase;

pub mod export;
pub mod schema;
pub mod table;
mod types;

pub use export::Format;
pub use schema::Schema;
pub use table::{Normalizer, Table};

/// Re-run the table export over raw records saved by `scrape --raw-out`.
#[derive(Args)]
pub struct NormalizeCmd {
    /// JSON Lines file of raw records; stdin when omitted
    #[arg(long)] pub input: Option<PathBuf>,
    #[arg(short, long)] pub out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Csv)] pub format: Format,
}

pub fn run(args: NormalizeCmd) -> Result<()> {
    let log = telemetry::normalize();
    let _g = log.root_span_kv([
        ("input", format!("{:?}", args.input)),
        ("out", format!("{:?}", args.out)),
        ("format", format!("{:?}", args.format)),
    ]).entered();
    let started = Instant::now();

    let records = {
        let _s = log.span(&NormalizePhase::Read).entered();
        let text = match &args.input {
            Some(path) => std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?,
            None => std::io::read_to_string(std::io::stdin()).context("read stdin")?,
        };
        record::from_jsonl(&text)
    };

    let table = {
        let _s = log.span(&NormalizePhase::Normalize).entered();
        Normalizer::new(Schema::acf()).normalize(&records)
    };

    let embedded = {
        let _s = log.span(&NormalizePhase::Write).entered();
        deliver(&table, args.format, args.out.as_deref())?
    };

    let errors = count_failed(&records);
    log.totals(records.len(), errors, table.rows.len());

    if telemetry::config::json_mode() {
        let result = types::NormalizeResult {
            records: records.len(),
            errors,
            rows: table.rows.len(),
            format: args.format,
            out: args.out.as_ref().map(|p| p.display().to_string()),
            table: embedded,
        };
        log.result(&result, Some(Meta { duration_ms: Some(started.elapsed().as_millis()) }))?;
    }
    Ok(())
}

/// Serialize and write the table. In `--json` mode stdout carries the envelope, so without
/// `--out` the text is handed back for embedding instead of printed.
pub(crate) fn deliver(table: &Table, format: Format, out: Option<&Path>) -> Result<Option<String>> {
    let text = export::serialize(table, format)?;
    if out.is_none() && telemetry::config::json_mode() {
        return Ok(Some(text));
    }
    export::write_output(&text, out)?;
    Ok(None)
}

/// Failed records in a batch.
pub(crate) fn count_failed(records: &[RawListingRecord]) -> usize {
    records.iter().filter(|r| r.is_failed()).count()
}
