use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;

use crate::browser::{BrowserSession, LaunchOptions};
use crate::extract::{ExtractConfig, Extractor};
use crate::normalize::{self, Format, Normalizer, Schema};
use crate::output::types::Meta;
use crate::record::{self, RawListingRecord};
use crate::telemetry::{self};
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::scrape::{Phase as ScrapePhase, Scrape};

mod batch;
mod input;
mod types;

#[derive(Args)]
pub struct ScrapeCmd {
    /// Listing URLs; read from --input or stdin when none are given
    pub urls: Vec<String>,
    /// File with one URL per line
    #[arg(long)] pub input: Option<PathBuf>,
    #[arg(short, long)] pub out: Option<PathBuf>,
    /// Also save the raw records as JSON Lines (re-export later with `normalize`)
    #[arg(long)] pub raw_out: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Csv)] pub format: Format,
    #[arg(long)] pub selector: Option<String>,
    #[arg(long)] pub nav_timeout_ms: Option<u64>,
    #[arg(long)] pub container_timeout_ms: Option<u64>,
    #[arg(long)] pub settle_ms: Option<u64>,
    #[arg(long, default_value_t = false)] pub headful: bool,
    /// Chromium binary; defaults to LISTINGS_CHROME, then the usual install paths
    #[arg(long)] pub chrome: Option<PathBuf>,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

impl ScrapeCmd {
    fn extract_config(&self) -> ExtractConfig {
        let mut cfg = ExtractConfig::from_env();
        if let Some(sel) = self.selector.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            cfg.container_selector = sel.to_string();
        }
        if let Some(ms) = self.nav_timeout_ms { cfg.navigation_timeout = Duration::from_millis(ms); }
        if let Some(ms) = self.container_timeout_ms { cfg.container_timeout = Duration::from_millis(ms); }
        if let Some(ms) = self.settle_ms { cfg.settle_delay = Duration::from_millis(ms); }
        cfg
    }

    fn launch_options(&self) -> LaunchOptions {
        let env = LaunchOptions::from_env();
        LaunchOptions { headful: self.headful, chrome: self.chrome.clone().or(env.chrome) }
    }
}

pub async fn run(args: ScrapeCmd) -> Result<()> {
    let log = telemetry::scrape();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("plan_limit", args.plan_limit.to_string()),
        ("input", format!("{:?}", args.input)),
        ("out", format!("{:?}", args.out)),
        ("format", format!("{:?}", args.format)),
    ]).entered();

    let urls = input::parse_url_list(&input::read_input(&args.urls, args.input.as_deref())?)?;
    let cfg = args.extract_config();

    if !args.apply {
        let _s = log.span(&ScrapePhase::Plan).entered();
        if telemetry::config::json_mode() {
            let plan = types::ScrapePlan {
                urls: urls.len(),
                sample_urls: urls.iter().take(args.plan_limit).cloned().collect(),
                container_selector: cfg.container_selector.clone(),
                navigation_timeout_ms: cfg.navigation_timeout.as_millis(),
                container_timeout_ms: cfg.container_timeout.as_millis(),
                settle_ms: cfg.settle_delay.as_millis(),
                format: args.format,
                out: args.out.as_ref().map(|p| p.display().to_string()),
            };
            log.plan(&plan)?;
        } else {
            log.info(format!(
                "📝 Scrape plan: urls={} selector={} settle={}ms format={:?}",
                urls.len(), cfg.container_selector, cfg.settle_delay.as_millis(), args.format
            ));
            for u in urls.iter().take(args.plan_limit) { log.info(format!("  {}", u)); }
            if urls.len() > args.plan_limit { log.info(format!("  ... ({} more)", urls.len() - args.plan_limit)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let started = Instant::now();
    let session = {
        let _s = log.span(&ScrapePhase::Launch).entered();
        BrowserSession::launch(&args.launch_options()).await?
    };

    let extractor = Extractor::new(cfg);
    let records = batch::run_session(session, &extractor, &urls, &log).await;

    let table = {
        let _s = log.span(&ScrapePhase::Normalize).entered();
        Normalizer::new(Schema::acf()).normalize(&records)
    };

    let embedded = {
        let _s = log.span(&ScrapePhase::Write).entered();
        normalize::deliver(&table, args.format, args.out.as_deref())?
    };
    if let Some(path) = &args.out {
        log.info(format!("✅ Table written to {}", path.display()));
    }
    // written after the table; a failure here is not fatal
    let raw_saved = args.raw_out.as_deref().filter(|path| save_raw(path, &records, &log));

    let failed = normalize::count_failed(&records);
    let succeeded = records.len() - failed;
    log.totals(succeeded, failed, table.rows.len());

    if telemetry::config::json_mode() {
        let result = types::ScrapeResult {
            urls: urls.len(),
            succeeded,
            failed,
            rows: table.rows.len(),
            format: args.format,
            out: args.out.as_ref().map(|p| p.display().to_string()),
            raw_out: raw_saved.map(|p| p.display().to_string()),
            table: embedded,
        };
        log.result(&result, Some(Meta { duration_ms: Some(started.elapsed().as_millis()) }))?;
    }
    Ok(())
}

/// Write raw records as JSON Lines. A failure is logged, not returned.
fn save_raw(path: &Path, records: &[RawListingRecord], log: &LogCtx<Scrape>) -> bool {
    let written = record::to_jsonl(records)
        .context("encode raw records")
        .and_then(|jsonl| std::fs::write(path, jsonl).with_context(|| format!("write {}", path.display())));
    match written {
        Ok(()) => {
            log.info(format!("💾 Raw records saved to {}", path.display()));
            true
        }
        Err(e) => {
            log.warn_kv("⚠️ raw records not saved", [("path", path.display().to_string()), ("error", format!("{:#}", e))]);
            false
        }
    }
}
