use tracing::Instrument;

use crate::browser::{PageHandle, Session};
use crate::extract::Extractor;
use crate::record::RawListingRecord;
use crate::telemetry::ctx::LogCtx;
use crate::telemetry::ops::scrape::{Phase as ScrapePhase, Scrape};

/// Scrape `urls` one after another on a single page. Always yields one record per URL, in order.
pub async fn extract_all<P: PageHandle>(
    extractor: &Extractor,
    page: &P,
    urls: &[String],
    log: &LogCtx<Scrape>,
) -> Vec<RawListingRecord> {
    let mut records = Vec::with_capacity(urls.len());
    for (i, url) in urls.iter().enumerate() {
        log.progress(i + 1, urls.len(), url);
        let span = log.span_kv(&ScrapePhase::Listing, [("url", url.clone())]);
        let record = extractor.extract(page, url).instrument(span).await;
        if let RawListingRecord::Failed { error, .. } = &record {
            log.warn_kv("⚠️ listing failed", [("url", url.clone()), ("error", error.clone())]);
        }
        records.push(record);
    }
    records
}

/// Scrape the batch on the session's page, then close the session whatever the outcome.
pub async fn run_session<S: Session>(
    session: S,
    extractor: &Extractor,
    urls: &[String],
    log: &LogCtx<Scrape>,
) -> Vec<RawListingRecord> {
    let records = extract_all(extractor, session.page(), urls, log).await;
    {
        let _s = log.span(&ScrapePhase::Close).entered();
        session.close().await;
    }
    records
}
