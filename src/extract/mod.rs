pub mod config;
pub mod error;
pub mod query;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::browser::PageHandle;
use crate::record::RawListingRecord;

pub use config::ExtractConfig;
pub use error::ExtractError;

/// Pulls one listing out of the shadow root hosted by the configured container.
pub struct Extractor {
    cfg: ExtractConfig,
}

impl Extractor {
    pub fn new(cfg: ExtractConfig) -> Self {
        Extractor { cfg }
    }

    /// Never fails: whatever goes wrong is returned as a `Failed` record for `url`.
    pub async fn extract<P: PageHandle>(&self, page: &P, url: &str) -> RawListingRecord {
        match self.try_extract(page, url).await {
            Ok(record) => record,
            Err(e) => {
                debug!(url, error = %e, "extraction failed");
                RawListingRecord::failed(url, e.to_string())
            }
        }
    }

    async fn try_extract<P: PageHandle>(&self, page: &P, url: &str) -> Result<RawListingRecord, ExtractError> {
        let selector = self.cfg.container_selector.as_str();

        Url::parse(url).map_err(|e| ExtractError::Navigation(format!("invalid URL `{}`: {}", url, e)))?;
        match tokio::time::timeout(self.cfg.navigation_timeout, page.navigate(url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ExtractError::Navigation(format!("{:#}", e))),
            Err(_) => {
                return Err(ExtractError::Navigation(format!(
                    "timed out after {}ms",
                    self.cfg.navigation_timeout.as_millis()
                )));
            }
        }

        page.wait_for_selector(selector, self.cfg.container_timeout)
            .await
            .map_err(|e| container_missing(selector, format!("{:#}", e)))?;

        page.wait_fixed(self.cfg.settle_delay).await;

        let host = match page.query_selector(selector).await {
            Ok(Some(host)) => host,
            Ok(None) => return Err(container_missing(selector, "gone after settle delay".to_string())),
            Err(e) => return Err(container_missing(selector, format!("{:#}", e))),
        };

        let attached = page.evaluate_on(&host, query::SHADOW_ROOT_PROBE)
            .await
            .map_err(|e| ExtractError::ScriptEvaluation(format!("{:#}", e)))?;
        if attached != Value::Bool(true) {
            return Err(ExtractError::ShadowRootMissing { selector: selector.to_string() });
        }

        let fields = page.evaluate_on(&host, query::listing_query())
            .await
            .map_err(|e| ExtractError::ScriptEvaluation(format!("{:#}", e)))?;
        let mut map = match fields {
            Value::Object(map) => map,
            other => return Err(ExtractError::ScriptEvaluation(format!("expected an object, got `{}`", other))),
        };
        map.insert("url".to_string(), Value::String(url.to_string()));
        debug!(url, fields = map.len(), "listing extracted");
        Ok(RawListingRecord::from_map(map))
    }
}

fn container_missing(selector: &str, detail: String) -> ExtractError {
    ExtractError::ContainerNotFound { selector: selector.to_string(), detail }
}
