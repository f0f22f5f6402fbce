use serde::Serialize;

use crate::normalize::Format;

#[derive(Serialize)]
pub struct ScrapePlan {
    pub urls: usize,
    pub sample_urls: Vec<String>,
    pub container_selector: String,
    pub navigation_timeout_ms: u128,
    pub container_timeout_ms: u128,
    pub settle_ms: u128,
    pub format: Format,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
}

#[derive(Serialize)]
pub struct ScrapeResult {
    pub urls: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub rows: usize,
    pub format: Format,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_out: Option<String>,
    /// The table itself when it was not written to a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}
