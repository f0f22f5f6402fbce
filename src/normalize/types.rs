use serde::Serialize;

use super::Format;

#[derive(Serialize)]
pub struct NormalizeResult {
    pub records: usize,
    pub errors: usize,
    pub rows: usize,
    pub format: Format,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out: Option<String>,
    /// The table itself when it was not written to a file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}
