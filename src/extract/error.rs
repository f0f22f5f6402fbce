use thiserror::Error;

/// Every way a single page can fail. Each one ends up as the `error` cell of its row.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Navigation failed: {0}")]
    Navigation(String),
    #[error("Shadow host not found: `{selector}` ({detail})")]
    ContainerNotFound { selector: String, detail: String },
    #[error("ShadowRoot not found on `{selector}`")]
    ShadowRootMissing { selector: String },
    #[error("Listing query failed: {0}")]
    ScriptEvaluation(String),
}
