use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

mod chrome;
#[cfg(test)]
pub mod fake;

pub use chrome::{BrowserSession, LaunchOptions};

/// The narrow slice of a browser page the extractor is allowed to use.
#[async_trait]
pub trait PageHandle: Send + Sync {
    type Element: Send + Sync;

    /// Load `url` and wait for the navigation to finish.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Resolve once `selector` matches in the page DOM, error after `timeout`.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()>;

    async fn wait_fixed(&self, delay: Duration);

    async fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>>;

    /// Call `function` in the page with `this` bound to `element`; returns the value by copy.
    async fn evaluate_on(&self, element: &Self::Element, function: &str) -> Result<Value>;
}

/// A running browser that owns the page a batch is scraped on.
#[async_trait]
pub trait Session: Send + Sized {
    type Page: PageHandle;

    fn page(&self) -> &Self::Page;

    /// Tear the browser down. Never fails; problems are only logged.
    async fn close(self);
}
