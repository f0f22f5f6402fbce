use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::js_protocol::runtime::CallFunctionOnParams;
use chromiumoxide::element::Element;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{PageHandle, Session};

const SELECTOR_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    pub headful: bool,
    pub chrome: Option<PathBuf>,
}

impl LaunchOptions {
    /// `LISTINGS_CHROME` points at a Chromium binary when it is not on the default path.
    pub fn from_env() -> Self {
        let chrome = std::env::var("LISTINGS_CHROME").ok().filter(|s| !s.trim().is_empty()).map(PathBuf::from);
        LaunchOptions { headful: false, chrome }
    }
}

/// One Chromium process, its CDP event loop and the single page reused for a batch.
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: ChromePage,
}

impl BrowserSession {
    pub async fn launch(opts: &LaunchOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if opts.headful { builder = builder.with_head(); }
        if let Some(path) = &opts.chrome { builder = builder.chrome_executable(path); }
        let config = builder.build().map_err(|e| anyhow!("browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config).await.context("launch chromium")?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    warn!("cdp handler event error: {}", e);
                }
            }
        });

        let page = browser.new_page("about:blank").await.context("open page")?;
        Ok(BrowserSession { browser, handler_task, page: ChromePage { page } })
    }
}

#[async_trait]
impl Session for BrowserSession {
    type Page = ChromePage;

    fn page(&self) -> &ChromePage { &self.page }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("browser wait failed: {}", e);
        }
        self.handler_task.abort();
    }
}

pub struct ChromePage {
    page: Page,
}

#[async_trait]
impl PageHandle for ChromePage {
    type Element = Element;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        if !poll_until(timeout, || async { self.page.find_element(selector).await.is_ok() }).await {
            bail!("Timeout {}ms exceeded waiting for selector `{}`", timeout.as_millis(), selector);
        }
        Ok(())
    }

    async fn wait_fixed(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<Element>> {
        // CDP reports a missing node as a command error, so any failure reads as "no match".
        match self.page.find_element(selector).await {
            Ok(el) => Ok(Some(el)),
            Err(e) => {
                debug!(selector, error = %e, "query_selector found nothing");
                Ok(None)
            }
        }
    }

    async fn evaluate_on(&self, element: &Element, function: &str) -> Result<Value> {
        let params = CallFunctionOnParams::builder()
            .function_declaration(function)
            .object_id(element.remote_object_id.clone())
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|e| anyhow!("call params: {}", e))?;

        let resp = self.page.execute(params).await?;
        if let Some(ex) = &resp.result.exception_details {
            let msg = ex
                .exception
                .as_ref()
                .and_then(|obj| obj.description.clone())
                .unwrap_or_else(|| ex.text.clone());
            bail!("{}", msg);
        }
        Ok(resp.result.result.value.clone().unwrap_or(Value::Null))
    }
}

/// Re-run `probe` every [`SELECTOR_POLL`] until it returns true or `timeout` elapses.
/// Huge timeouts saturate instead of overflowing the deadline.
async fn poll_until<F, Fut>(timeout: Duration, mut probe: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let found = async {
        while !probe().await {
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    };
    tokio::time::timeout(timeout, found).await.is_ok()
}
