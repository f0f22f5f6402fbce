use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{PageHandle, Session};
use crate::extract::query::{listing_query, SHADOW_ROOT_PROBE};

/// How a scripted page behaves once navigated to.
#[derive(Clone, Debug)]
pub enum Scenario {
    NavigationError(String),
    /// Navigation never completes.
    NavigationHangs,
    NoContainer,
    /// Container shows up for the wait but is gone when re-located.
    ContainerDetached,
    NoShadowRoot,
    ScriptThrows(String),
    Returns(Value),
}

#[derive(Default)]
pub struct FakePage {
    scenarios: HashMap<String, Scenario>,
    current: Mutex<Option<String>>,
    /// Shared so a test can still read it after the page has moved into a session.
    pub calls: Arc<Mutex<Vec<String>>>,
}

impl FakePage {
    pub fn new() -> Self { Self::default() }

    pub fn with(mut self, url: &str, scenario: Scenario) -> Self {
        self.scenarios.insert(url.to_string(), scenario);
        self
    }

    pub fn calls(&self) -> Vec<String> { self.calls.lock().unwrap().clone() }

    fn record(&self, call: String) { self.calls.lock().unwrap().push(call); }

    fn scenario(&self) -> Result<Scenario> {
        let current = self.current.lock().unwrap().clone().ok_or_else(|| anyhow!("no page loaded"))?;
        self.scenarios.get(&current).cloned().ok_or_else(|| anyhow!("unscripted url {}", current))
    }
}

#[async_trait]
impl PageHandle for FakePage {
    type Element = String;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.record(format!("navigate {}", url));
        *self.current.lock().unwrap() = Some(url.to_string());
        match self.scenarios.get(url) {
            Some(Scenario::NavigationError(msg)) => bail!("{}", msg),
            Some(Scenario::NavigationHangs) => futures::future::pending().await,
            Some(_) => Ok(()),
            None => bail!("net::ERR_NAME_NOT_RESOLVED at {}", url),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.record(format!("wait_for_selector {} {}", selector, timeout.as_millis()));
        match self.scenario()? {
            Scenario::NoContainer => bail!("Timeout {}ms exceeded waiting for selector `{}`", timeout.as_millis(), selector),
            _ => Ok(()),
        }
    }

    async fn wait_fixed(&self, delay: Duration) {
        self.record(format!("wait_fixed {}", delay.as_millis()));
    }

    async fn query_selector(&self, selector: &str) -> Result<Option<String>> {
        self.record(format!("query_selector {}", selector));
        match self.scenario()? {
            Scenario::NoContainer | Scenario::ContainerDetached => Ok(None),
            _ => Ok(Some(selector.to_string())),
        }
    }

    async fn evaluate_on(&self, _element: &String, function: &str) -> Result<Value> {
        let scenario = self.scenario()?;
        if function == SHADOW_ROOT_PROBE {
            self.record("probe_shadow_root".to_string());
            return Ok(Value::Bool(!matches!(scenario, Scenario::NoShadowRoot)));
        }
        assert_eq!(function, listing_query(), "unexpected script");
        self.record("listing_query".to_string());
        match scenario {
            Scenario::ScriptThrows(msg) => bail!("{}", msg),
            Scenario::Returns(v) => Ok(v),
            other => bail!("listing query reached in scenario {:?}", other),
        }
    }
}

/// Owns a [`FakePage`] and records `close` into the same call log.
pub struct FakeSession {
    pub page: FakePage,
}

#[async_trait]
impl Session for FakeSession {
    type Page = FakePage;

    fn page(&self) -> &FakePage { &self.page }

    async fn close(self) {
        self.page.record("close".to_string());
    }
}
