use std::env;
use std::time::Duration;

pub const DEFAULT_CONTAINER_SELECTOR: &str = ".ihf-container";

#[derive(Clone, Debug, PartialEq)]
pub struct ExtractConfig {
    /// Host element that carries the listing's shadow root.
    pub container_selector: String,
    pub navigation_timeout: Duration,
    pub container_timeout: Duration,
    /// Extra wait after the container appears. Content inside the shadow root renders
    /// asynchronously without a DOM signal we can wait on, so this is a heuristic and
    /// slow pages can still come back half-rendered.
    pub settle_delay: Duration,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            container_selector: DEFAULT_CONTAINER_SELECTOR.to_string(),
            navigation_timeout: Duration::from_millis(30_000),
            container_timeout: Duration::from_millis(30_000),
            settle_delay: Duration::from_millis(2_500),
        }
    }
}

impl ExtractConfig {
    /// Defaults overridden by `LISTINGS_CONTAINER_SELECTOR`, `LISTINGS_NAV_TIMEOUT_MS`,
    /// `LISTINGS_CONTAINER_TIMEOUT_MS` and `LISTINGS_SETTLE_MS`.
    pub fn from_env() -> Self {
        let d = Self::default();
        let var = |key: &str| env::var(key).ok();
        ExtractConfig {
            container_selector: var("LISTINGS_CONTAINER_SELECTOR")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(d.container_selector),
            navigation_timeout: ms_or(var("LISTINGS_NAV_TIMEOUT_MS").as_deref(), d.navigation_timeout),
            container_timeout: ms_or(var("LISTINGS_CONTAINER_TIMEOUT_MS").as_deref(), d.container_timeout),
            settle_delay: ms_or(var("LISTINGS_SETTLE_MS").as_deref(), d.settle_delay),
        }
    }
}

fn ms_or(raw: Option<&str>, default: Duration) -> Duration {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
