//! Wait mechanisms.
//!
//! Polling waits over a [`PageDriver`]. Every wait runs on tokio time, so a
//! paused test clock drives deadlines deterministically.

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use regex::Regex;
use std::time::Duration;
use tokio::time::Instant;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for element waits (10 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Timeout used by visibility probes (5 seconds)
pub const VISIBILITY_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Timeout before clicking the checkout finish button (15 seconds)
pub const FINISH_TIMEOUT_MS: u64 = 15_000;

/// Timeout for the inventory sort dropdown (15 seconds)
pub const SORT_TIMEOUT_MS: u64 = 15_000;

/// Default timeout for URL expectations (5 seconds)
pub const URL_EXPECT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Network idle threshold (500ms without requests)
pub const NETWORK_IDLE_THRESHOLD_MS: u64 = 500;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle (no requests for 500ms)
    NetworkIdle,
}

impl LoadState {
    /// Get the event name for this load state
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "DOMContentLoaded",
            Self::NetworkIdle => "networkidle",
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.event_name())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAITS
// =============================================================================

/// Wait until the first match of `locator` is attached and visible.
///
/// Absence (`NotFound`/`Detached`) while polling means "not yet"; any other
/// driver error is returned immediately. Returns the time spent waiting.
pub async fn wait_for_visible(
    page: &dyn PageDriver,
    locator: &Locator,
    options: &WaitOptions,
) -> ShopResult<Duration> {
    let start = Instant::now();
    let deadline = start + options.timeout();

    loop {
        match page.is_visible(locator).await {
            Ok(true) => return Ok(start.elapsed()),
            Ok(false) => {}
            Err(e) if e.is_missing_element() => {}
            Err(e) => return Err(e),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ShopError::Timeout {
                ms: options.timeout_ms,
                what: locator.to_string(),
            });
        }
        tokio::time::sleep(options.poll_interval().min(deadline - now)).await;
    }
}

/// Wait until the page URL matches `pattern`
pub async fn wait_for_url(
    page: &dyn PageDriver,
    pattern: &Regex,
    options: &WaitOptions,
) -> ShopResult<String> {
    let start = Instant::now();
    let deadline = start + options.timeout();

    loop {
        let url = page.url().await?;
        if pattern.is_match(&url) {
            return Ok(url);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(ShopError::Timeout {
                ms: options.timeout_ms,
                what: format!("URL matching /{}/ (last: {url})", pattern.as_str()),
            });
        }
        tokio::time::sleep(options.poll_interval().min(deadline - now)).await;
    }
}
