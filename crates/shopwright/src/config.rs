//! Suite configuration.
//!
//! [`SuiteConfig`] is resolved once per process and then passed by
//! reference to whatever opens browser sessions. Values come from the
//! process environment first, then from a `.env` file, then defaults.
//! Reading the `.env` file never mutates the process environment.

use crate::driver::DeviceDescriptor;
use crate::result::{ShopError, ShopResult};
use crate::test_data::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Default per-action and navigation timeout (30 seconds)
pub const DEFAULT_DRIVER_TIMEOUT_MS: u64 = 30_000;

/// Default screenshot directory
pub const DEFAULT_SCREENSHOT_DIR: &str = "test-results/screenshots";

/// Retries applied when `CI` is set and `RETRIES` is not
pub const CI_RETRIES: u32 = 2;

/// Browser selection.
///
/// Every kind is driven through Chromium over CDP; the mobile kinds add
/// device emulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrowserKind {
    /// Chromium (default)
    #[default]
    Chromium,
    /// Google Chrome
    Chrome,
    /// Firefox (runs on Chromium)
    Firefox,
    /// WebKit (runs on Chromium)
    Webkit,
    /// Safari (runs on Chromium)
    Safari,
    /// Pixel 5 emulation
    MobileChrome,
    /// iPhone 12 emulation
    MobileSafari,
}

impl BrowserKind {
    /// All kinds
    pub const ALL: [Self; 7] = [
        Self::Chromium,
        Self::Chrome,
        Self::Firefox,
        Self::Webkit,
        Self::Safari,
        Self::MobileChrome,
        Self::MobileSafari,
    ];

    /// Configuration name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chromium => "chromium",
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
            Self::Webkit => "webkit",
            Self::Safari => "safari",
            Self::MobileChrome => "mobile-chrome",
            Self::MobileSafari => "mobile-safari",
        }
    }

    /// Parse leniently: unknown names fall back to Chromium
    #[must_use]
    pub fn from_env_value(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Device profile to emulate
    #[must_use]
    pub const fn device(self) -> DeviceDescriptor {
        match self {
            Self::MobileChrome => DeviceDescriptor::PIXEL_5,
            Self::MobileSafari => DeviceDescriptor::IPHONE_12,
            _ => DeviceDescriptor::DESKTOP_CHROME,
        }
    }

    /// Whether this kind emulates a phone
    #[must_use]
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::MobileChrome | Self::MobileSafari)
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrowserKind {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == lower)
            .ok_or_else(|| ShopError::Config {
                message: format!(
                    "unknown browser '{s}' (expected one of: {})",
                    Self::ALL.map(Self::as_str).join(", ")
                ),
            })
    }
}

/// Immutable suite configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Storefront base URL, without trailing slash
    pub base_url: String,
    /// Browser selection
    pub browser: BrowserKind,
    /// Run without a visible window
    pub headless: bool,
    /// Driver-level action timeout
    pub action_timeout_ms: u64,
    /// Driver-level navigation timeout
    pub navigation_timeout_ms: u64,
    /// Retries per failed scenario
    pub retries: u32,
    /// Concurrent scenario workers
    pub workers: usize,
    /// Where screenshots are written
    pub screenshot_dir: PathBuf,
    /// Explicit Chromium executable
    pub chromium_path: Option<PathBuf>,
    /// Kill lingering browser processes after a run
    pub cleanup_browsers: bool,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            browser: BrowserKind::default(),
            headless: true,
            action_timeout_ms: DEFAULT_DRIVER_TIMEOUT_MS,
            navigation_timeout_ms: DEFAULT_DRIVER_TIMEOUT_MS,
            retries: 0,
            workers: 1,
            screenshot_dir: PathBuf::from(DEFAULT_SCREENSHOT_DIR),
            chromium_path: None,
            cleanup_browsers: false,
        }
    }
}

/// `true`, `1` or `yes` (any case); empty means "unset"
fn parse_flag(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        None | Some("") => default,
        Some(v) => ["true", "1", "yes"]
            .iter()
            .any(|t| v.eq_ignore_ascii_case(t)),
    }
}

fn parse_number<T: FromStr>(value: Option<String>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl SuiteConfig {
    /// Resolve from the process environment and the nearest `.env` file
    pub fn load() -> ShopResult<Self> {
        let cwd = std::env::current_dir()?;
        let file_vars = match find_dotenv(&cwd) {
            Some(path) => {
                let vars = read_dotenv(&path)?;
                info!(path = %path.display(), keys = vars.len(), "loaded .env file");
                vars
            }
            None => {
                debug!(cwd = %cwd.display(), "no .env file found; using process environment and defaults");
                HashMap::new()
            }
        };
        let config = Self::from_lookup(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        });
        info!(
            base_url = %config.base_url,
            browser = %config.browser,
            headless = config.headless,
            workers = config.workers,
            retries = config.retries,
            "configuration resolved"
        );
        Ok(config)
    }

    /// Resolve from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let ci = non_empty(lookup("CI")).is_some();
        let base_url = non_empty(lookup("BASE_URL"))
            .map_or(defaults.base_url, |u| u.trim().trim_end_matches('/').to_string());

        Self {
            base_url,
            browser: non_empty(lookup("BROWSER"))
                .map_or(defaults.browser, |b| BrowserKind::from_env_value(&b)),
            headless: parse_flag(lookup("HEADLESS"), defaults.headless),
            action_timeout_ms: parse_number(lookup("ACTION_TIMEOUT"), defaults.action_timeout_ms),
            navigation_timeout_ms: parse_number(
                lookup("NAVIGATION_TIMEOUT"),
                defaults.navigation_timeout_ms,
            ),
            retries: parse_number(
                lookup("RETRIES"),
                if ci { CI_RETRIES } else { defaults.retries },
            ),
            workers: if ci {
                1
            } else {
                parse_number(lookup("WORKERS"), defaults.workers).max(1)
            },
            screenshot_dir: non_empty(lookup("SCREENSHOT_DIR"))
                .map_or(defaults.screenshot_dir, PathBuf::from),
            chromium_path: non_empty(lookup("CHROMIUM_PATH")).map(PathBuf::from),
            cleanup_browsers: parse_flag(lookup("CLEANUP_BROWSERS"), defaults.cleanup_browsers),
        }
    }

    /// Override the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the browser
    #[must_use]
    pub const fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    /// Override headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Override retries
    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Override worker count (at least one)
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Override the screenshot directory
    #[must_use]
    pub fn with_screenshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.screenshot_dir = dir.into();
        self
    }

    /// Absolute URL for `path`; absolute URLs pass through
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Device profile for the selected browser
    #[must_use]
    pub const fn device(&self) -> DeviceDescriptor {
        self.browser.device()
    }
}

/// Join `path` onto `base_url`; `http(s)://` paths pass through
#[must_use]
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// First `.env` found walking up from `start`
#[must_use]
pub fn find_dotenv(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}

/// Parse a `.env` file into a map without touching the process environment
pub fn read_dotenv(path: &Path) -> ShopResult<HashMap<String, String>> {
    let config_error = |e: dotenvy::Error| ShopError::Config {
        message: format!("{}: {e}", path.display()),
    };
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(config_error)? {
        let (key, value) = item.map_err(config_error)?;
        vars.insert(key, value);
    }
    Ok(vars)
}
