//! PageDriver - the browser page handle every page object talks to.
//!
//! The trait is the seam between the page-object layer and whatever
//! actually drives a browser:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageManager ─► LoginPage / InventoryPage / ... ─► BasePage  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Arc<dyn PageDriver>                                         │
//! │    ├── ChromiumPage   (feature "browser", chromiumoxide/CDP) │
//! │    └── MockPage       (in-memory DOM, storefront double)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every locator-taking method resolves the locator again on each call.
//! Single-element operations act on the first match and fail with
//! [`ShopError::NotFound`](crate::ShopError::NotFound) when there is none,
//! except `is_visible` and `count`, which report absence as `false` / `0`.

use crate::locator::Locator;
use crate::result::ShopResult;
use crate::wait::LoadState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// A page handle shared by every page object of one scenario
pub type SharedPage = Arc<dyn PageDriver>;

/// Abstract driver for one browser page
#[async_trait]
pub trait PageDriver: Send + Sync + std::fmt::Debug {
    /// Navigate to an absolute URL and wait for the `load` event
    async fn goto(&self, url: &str) -> ShopResult<()>;

    /// Current page URL
    async fn url(&self) -> ShopResult<String>;

    /// Current document title
    async fn title(&self) -> ShopResult<String>;

    /// Wait for a page load state
    async fn wait_for_load_state(&self, state: LoadState, timeout: Duration) -> ShopResult<()>;

    /// Number of elements matching the locator
    async fn count(&self, locator: &Locator) -> ShopResult<usize>;

    /// Whether the first match is rendered and visible right now
    async fn is_visible(&self, locator: &Locator) -> ShopResult<bool>;

    /// Whether the first match is enabled
    async fn is_enabled(&self, locator: &Locator) -> ShopResult<bool>;

    /// Click the first match
    async fn click(&self, locator: &Locator) -> ShopResult<()>;

    /// Replace the value of the first matching input
    async fn fill(&self, locator: &Locator, value: &str) -> ShopResult<()>;

    /// Select an option (by value) in the first matching `<select>`
    async fn select_option(&self, locator: &Locator, value: &str) -> ShopResult<()>;

    /// Text content of the first match (`None` when the node has none)
    async fn text_content(&self, locator: &Locator) -> ShopResult<Option<String>>;

    /// Current value of the first matching input
    async fn input_value(&self, locator: &Locator) -> ShopResult<String>;

    /// Attribute of the first match
    async fn get_attribute(&self, locator: &Locator, name: &str) -> ShopResult<Option<String>>;

    /// Evaluate a JavaScript function `(el) => ...` against the first match
    async fn evaluate(&self, locator: &Locator, function: &str) -> ShopResult<serde_json::Value>;

    /// Capture a PNG screenshot
    async fn screenshot(&self, full_page: bool) -> ShopResult<Vec<u8>>;

    /// Close the page
    async fn close(&self) -> ShopResult<()>;
}

/// Script reporting whether an `<img>` finished loading
pub const IMAGE_LOAD_STATE_FN: &str = "(img) => ({ complete: img.complete, naturalWidth: img.naturalWidth, naturalHeight: img.naturalHeight })";

/// Load state of an image element as reported by the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLoadState {
    /// `img.complete`
    #[serde(default)]
    pub complete: bool,
    /// `img.naturalWidth`
    #[serde(default)]
    pub natural_width: u32,
    /// `img.naturalHeight`
    #[serde(default)]
    pub natural_height: u32,
}

impl ImageLoadState {
    /// Loaded means complete with both natural dimensions non-zero
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.complete && self.natural_width > 0 && self.natural_height > 0
    }
}

/// Device descriptor for emulation
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceDescriptor {
    /// Device name
    pub name: &'static str,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Device scale factor
    pub device_scale_factor: f64,
    /// Is mobile device
    pub is_mobile: bool,
    /// Has touch support
    pub has_touch: bool,
    /// Default user agent
    pub user_agent: &'static str,
}

impl DeviceDescriptor {
    /// Desktop Chrome (1280x720)
    pub const DESKTOP_CHROME: Self = Self {
        name: "Desktop Chrome",
        viewport_width: 1280,
        viewport_height: 720,
        device_scale_factor: 1.0,
        is_mobile: false,
        has_touch: false,
        user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    };

    /// Pixel 5
    pub const PIXEL_5: Self = Self {
        name: "Pixel 5",
        viewport_width: 393,
        viewport_height: 851,
        device_scale_factor: 2.75,
        is_mobile: true,
        has_touch: true,
        user_agent: "Mozilla/5.0 (Linux; Android 11; Pixel 5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Mobile Safari/537.36",
    };

    /// iPhone 12
    pub const IPHONE_12: Self = Self {
        name: "iPhone 12",
        viewport_width: 390,
        viewport_height: 844,
        device_scale_factor: 3.0,
        is_mobile: true,
        has_touch: true,
        user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 14_4 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Mobile/15E148 Safari/604.1",
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    mod image_state_tests {
        use super::*;

        #[test]
        fn test_loaded_requires_all_three() {
            let loaded = ImageLoadState {
                complete: true,
                natural_width: 640,
                natural_height: 480,
            };
            assert!(loaded.is_loaded());

            assert!(!ImageLoadState {
                complete: false,
                ..loaded
            }
            .is_loaded());
            assert!(!ImageLoadState {
                natural_width: 0,
                ..loaded
            }
            .is_loaded());
            assert!(!ImageLoadState {
                natural_height: 0,
                ..loaded
            }
            .is_loaded());
        }

        #[test]
        fn test_deserialize_browser_shape() {
            let state: ImageLoadState = serde_json::from_value(serde_json::json!({
                "complete": true,
                "naturalWidth": 0,
                "naturalHeight": 0
            }))
            .unwrap();
            assert!(state.complete);
            assert!(!state.is_loaded());
        }

        #[test]
        fn test_missing_fields_default_to_not_loaded() {
            let state: ImageLoadState = serde_json::from_value(serde_json::json!({})).unwrap();
            assert_eq!(state, ImageLoadState::default());
        }
    }

    mod device_descriptor_tests {
        use super::*;

        #[test]
        fn test_mobile_profiles() {
            assert!(DeviceDescriptor::PIXEL_5.is_mobile);
            assert!(DeviceDescriptor::IPHONE_12.has_touch);
            assert!(!DeviceDescriptor::DESKTOP_CHROME.is_mobile);
            assert_eq!(DeviceDescriptor::IPHONE_12.viewport_width, 390);
        }
    }
}
