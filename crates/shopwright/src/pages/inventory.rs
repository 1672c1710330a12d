//! Inventory view (`/inventory.html`).

use crate::base_page::{BasePage, PageObject};
use crate::driver::{ImageLoadState, IMAGE_LOAD_STATE_FN};
use crate::element::ElementRef;
use crate::locator::Selector;
use crate::result::{ShopError, ShopResult};
use crate::wait::{SORT_TIMEOUT_MS, VISIBILITY_PROBE_TIMEOUT_MS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

const INVENTORY_CONTAINER: &str = "#inventory_container";
const INVENTORY_ITEMS: &str = ".inventory_item";
const ITEM_NAME: &str = ".inventory_item_name";
const ITEM_PRICE: &str = ".inventory_item_price";
const ITEM_IMAGE: &str = ".inventory_item_img img";
const ITEM_BUTTON: &str = "button";
const CART_BADGE: &str = ".shopping_cart_badge";
const CART_LINK: &str = ".shopping_cart_link";
const SORT_DROPDOWN: &str = "product_sort_container";
const MENU_BUTTON: &str = "#react-burger-menu-btn";
const LOGOUT_LINK: &str = "#logout_sidebar_link";

/// Inventory sort orders (values of the sort dropdown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    /// Name (A to Z)
    Az,
    /// Name (Z to A)
    Za,
    /// Price (low to high)
    Lohi,
    /// Price (high to low)
    Hilo,
}

impl SortOption {
    /// Every option
    pub const ALL: [Self; 4] = [Self::Az, Self::Za, Self::Lohi, Self::Hilo];

    /// Dropdown value
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Az => "az",
            Self::Za => "za",
            Self::Lohi => "lohi",
            Self::Hilo => "hilo",
        }
    }

    /// Dropdown label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Az => "Name (A to Z)",
            Self::Za => "Name (Z to A)",
            Self::Lohi => "Price (low to high)",
            Self::Hilo => "Price (high to low)",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for SortOption {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|o| o.value().eq_ignore_ascii_case(trimmed) || o.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ShopError::Config {
                message: format!("unknown sort option '{s}' (expected az, za, lohi or hilo)"),
            })
    }
}

/// Parse cart badge text; anything but a non-negative integer counts as 0
#[must_use]
pub fn parse_badge_count(text: &str) -> usize {
    text.trim().parse().unwrap_or(0)
}

/// The product list
#[derive(Debug, Clone)]
pub struct InventoryPage {
    base: BasePage,
    container: ElementRef,
    items: ElementRef,
    cart_badge: ElementRef,
    cart_link: ElementRef,
    sort_dropdown: ElementRef,
    menu_button: ElementRef,
    logout_link: ElementRef,
}

impl PageObject for InventoryPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn url_pattern(&self) -> &'static str {
        r"inventory\.html"
    }
}

impl InventoryPage {
    /// Build the page object
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            container: base.element(INVENTORY_CONTAINER),
            items: base.element(INVENTORY_ITEMS),
            cart_badge: base.element(CART_BADGE),
            cart_link: base.element(CART_LINK),
            sort_dropdown: base.element(Selector::data_test(SORT_DROPDOWN)),
            menu_button: base.element(MENU_BUTTON),
            logout_link: base.element(LOGOUT_LINK),
            base,
        }
    }

    fn item_part(&self, index: usize, selector: &str) -> ElementRef {
        self.items.nth(index).locator_in(selector)
    }

    /// Whether the product list is shown
    pub async fn is_loaded(&self) -> bool {
        self.base.is_visible(&self.container).await
    }

    /// Number of products listed
    pub async fn item_count(&self) -> ShopResult<usize> {
        self.items.count().await
    }

    /// Name of product `index`
    pub async fn item_title(&self, index: usize) -> ShopResult<String> {
        self.base.get_text(&self.item_part(index, ITEM_NAME)).await
    }

    /// Price text (e.g. `$29.99`) of product `index`
    pub async fn item_price(&self, index: usize) -> ShopResult<String> {
        self.base.get_text(&self.item_part(index, ITEM_PRICE)).await
    }

    /// Image `src` of product `index`, `""` when absent
    pub async fn item_image_src(&self, index: usize) -> ShopResult<String> {
        Ok(self
            .base
            .get_attribute(&self.item_part(index, ITEM_IMAGE), "src")
            .await?
            .unwrap_or_default())
    }

    /// Label of product `index`'s cart button
    pub async fn item_button_text(&self, index: usize) -> ShopResult<String> {
        self.base.get_text(&self.item_part(index, ITEM_BUTTON)).await
    }

    /// Click product `index`'s "Add to cart"
    pub async fn add_item_to_cart(&self, index: usize) -> ShopResult<()> {
        self.base.click(&self.item_part(index, ITEM_BUTTON)).await
    }

    /// Click product `index`'s "Remove"
    pub async fn remove_item_from_cart(&self, index: usize) -> ShopResult<()> {
        self.base.click(&self.item_part(index, ITEM_BUTTON)).await
    }

    /// Cart badge count; 0 when the badge is hidden or unreadable
    pub async fn cart_item_count(&self) -> usize {
        if !self.base.is_visible(&self.cart_badge).await {
            return 0;
        }
        match self.base.get_text(&self.cart_badge).await {
            Ok(text) => parse_badge_count(&text),
            Err(e) => {
                debug!(error = %e, "cart badge unreadable");
                0
            }
        }
    }

    /// Open the cart
    pub async fn go_to_cart(&self) -> ShopResult<()> {
        self.base.click(&self.cart_link).await
    }

    /// Choose a sort order. Waits up to 15 seconds for the dropdown and
    /// propagates every failure.
    pub async fn sort_by(&self, option: SortOption) -> ShopResult<()> {
        self.base
            .select_option_within(&self.sort_dropdown, option.value(), SORT_TIMEOUT_MS)
            .await
            .map_err(|e| {
                warn!(%option, error = %e, "sort dropdown not found or not selectable");
                e
            })
    }

    /// Open the burger menu and log out
    pub async fn logout(&self) -> ShopResult<()> {
        self.base.click(&self.menu_button).await?;
        self.base.click(&self.logout_link).await
    }

    /// Whether product `index`'s image failed to load.
    ///
    /// Absent or slow images (5 second wait) count as broken.
    pub async fn is_item_image_broken(&self, index: usize) -> bool {
        let image = self.item_part(index, ITEM_IMAGE);
        if let Err(e) = self.base.wait_for(&image, VISIBILITY_PROBE_TIMEOUT_MS).await {
            debug!(index, error = %e, "image not found; treating as broken");
            return true;
        }
        let state = self
            .base
            .page()
            .evaluate(image.locator(), IMAGE_LOAD_STATE_FN)
            .await
            .and_then(|value| serde_json::from_value::<ImageLoadState>(value).map_err(ShopError::from));
        match state {
            Ok(state) => !state.is_loaded(),
            Err(e) => {
                debug!(index, error = %e, "image state unreadable; treating as broken");
                true
            }
        }
    }

    /// Every product name, in display order
    pub async fn item_titles(&self) -> ShopResult<Vec<String>> {
        let count = self.item_count().await?;
        let mut titles = Vec::with_capacity(count);
        for i in 0..count {
            titles.push(self.item_title(i).await?);
        }
        Ok(titles)
    }

    /// Every product price text, in display order
    pub async fn item_prices(&self) -> ShopResult<Vec<String>> {
        let count = self.item_count().await?;
        let mut prices = Vec::with_capacity(count);
        for i in 0..count {
            prices.push(self.item_price(i).await?);
        }
        Ok(prices)
    }
}
