//! Cart view (`/cart.html`).

use crate::base_page::{BasePage, PageObject};
use crate::element::ElementRef;
use crate::locator::Selector;
use crate::result::ShopResult;
use tracing::debug;

const CART_CONTAINER: &str = "#cart_contents_container";
const CART_ITEMS: &str = ".cart_item";
const ITEM_NAME: &str = ".inventory_item_name";
const ITEM_PRICE: &str = ".inventory_item_price";
const ITEM_QUANTITY: &str = ".cart_quantity";
const REMOVE_BUTTONS: &str = r#"[data-test*="remove-"]"#;
const CHECKOUT_BUTTON: &str = "checkout";
const CONTINUE_SHOPPING_BUTTON: &str = "continue-shopping";

/// The cart listing
#[derive(Debug, Clone)]
pub struct CartPage {
    base: BasePage,
    container: ElementRef,
    items: ElementRef,
    remove_buttons: ElementRef,
    checkout_button: ElementRef,
    continue_shopping_button: ElementRef,
}

impl PageObject for CartPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn url_pattern(&self) -> &'static str {
        r"cart\.html"
    }
}

impl CartPage {
    /// Build the page object
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            container: base.element(CART_CONTAINER),
            items: base.element(CART_ITEMS),
            remove_buttons: base.element(REMOVE_BUTTONS),
            checkout_button: base.element(Selector::data_test(CHECKOUT_BUTTON)),
            continue_shopping_button: base.element(Selector::data_test(CONTINUE_SHOPPING_BUTTON)),
            base,
        }
    }

    /// Whether the cart view is shown
    pub async fn is_loaded(&self) -> bool {
        self.base.is_visible(&self.container).await
    }

    /// Number of rows
    pub async fn item_count(&self) -> ShopResult<usize> {
        self.items.count().await
    }

    /// Product name of row `index`
    pub async fn item_title(&self, index: usize) -> ShopResult<String> {
        self.base
            .get_text(&self.items.nth(index).locator_in(ITEM_NAME))
            .await
    }

    /// Price text of row `index`
    pub async fn item_price(&self, index: usize) -> ShopResult<String> {
        self.base
            .get_text(&self.items.nth(index).locator_in(ITEM_PRICE))
            .await
    }

    /// Quantity text of row `index`
    pub async fn item_quantity(&self, index: usize) -> ShopResult<String> {
        self.base
            .get_text(&self.items.nth(index).locator_in(ITEM_QUANTITY))
            .await
    }

    /// Click the `index`th "Remove" button.
    ///
    /// Later rows shift down by one after each removal.
    pub async fn remove_item(&self, index: usize) -> ShopResult<()> {
        self.base.click(&self.remove_buttons.nth(index)).await
    }

    /// Remove every row by repeatedly removing row 0
    pub async fn remove_all_items(&self) -> ShopResult<()> {
        let count = self.item_count().await?;
        debug!(count, "removing all cart items");
        for _ in 0..count {
            self.remove_item(0).await?;
        }
        Ok(())
    }

    /// Whether the cart has no rows
    pub async fn is_empty(&self) -> ShopResult<bool> {
        Ok(self.item_count().await? == 0)
    }

    /// Click "Checkout"
    pub async fn proceed_to_checkout(&self) -> ShopResult<()> {
        self.base.click(&self.checkout_button).await
    }

    /// Click "Continue Shopping"
    pub async fn continue_shopping(&self) -> ShopResult<()> {
        self.base.click(&self.continue_shopping_button).await
    }
}
