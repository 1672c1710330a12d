//! Checkout overview step (`/checkout-step-two.html`).

use crate::base_page::{BasePage, PageObject};
use crate::element::ElementRef;
use crate::locator::Selector;
use crate::result::ShopResult;
use crate::wait::FINISH_TIMEOUT_MS;
use tracing::warn;

const OVERVIEW_CONTAINER: &str = "#checkout_summary_container";
const CART_ITEMS: &str = ".cart_item";
const ITEM_NAME: &str = ".inventory_item_name";
const ITEM_PRICE: &str = ".inventory_item_price";
const SUBTOTAL_LABEL: &str = ".summary_subtotal_label";
const TAX_LABEL: &str = ".summary_tax_label";
const TOTAL_LABEL: &str = ".summary_total_label";
const FINISH_BUTTON: &str = "finish";
const CANCEL_BUTTON: &str = "cancel";

/// Order summary before purchase
#[derive(Debug, Clone)]
pub struct CheckoutOverviewPage {
    base: BasePage,
    container: ElementRef,
    items: ElementRef,
    subtotal_label: ElementRef,
    tax_label: ElementRef,
    total_label: ElementRef,
    finish_button: ElementRef,
    cancel_button: ElementRef,
}

impl PageObject for CheckoutOverviewPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn url_pattern(&self) -> &'static str {
        r"checkout-step-two\.html"
    }
}

impl CheckoutOverviewPage {
    /// Build the page object
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            container: base.element(OVERVIEW_CONTAINER),
            items: base.element(CART_ITEMS),
            subtotal_label: base.element(SUBTOTAL_LABEL),
            tax_label: base.element(TAX_LABEL),
            total_label: base.element(TOTAL_LABEL),
            finish_button: base.element(Selector::data_test(FINISH_BUTTON)),
            cancel_button: base.element(Selector::data_test(CANCEL_BUTTON)),
            base,
        }
    }

    /// Whether the summary is shown
    pub async fn is_loaded(&self) -> bool {
        self.base.is_visible(&self.container).await
    }

    /// Number of line items
    pub async fn item_count(&self) -> ShopResult<usize> {
        self.items.count().await
    }

    /// Product name of line `index`
    pub async fn item_title(&self, index: usize) -> ShopResult<String> {
        self.base
            .get_text(&self.items.nth(index).locator_in(ITEM_NAME))
            .await
    }

    /// Price text of line `index`
    pub async fn item_price(&self, index: usize) -> ShopResult<String> {
        self.base
            .get_text(&self.items.nth(index).locator_in(ITEM_PRICE))
            .await
    }

    /// Subtotal label, e.g. `Item total: $39.98`
    pub async fn subtotal(&self) -> ShopResult<String> {
        self.base.get_text(&self.subtotal_label).await
    }

    /// Tax label, e.g. `Tax: $3.20`
    pub async fn tax(&self) -> ShopResult<String> {
        self.base.get_text(&self.tax_label).await
    }

    /// Total label, e.g. `Total: $43.18`
    pub async fn total(&self) -> ShopResult<String> {
        self.base.get_text(&self.total_label).await
    }

    /// Place the order.
    ///
    /// Waits up to 15 seconds for the finish button. A failure is logged and
    /// returned unchanged so the caller can decide whether it is fatal.
    pub async fn finish_order(&self) -> ShopResult<()> {
        let result = async {
            self.base.wait_for(&self.finish_button, FINISH_TIMEOUT_MS).await?;
            self.base.click(&self.finish_button).await
        }
        .await;
        if let Err(e) = &result {
            warn!(error = %e, "finish button not found or not clickable");
        }
        result
    }

    /// Abandon the order (back to the inventory)
    pub async fn cancel(&self) -> ShopResult<()> {
        self.base.click(&self.cancel_button).await
    }
}
