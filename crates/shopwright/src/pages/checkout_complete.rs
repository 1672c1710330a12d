//! Order confirmation (`/checkout-complete.html`).

use crate::base_page::{BasePage, PageObject};
use crate::element::ElementRef;
use crate::locator::Selector;
use crate::result::ShopResult;

const COMPLETE_CONTAINER: &str = "#checkout_complete_container";
const COMPLETE_HEADER: &str = ".complete-header";
const COMPLETE_TEXT: &str = ".complete-text";
const BACK_HOME_BUTTON: &str = "back-to-products";

/// Header shown after a successful order
pub const THANK_YOU_HEADER: &str = "Thank you for your order!";

/// The confirmation view
#[derive(Debug, Clone)]
pub struct CheckoutCompletePage {
    base: BasePage,
    container: ElementRef,
    header: ElementRef,
    text: ElementRef,
    back_home_button: ElementRef,
}

impl PageObject for CheckoutCompletePage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn url_pattern(&self) -> &'static str {
        r"checkout-complete\.html"
    }
}

impl CheckoutCompletePage {
    /// Build the page object
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            container: base.element(COMPLETE_CONTAINER),
            header: base.element(COMPLETE_HEADER),
            text: base.element(COMPLETE_TEXT),
            back_home_button: base.element(Selector::data_test(BACK_HOME_BUTTON)),
            base,
        }
    }

    /// Whether the confirmation is shown
    pub async fn is_loaded(&self) -> bool {
        self.base.is_visible(&self.container).await
    }

    /// Confirmation header
    pub async fn header(&self) -> ShopResult<String> {
        self.base.get_text(&self.header).await
    }

    /// Confirmation body text
    pub async fn text(&self) -> ShopResult<String> {
        self.base.get_text(&self.text).await
    }

    /// Click "Back Home"
    pub async fn back_to_products(&self) -> ShopResult<()> {
        self.base.click(&self.back_home_button).await
    }
}
