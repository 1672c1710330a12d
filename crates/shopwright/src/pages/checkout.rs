//! Checkout information step (`/checkout-step-one.html`).

use crate::base_page::{BasePage, PageObject};
use crate::element::ElementRef;
use crate::locator::Selector;
use crate::result::ShopResult;
use crate::test_data::CheckoutInfo;

const CHECKOUT_CONTAINER: &str = "#checkout_info_container";
const FIRST_NAME_INPUT: &str = "firstName";
const LAST_NAME_INPUT: &str = "lastName";
const POSTAL_CODE_INPUT: &str = "postalCode";
const CONTINUE_BUTTON: &str = "continue";
const CANCEL_BUTTON: &str = "cancel";
const ERROR_MESSAGE: &str = "error";

/// The customer information form
#[derive(Debug, Clone)]
pub struct CheckoutPage {
    base: BasePage,
    container: ElementRef,
    first_name_input: ElementRef,
    last_name_input: ElementRef,
    postal_code_input: ElementRef,
    continue_button: ElementRef,
    cancel_button: ElementRef,
    error_message: ElementRef,
}

impl PageObject for CheckoutPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn url_pattern(&self) -> &'static str {
        r"checkout-step-one\.html"
    }
}

impl CheckoutPage {
    /// Build the page object
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            container: base.element(CHECKOUT_CONTAINER),
            first_name_input: base.element(Selector::data_test(FIRST_NAME_INPUT)),
            last_name_input: base.element(Selector::data_test(LAST_NAME_INPUT)),
            postal_code_input: base.element(Selector::data_test(POSTAL_CODE_INPUT)),
            continue_button: base.element(Selector::data_test(CONTINUE_BUTTON)),
            cancel_button: base.element(Selector::data_test(CANCEL_BUTTON)),
            error_message: base.element(Selector::data_test(ERROR_MESSAGE)),
            base,
        }
    }

    /// Whether the form is shown
    pub async fn is_loaded(&self) -> bool {
        self.base.is_visible(&self.container).await
    }

    /// Fill all three fields in order. Empty strings leave a field blank.
    pub async fn fill_info(&self, first_name: &str, last_name: &str, postal_code: &str) -> ShopResult<()> {
        self.base.fill(&self.first_name_input, first_name).await?;
        self.base.fill(&self.last_name_input, last_name).await?;
        self.base.fill(&self.postal_code_input, postal_code).await
    }

    /// Fill the form from a [`CheckoutInfo`]
    pub async fn fill_customer(&self, info: &CheckoutInfo) -> ShopResult<()> {
        self.fill_info(&info.first_name, &info.last_name, &info.postal_code)
            .await
    }

    /// Submit the form
    pub async fn continue_to_overview(&self) -> ShopResult<()> {
        self.base.click(&self.continue_button).await
    }

    /// Abandon checkout (back to the cart)
    pub async fn cancel(&self) -> ShopResult<()> {
        self.base.click(&self.cancel_button).await
    }

    /// Text of the validation banner
    pub async fn error_message(&self) -> ShopResult<String> {
        self.base.get_text(&self.error_message).await
    }

    /// Whether the validation banner is shown
    pub async fn is_error_visible(&self) -> bool {
        self.base.is_visible(&self.error_message).await
    }

    /// Empty all three fields
    pub async fn clear_form(&self) -> ShopResult<()> {
        self.fill_info("", "", "").await
    }

    /// Current values of the three fields
    pub async fn values(&self) -> ShopResult<CheckoutInfo> {
        Ok(CheckoutInfo::new(
            &self.base.input_value(&self.first_name_input).await?,
            &self.base.input_value(&self.last_name_input).await?,
            &self.base.input_value(&self.postal_code_input).await?,
        ))
    }
}
