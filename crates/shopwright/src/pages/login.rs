//! Login view (`/`).

use crate::base_page::{BasePage, PageObject};
use crate::element::ElementRef;
use crate::locator::Selector;
use crate::result::ShopResult;
use crate::test_data::User;
use tracing::info;

const USERNAME_INPUT: &str = "#user-name";
const PASSWORD_INPUT: &str = "#password";
const LOGIN_BUTTON: &str = "#login-button";
const ERROR_MESSAGE: &str = "error";

/// The login form
#[derive(Debug, Clone)]
pub struct LoginPage {
    base: BasePage,
    username_input: ElementRef,
    password_input: ElementRef,
    login_button: ElementRef,
    error_message: ElementRef,
}

impl PageObject for LoginPage {
    fn base(&self) -> &BasePage {
        &self.base
    }

    fn url_pattern(&self) -> &'static str {
        r"/(index\.html)?$"
    }
}

impl LoginPage {
    /// Build the page object
    #[must_use]
    pub fn new(base: BasePage) -> Self {
        Self {
            username_input: base.element(USERNAME_INPUT),
            password_input: base.element(PASSWORD_INPUT),
            login_button: base.element(LOGIN_BUTTON),
            error_message: base.element(Selector::data_test(ERROR_MESSAGE)),
            base,
        }
    }

    /// Username field
    #[must_use]
    pub const fn username_input(&self) -> &ElementRef {
        &self.username_input
    }

    /// Password field
    #[must_use]
    pub const fn password_input(&self) -> &ElementRef {
        &self.password_input
    }

    /// Submit button
    #[must_use]
    pub const fn login_button(&self) -> &ElementRef {
        &self.login_button
    }

    /// Open the login view (`path` relative to the base URL)
    pub async fn goto(&self, path: &str) -> ShopResult<()> {
        self.base.goto(path).await
    }

    /// Fill both fields and submit. Does not wait for navigation.
    pub async fn login(&self, user: &User) -> ShopResult<()> {
        info!(user = user.username, "login");
        self.login_with(user.username, user.password).await
    }

    /// Fill both fields with raw values and submit
    pub async fn login_with(&self, username: &str, password: &str) -> ShopResult<()> {
        self.base.fill(&self.username_input, username).await?;
        self.base.fill(&self.password_input, password).await?;
        self.base.click(&self.login_button).await
    }

    /// Text of the error banner
    pub async fn error_message(&self) -> ShopResult<String> {
        self.base.get_text(&self.error_message).await
    }

    /// Whether the error banner is shown
    pub async fn is_error_visible(&self) -> bool {
        self.base.is_visible(&self.error_message).await
    }

    /// Whether the submit button is enabled
    pub async fn is_login_button_enabled(&self) -> ShopResult<bool> {
        self.base.is_enabled(&self.login_button).await
    }

    /// Empty both fields
    pub async fn clear_form(&self) -> ShopResult<()> {
        self.base.fill(&self.username_input, "").await?;
        self.base.fill(&self.password_input, "").await
    }

    /// Current username field value
    pub async fn username_value(&self) -> ShopResult<String> {
        self.base.input_value(&self.username_input).await
    }

    /// Current password field value
    pub async fn password_value(&self) -> ShopResult<String> {
        self.base.input_value(&self.password_input).await
    }

    /// Whether the form is shown
    pub async fn is_loaded(&self) -> bool {
        self.base.is_visible(&self.login_button).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::test_support::storefront;

    #[tokio::test(start_paused = true)]
    async fn test_login_fills_then_submits() {
        let (mock, base) = storefront().await;
        let login = LoginPage::new(base);
        assert!(login.is_loaded().await);
        login.login(&User::STANDARD).await.unwrap();

        let calls: Vec<String> = mock
            .history()
            .into_iter()
            .filter(|c| !c.starts_with("goto"))
            .collect();
        assert_eq!(
            calls,
            vec![
                "fill:#user-name=standard_user",
                "fill:#password=secret_sauce",
                "click:#login-button",
            ]
        );
        assert!(login.base().current_url().await.unwrap().ends_with("/inventory.html"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_out_error() {
        let (_mock, base) = storefront().await;
        let login = LoginPage::new(base);
        login.login(&User::LOCKED_OUT).await.unwrap();
        assert!(login.is_error_visible().await);
        assert!(login
            .error_message()
            .await
            .unwrap()
            .to_lowercase()
            .contains("locked out"));
        login.base().expect_url(login.url_pattern()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_error_banner_initially() {
        let (_mock, base) = storefront().await;
        let login = LoginPage::new(base);
        assert!(!login.is_error_visible().await);
        assert!(login.is_login_button_enabled().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_form() {
        let (_mock, base) = storefront().await;
        let login = LoginPage::new(base);
        login.base().fill(login.username_input(), "test_user").await.unwrap();
        login.base().fill(login.password_input(), "test_password").await.unwrap();
        assert_eq!(login.username_value().await.unwrap(), "test_user");

        login.clear_form().await.unwrap();
        assert_eq!(login.username_value().await.unwrap(), "");
        assert_eq!(login.password_value().await.unwrap(), "");
    }

    #[test]
    fn test_page_name() {
        let page: crate::driver::SharedPage = std::sync::Arc::new(crate::mock::MockPage::new());
        let login = LoginPage::new(BasePage::with_settings(page, "https://shop.test", "s".into()));
        assert_eq!(login.page_name(), "LoginPage");
    }
}
