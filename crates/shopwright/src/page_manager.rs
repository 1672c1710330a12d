//! One instance of every page object over one page handle.

use crate::base_page::BasePage;
use crate::config::SuiteConfig;
use crate::driver::SharedPage;
use crate::pages::{
    CartPage, CheckoutCompletePage, CheckoutOverviewPage, CheckoutPage, InventoryPage, LoginPage,
};

/// Per-scenario aggregate of page objects.
///
/// Every page object shares the same page handle. Construction performs no
/// I/O and cannot fail.
#[derive(Debug, Clone)]
pub struct PageManager {
    page: SharedPage,
    /// Login view
    pub login: LoginPage,
    /// Inventory view
    pub inventory: InventoryPage,
    /// Cart view
    pub cart: CartPage,
    /// Checkout information step
    pub checkout: CheckoutPage,
    /// Checkout overview step
    pub checkout_overview: CheckoutOverviewPage,
    /// Order confirmation
    pub checkout_complete: CheckoutCompletePage,
}

impl PageManager {
    /// Bind every page object to `page`
    #[must_use]
    pub fn new(page: SharedPage, config: &SuiteConfig) -> Self {
        Self::from_base(BasePage::new(page, config))
    }

    /// Bind every page object to an existing base page
    #[must_use]
    pub fn from_base(base: BasePage) -> Self {
        Self {
            page: base.page().clone(),
            login: LoginPage::new(base.clone()),
            inventory: InventoryPage::new(base.clone()),
            cart: CartPage::new(base.clone()),
            checkout: CheckoutPage::new(base.clone()),
            checkout_overview: CheckoutOverviewPage::new(base.clone()),
            checkout_complete: CheckoutCompletePage::new(base),
        }
    }

    /// The shared page handle
    #[must_use]
    pub fn page(&self) -> &SharedPage {
        &self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base_page::PageObject;
    use crate::mock::MockPage;
    use std::sync::Arc;

    #[test]
    fn test_all_pages_share_one_handle() {
        let mock = Arc::new(MockPage::new());
        let page: SharedPage = mock.clone();
        let manager = PageManager::new(page.clone(), &SuiteConfig::default());
        assert!(Arc::ptr_eq(manager.page(), &page));
        assert!(Arc::ptr_eq(manager.login.base().page(), &page));
        assert!(Arc::ptr_eq(manager.checkout_complete.base().page(), &page));
    }

    #[tokio::test]
    async fn test_construction_does_no_io() {
        let mock = Arc::new(MockPage::new());
        let _manager = PageManager::new(mock.clone(), &SuiteConfig::default());
        assert!(mock.history().is_empty());
    }
}
