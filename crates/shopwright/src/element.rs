//! Live element handles.

use crate::driver::SharedPage;
use crate::locator::{Locator, Selector};
use crate::result::ShopResult;
use std::fmt;

/// Handle to zero or more elements of one page.
///
/// Holds a [`Locator`], not a node: every operation resolves it again, so a
/// handle created when a page object is built stays valid across
/// re-renders for as long as the page is open.
#[derive(Clone)]
pub struct ElementRef {
    page: SharedPage,
    locator: Locator,
}

impl ElementRef {
    /// Bind a locator to a page
    #[must_use]
    pub fn new(page: SharedPage, locator: Locator) -> Self {
        Self { page, locator }
    }

    /// The locator chain
    #[must_use]
    pub const fn locator(&self) -> &Locator {
        &self.locator
    }

    /// The page this handle resolves against
    #[must_use]
    pub fn page(&self) -> &SharedPage {
        &self.page
    }

    /// The match at `index`
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        Self::new(self.page.clone(), self.locator.nth(index))
    }

    /// The first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// A child selector scoped under every match
    #[must_use]
    pub fn locator_in(&self, child: impl Into<Selector>) -> Self {
        Self::new(self.page.clone(), self.locator.locator(child))
    }

    /// Number of matches right now
    pub async fn count(&self) -> ShopResult<usize> {
        self.page.count(&self.locator).await
    }

    /// Whether the first match is visible right now (no waiting)
    pub async fn is_visible_now(&self) -> ShopResult<bool> {
        self.page.is_visible(&self.locator).await
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("locator", &self.locator.to_string())
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.locator.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{dom::Element, MockPage};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_handle_resolves_live() {
        let mock = Arc::new(MockPage::with_body(vec![Element::new("li")]));
        let items = ElementRef::new(mock.clone(), Locator::new("li"));
        assert_eq!(items.count().await.unwrap(), 1);

        mock.set_document(crate::mock::dom::Document::new(
            "",
            vec![Element::new("li"), Element::new("li")],
        ));
        assert_eq!(items.count().await.unwrap(), 2);
        assert!(items.nth(1).is_visible_now().await.unwrap());
        assert!(!items.nth(2).is_visible_now().await.unwrap());
    }

    #[test]
    fn test_display_is_locator() {
        let page: SharedPage = Arc::new(MockPage::new());
        let price = ElementRef::new(page, Locator::new(".cart_item"))
            .nth(1)
            .locator_in(".inventory_item_price");
        assert_eq!(price.to_string(), ".cart_item >> nth=1 >> .inventory_item_price");
    }
}
