//! In-memory page driver for unit tests and browserless runs.
//!
//! [`MockPage`] implements [`PageDriver`] over a [`dom::Document`]. On its
//! own it is a static page whose inputs and selects keep the values typed
//! into them; built with [`MockPage::storefront`] it is backed by a
//! [`storefront::Storefront`] that re-renders the document after every
//! navigation and interaction.
//!
//! Like any browser page, every call resolves its locator against the
//! current document, so a page object holding a locator sees re-rendered
//! content without re-querying.

pub mod css;
pub mod dom;
pub mod storefront;

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::{ShopError, ShopResult};
use crate::wait::LoadState;
use async_trait::async_trait;
use dom::{Document, Element, NodePath};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use storefront::Storefront;
use tokio::time::Instant;

/// Bytes returned by [`MockPage::screenshot`] unless overridden: a PNG signature
pub const PLACEHOLDER_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug)]
struct MockState {
    url: String,
    document: Document,
    storefront: Option<Storefront>,
    call_history: Vec<String>,
    failures: Vec<(String, String)>,
    screenshot_data: Option<Vec<u8>>,
    closed: bool,
}

/// In-memory page
#[derive(Debug)]
pub struct MockPage {
    state: Mutex<MockState>,
}

impl Default for MockPage {
    fn default() -> Self {
        Self::with_document(Document::default())
    }
}

impl MockPage {
    /// Empty page at `about:blank`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Static page whose `<body>` holds `children`
    #[must_use]
    pub fn with_body(children: Vec<Element>) -> Self {
        Self::with_document(Document::new("", children))
    }

    /// Static page showing `document`
    #[must_use]
    pub fn with_document(document: Document) -> Self {
        Self {
            state: Mutex::new(MockState {
                url: "about:blank".to_string(),
                document,
                storefront: None,
                call_history: Vec::new(),
                failures: Vec::new(),
                screenshot_data: Some(PLACEHOLDER_PNG.to_vec()),
                closed: false,
            }),
        }
    }

    /// Page backed by the storefront model served at `base_url`.
    ///
    /// The page starts at `about:blank`; navigate to the base URL first.
    #[must_use]
    pub fn storefront(base_url: &str) -> Self {
        let page = Self::new();
        page.state().storefront = Some(Storefront::new(base_url));
        page
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the static document
    pub fn set_document(&self, document: Document) {
        self.state().document = document;
    }

    /// Bytes returned by `screenshot`; `None` makes screenshots fail
    pub fn set_screenshot(&self, data: Option<Vec<u8>>) {
        self.state().screenshot_data = data;
    }

    /// Make every call whose history entry starts with `prefix` fail
    /// with a driver error carrying `message`
    pub fn fail_on(&self, prefix: &str, message: &str) {
        self.state()
            .failures
            .push((prefix.to_string(), message.to_string()));
    }

    /// Calls made so far, e.g. `click:#login-button`
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.state().call_history.clone()
    }

    /// Whether a call starting with `prefix` was made
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.state()
            .call_history
            .iter()
            .any(|c| c.starts_with(prefix))
    }

    /// Whether `close` was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state().closed
    }

    /// Snapshot of the storefront model, if any
    #[must_use]
    pub fn storefront_state(&self) -> Option<Storefront> {
        self.state().storefront.clone()
    }
}

impl MockState {
    /// Record a call and apply injected failures
    fn record(&mut self, entry: String) -> ShopResult<()> {
        if self.closed && !entry.starts_with("close") {
            return Err(ShopError::driver("Target page has been closed"));
        }
        let failure = self
            .failures
            .iter()
            .find(|(prefix, _)| entry.starts_with(prefix.as_str()))
            .map(|(_, message)| message.clone());
        self.call_history.push(entry);
        match failure {
            Some(message) => Err(ShopError::driver(message)),
            None => Ok(()),
        }
    }

    fn rerender(&mut self) {
        if let Some(shop) = &self.storefront {
            self.url = shop.url();
            self.document = shop.render();
        }
    }

    fn first(&self, locator: &Locator) -> ShopResult<NodePath> {
        self.document
            .first(locator)?
            .ok_or_else(|| ShopError::not_found(locator.to_string()))
    }

    fn element(&self, path: &[usize], locator: &Locator) -> ShopResult<&Element> {
        self.document
            .get(path)
            .ok_or_else(|| ShopError::Detached {
                selector: locator.to_string(),
            })
    }

    /// Resolve the first match and require it to be actionable
    fn actionable(&self, locator: &Locator) -> ShopResult<(NodePath, Element)> {
        let path = self.first(locator)?;
        if !self.document.is_visible(&path, Instant::now()) {
            return Err(ShopError::driver(format!(
                "element {locator} is not visible"
            )));
        }
        let element = self.element(&path, locator)?.clone();
        if element.disabled {
            return Err(ShopError::driver(format!("element {locator} is disabled")));
        }
        Ok((path, element))
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> ShopResult<()> {
        let mut state = self.state();
        state.record(format!("goto:{url}"))?;
        match state.storefront.as_mut() {
            Some(shop) => {
                shop.navigate(url)?;
                state.rerender();
            }
            None => state.url = url.to_string(),
        }
        Ok(())
    }

    async fn url(&self) -> ShopResult<String> {
        Ok(self.state().url.clone())
    }

    async fn title(&self) -> ShopResult<String> {
        Ok(self.state().document.title.clone())
    }

    async fn wait_for_load_state(&self, state: LoadState, _timeout: Duration) -> ShopResult<()> {
        self.state().record(format!("wait_for_load_state:{state}"))
    }

    async fn count(&self, locator: &Locator) -> ShopResult<usize> {
        Ok(self.state().document.resolve(locator)?.len())
    }

    async fn is_visible(&self, locator: &Locator) -> ShopResult<bool> {
        let state = self.state();
        Ok(state
            .document
            .first(locator)?
            .is_some_and(|path| state.document.is_visible(&path, Instant::now())))
    }

    async fn is_enabled(&self, locator: &Locator) -> ShopResult<bool> {
        let state = self.state();
        let path = state.first(locator)?;
        Ok(!state.element(&path, locator)?.disabled)
    }

    async fn click(&self, locator: &Locator) -> ShopResult<()> {
        let mut state = self.state();
        state.record(format!("click:{locator}"))?;
        let (_, element) = state.actionable(locator)?;
        if let Some(shop) = state.storefront.as_mut() {
            shop.click(&element);
            state.rerender();
        }
        Ok(())
    }

    async fn fill(&self, locator: &Locator, value: &str) -> ShopResult<()> {
        let mut state = self.state();
        state.record(format!("fill:{locator}={value}"))?;
        let (path, element) = state.actionable(locator)?;
        if !element.is_text_input() {
            return Err(ShopError::driver(format!(
                "element {locator} is not an <input> or <textarea>"
            )));
        }
        match state.storefront.as_mut() {
            Some(shop) => {
                shop.fill(&element, value);
                state.rerender();
            }
            None => {
                if let Some(el) = state.document.get_mut(&path) {
                    el.value = Some(value.to_string());
                }
            }
        }
        Ok(())
    }

    async fn select_option(&self, locator: &Locator, value: &str) -> ShopResult<()> {
        let mut state = self.state();
        state.record(format!("select_option:{locator}={value}"))?;
        let (path, element) = state.actionable(locator)?;
        if element.tag != "select" {
            return Err(ShopError::driver(format!("element {locator} is not a <select>")));
        }
        if !element.option_values().iter().any(|v| v == value) {
            return Err(ShopError::driver(format!(
                "no option with value {value:?} in {locator}"
            )));
        }
        match state.storefront.as_mut() {
            Some(shop) => {
                shop.select(&element, value);
                state.rerender();
            }
            None => {
                if let Some(el) = state.document.get_mut(&path) {
                    el.value = Some(value.to_string());
                }
            }
        }
        Ok(())
    }

    async fn text_content(&self, locator: &Locator) -> ShopResult<Option<String>> {
        let state = self.state();
        let path = state.first(locator)?;
        Ok(state.element(&path, locator)?.text_content())
    }

    async fn input_value(&self, locator: &Locator) -> ShopResult<String> {
        let state = self.state();
        let path = state.first(locator)?;
        let element = state.element(&path, locator)?;
        if !matches!(element.tag.as_str(), "input" | "textarea" | "select") {
            return Err(ShopError::driver(format!(
                "element {locator} is not an <input>, <textarea> or <select>"
            )));
        }
        Ok(element.value.clone().unwrap_or_default())
    }

    async fn get_attribute(&self, locator: &Locator, name: &str) -> ShopResult<Option<String>> {
        let state = self.state();
        let path = state.first(locator)?;
        Ok(state.element(&path, locator)?.attributes.get(name).cloned())
    }

    /// Returns the element's property bag; the function text is only recorded
    async fn evaluate(&self, locator: &Locator, function: &str) -> ShopResult<serde_json::Value> {
        let mut state = self.state();
        state.record(format!("evaluate:{locator}:{function}"))?;
        let path = state.first(locator)?;
        Ok(serde_json::Value::Object(
            state.element(&path, locator)?.properties.clone(),
        ))
    }

    async fn screenshot(&self, full_page: bool) -> ShopResult<Vec<u8>> {
        let mut state = self.state();
        state.record(format!("screenshot:full_page={full_page}"))?;
        state
            .screenshot_data
            .clone()
            .ok_or_else(|| ShopError::Screenshot {
                message: "No screenshot available".to_string(),
            })
    }

    async fn close(&self) -> ShopResult<()> {
        let mut state = self.state();
        state.record("close".to_string())?;
        state.closed = true;
        Ok(())
    }
}
