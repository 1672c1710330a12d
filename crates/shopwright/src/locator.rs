//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a recipe, not a snapshot: it is an ordered chain of
//! selector and index steps that every driver call resolves again against
//! the live page. Page objects build their locators once at construction
//! and reuse them for their whole lifetime.

use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., ".inventory_item")
    Css(String),
    /// `data-test` attribute selector (e.g., `[data-test="checkout"]`)
    DataTest(String),
    /// Element id (e.g., `#login-button`)
    Id(String),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a `data-test` attribute selector
    #[must_use]
    pub fn data_test(value: impl Into<String>) -> Self {
        Self::DataTest(value.into())
    }

    /// Create an id selector
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Convert to a plain CSS selector string
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Css(s) => s.clone(),
            Self::DataTest(v) => format!("[data-test=\"{v}\"]"),
            Self::Id(id) => format!("#{id}"),
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Self::Css(css.to_string())
    }
}

impl From<String> for Selector {
    fn from(css: String) -> Self {
        Self::Css(css)
    }
}

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorStep {
    /// Match descendants of the current scope against a CSS selector
    Css(String),
    /// Keep only the match at this zero-based index
    Nth(usize),
}

/// A chain of steps addressing zero or more elements on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    steps: Vec<LocatorStep>,
}

impl Locator {
    /// Create a locator from a root selector
    #[must_use]
    pub fn new(selector: impl Into<Selector>) -> Self {
        Self {
            steps: vec![LocatorStep::Css(selector.into().to_css())],
        }
    }

    /// Narrow to the match at `index` (DOM order)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        let mut steps = self.steps.clone();
        steps.push(LocatorStep::Nth(index));
        Self { steps }
    }

    /// Narrow to the first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// Scope a child selector under every current match
    #[must_use]
    pub fn locator(&self, child: impl Into<Selector>) -> Self {
        let mut steps = self.steps.clone();
        steps.push(LocatorStep::Css(child.into().to_css()));
        Self { steps }
    }

    /// The steps of this chain
    #[must_use]
    pub fn steps(&self) -> &[LocatorStep] {
        &self.steps
    }

    /// JavaScript expression evaluating to an array of every matching element
    #[must_use]
    pub fn to_js_all(&self) -> String {
        let mut js = String::from("(() => { let nodes = [document];");
        for step in &self.steps {
            match step {
                LocatorStep::Css(css) => js.push_str(&format!(
                    " nodes = nodes.flatMap(n => Array.from(n.querySelectorAll({css:?})));"
                )),
                LocatorStep::Nth(i) => {
                    js.push_str(&format!(" nodes = nodes.length > {i} ? [nodes[{i}]] : [];"));
                }
            }
        }
        js.push_str(" return nodes; })()");
        js
    }

    /// JavaScript expression evaluating to the first matching element or `null`
    #[must_use]
    pub fn to_js_first(&self) -> String {
        format!("({}[0] || null)", self.to_js_all())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            match step {
                LocatorStep::Css(css) => f.write_str(css)?,
                LocatorStep::Nth(n) => write!(f, "nth={n}")?,
            }
        }
        Ok(())
    }
}
